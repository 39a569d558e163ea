//! Session lifecycle: initialize, login, logout, extend and the expiry watch.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::json;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::session::{ActiveSession, SessionHandle, SignOutReason};
use super::AuthError;
use crate::api::ApiError;
use crate::audit::{self, AuditEvent};
use crate::config::{AppMode, SessionPolicy};
use crate::demo;
use crate::models::Principal;

/// Fallback message when the server gives no reason for a failed login
const GENERIC_LOGIN_FAILURE: &str = "Login failed";

/// What a successful network login hands back
#[derive(Debug, Clone, PartialEq)]
pub struct LoginGrant {
    pub token: String,
    pub principal: Principal,
}

/// The network side of authentication
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn login(&self, identifier: &str, secret: &str) -> Result<LoginGrant, ApiError>;
    async fn logout(&self, token: &str) -> Result<(), ApiError>;
    async fn verify(&self, token: &str) -> Result<Principal, ApiError>;
}

/// The running expiry-watch task. Dropping it stops the task.
struct ExpiryWatch(JoinHandle<()>);

impl Drop for ExpiryWatch {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[derive(Clone)]
pub struct SessionManager {
    handle: SessionHandle,
    backend: Option<Arc<dyn AuthBackend>>,
    policy: SessionPolicy,
    watch: Arc<Mutex<Option<ExpiryWatch>>>,
}

impl SessionManager {
    /// Manager that never touches the network
    pub fn demo(handle: SessionHandle, policy: SessionPolicy) -> Self {
        Self {
            handle,
            backend: None,
            policy,
            watch: Arc::new(Mutex::new(None)),
        }
    }

    pub fn live(handle: SessionHandle, policy: SessionPolicy, backend: Arc<dyn AuthBackend>) -> Self {
        Self {
            handle,
            backend: Some(backend),
            policy,
            watch: Arc::new(Mutex::new(None)),
        }
    }

    pub fn mode(&self) -> AppMode {
        if self.backend.is_some() {
            AppMode::Live
        } else {
            AppMode::Demo
        }
    }

    pub fn is_demo(&self) -> bool {
        self.backend.is_none()
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    pub fn policy(&self) -> &SessionPolicy {
        &self.policy
    }

    /// Restore a stored session, if there is one. Always ends with the
    /// session ready; every failure resolves to anonymous.
    pub async fn initialize(&self) {
        if self.handle.is_initialized() {
            debug!("Session already initialized");
            return;
        }

        if let Some(token) = self.handle.stored_token() {
            self.restore(token).await;
        }

        if self.handle.is_authenticated() {
            self.start_watch();
        }
        self.handle.mark_ready();
    }

    async fn restore(&self, token: String) {
        match &self.backend {
            None if token.starts_with(demo::DEMO_TOKEN_PREFIX) => {
                debug!("Restoring demo session");
                self.handle
                    .install(ActiveSession::new(demo::restored_principal(), token, self.fresh_expiry()));
            }
            None => {
                warn!("Discarding stored token that was not issued in demo mode");
                self.handle.discard_stored_token();
            }
            Some(backend) => match backend.verify(&token).await {
                Ok(principal) => {
                    self.handle
                        .install(ActiveSession::new(principal, token, self.fresh_expiry()));
                }
                Err(e) => {
                    warn!(error = %e, "Stored session failed verification");
                    self.handle.discard_stored_token();
                }
            },
        }
    }

    /// Sign in. A failed attempt leaves the current session untouched.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<Principal, AuthError> {
        if !self.handle.is_initialized() {
            return Err(AuthError::NotInitialized);
        }

        let identifier = identifier.trim();
        let result = match &self.backend {
            None => self.demo_login(identifier, secret),
            Some(backend) => backend.login(identifier, secret).await.map_err(|e| match e {
                ApiError::InvalidCredentials(message) => AuthError::InvalidCredentials(message),
                ApiError::Rejected(message) if !message.is_empty() => AuthError::LoginFailed(message),
                other => {
                    warn!(error = %other, "Login request failed");
                    AuthError::LoginFailed(GENERIC_LOGIN_FAILURE.to_string())
                }
            }),
        };

        match result {
            Ok(grant) => {
                let principal = grant.principal.clone();
                self.handle
                    .install(ActiveSession::new(grant.principal, grant.token, self.fresh_expiry()));
                self.start_watch();
                self.audit(
                    audit::ADMIN_LOGIN,
                    Some(&principal.id),
                    json!({ "adminId": principal.id, "email": principal.email }),
                );
                Ok(principal)
            }
            Err(e) => {
                info!(error = %e, "Login rejected");
                self.audit(
                    audit::ADMIN_LOGIN_FAILED,
                    None,
                    json!({ "identifier": identifier }),
                );
                Err(e)
            }
        }
    }

    fn demo_login(&self, identifier: &str, secret: &str) -> Result<LoginGrant, AuthError> {
        let credentials = &self.policy.demo_credentials;
        if credentials.matches(identifier, secret) {
            Ok(LoginGrant {
                token: demo::demo_token(self.handle.now()),
                principal: demo::demo_principal(identifier),
            })
        } else {
            Err(AuthError::InvalidCredentials(format!(
                "Invalid credentials. Please use {} / {}",
                credentials.identifier, credentials.secret
            )))
        }
    }

    /// Sign out and clear everything locally. The network call is best
    /// effort; local cleanup always happens.
    pub async fn logout(&self) {
        if let Some(token) = self.sign_out() {
            self.revoke(&token).await;
        }
    }

    /// The local half of logout: stop the watch, clear the session and
    /// broadcast `SignedOut`. Returns the token the server should still
    /// revoke (live mode with a session only).
    pub fn sign_out(&self) -> Option<String> {
        let token = self.handle.token();
        let principal = self.handle.principal();

        self.stop_watch();
        if self.handle.invalidate(SignOutReason::Logout) {
            if let Some(principal) = principal {
                self.audit(
                    audit::ADMIN_LOGOUT,
                    Some(&principal.id),
                    json!({ "adminId": principal.id }),
                );
            }
        }

        token.filter(|_| self.backend.is_some())
    }

    /// Tell the server a token is no longer in use. Failures are logged only.
    pub async fn revoke(&self, token: &str) {
        if let Some(backend) = &self.backend {
            if let Err(e) = backend.logout(token).await {
                warn!(error = %e, "Logout request failed");
            }
        }
    }

    /// Reset expiry to a full TTL from now. `None` when there was no
    /// session to extend.
    pub fn extend_session(&self) -> Option<DateTime<Utc>> {
        let expires_at = self.handle.extend(self.policy.ttl)?;
        self.start_watch();
        Some(expires_at)
    }

    /// Whether an expiry watch task is currently installed
    pub fn watch_running(&self) -> bool {
        self.watch
            .lock()
            .as_ref()
            .map(|w| !w.0.is_finished())
            .unwrap_or(false)
    }

    /// `now + ttl`, saturating at the latest representable instant
    fn fresh_expiry(&self) -> DateTime<Utc> {
        self.handle
            .now()
            .checked_add_signed(self.policy.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    /// Start the periodic expiry check, replacing any running one
    fn start_watch(&self) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("No async runtime; session expiry will only be checked on access");
                return;
            }
        };

        let handle = self.handle.clone();
        let period = self.policy.check_interval;
        let task = runtime.spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            loop {
                ticker.tick().await;
                if handle.check_expiry() || !handle.is_authenticated() {
                    break;
                }
            }
            debug!("Expiry watch stopped");
        });

        // Replacing the old watch drops and aborts it
        *self.watch.lock() = Some(ExpiryWatch(task));
    }

    fn stop_watch(&self) {
        self.watch.lock().take();
    }

    fn audit(&self, action: &str, actor: Option<&str>, details: serde_json::Value) {
        AuditEvent::new(action, actor, self.handle.now(), details).emit();
    }
}
