//! Shared session state.
//!
//! `SessionHandle` is the one owner of the signed-in session. The session
//! manager mutates it on login, extend and the expiry watch; the API client
//! mutates it only through [`SessionHandle::invalidate_if_token`] when a
//! resource call comes back 401. Every exit path runs the same procedure: clear the stored
//! token, drop the principal, broadcast `SignedOut`.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::token_store::TokenStore;
use crate::clock::Clock;
use crate::models::Principal;

/// Capacity of the session event channel
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// An authenticated session. The token and principal only exist together.
#[derive(Clone, PartialEq)]
pub struct ActiveSession {
    pub principal: Principal,
    token: String,
    pub expires_at: DateTime<Utc>,
}

impl ActiveSession {
    pub fn new(principal: Principal, token: String, expires_at: DateTime<Utc>) -> Self {
        Self {
            principal,
            token,
            expires_at,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl fmt::Debug for ActiveSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveSession")
            .field("principal", &self.principal)
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SessionState {
    /// Startup verification has not finished
    #[default]
    Uninitialized,
    Anonymous,
    Authenticated(ActiveSession),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    Logout,
    Expired,
    Unauthorized,
}

impl SignOutReason {
    pub fn message(&self) -> &'static str {
        match self {
            SignOutReason::Logout => "Signed out",
            SignOutReason::Expired => "Session expired. Please sign in again.",
            SignOutReason::Unauthorized => "Session rejected by the server. Please sign in again.",
        }
    }
}

/// Broadcast to the console whenever the session changes
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Startup verification finished
    Ready { authenticated: bool },
    SignedIn { principal: Principal, expires_at: DateTime<Utc> },
    Extended { expires_at: DateTime<Utc> },
    /// The redirect to the login entry point
    SignedOut { reason: SignOutReason },
}

struct Inner {
    state: Mutex<SessionState>,
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
    events: broadcast::Sender<SessionEvent>,
}

/// Cheap to clone; all clones share one session.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Inner>,
}

impl SessionHandle {
    pub fn new(store: Arc<dyn TokenStore>, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SessionState::Uninitialized),
                store,
                clock,
                events,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    pub fn snapshot(&self) -> SessionState {
        self.inner.state.lock().clone()
    }

    pub fn is_initialized(&self) -> bool {
        !matches!(*self.inner.state.lock(), SessionState::Uninitialized)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(*self.inner.state.lock(), SessionState::Authenticated(_))
    }

    pub fn principal(&self) -> Option<Principal> {
        match &*self.inner.state.lock() {
            SessionState::Authenticated(session) => Some(session.principal.clone()),
            _ => None,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match &*self.inner.state.lock() {
            SessionState::Authenticated(session) => Some(session.expires_at),
            _ => None,
        }
    }

    /// Time left before expiry, clamped at zero
    pub fn remaining(&self) -> Option<Duration> {
        let expires_at = self.expires_at()?;
        Some((expires_at - self.now()).max(Duration::zero()))
    }

    /// Bearer token of the current session, if any
    pub fn token(&self) -> Option<String> {
        match &*self.inner.state.lock() {
            SessionState::Authenticated(session) => Some(session.token.clone()),
            _ => None,
        }
    }

    /// Guard for protected actions: clears an expired session before
    /// reporting whether one is still active.
    pub fn ensure_active(&self) -> bool {
        self.check_expiry();
        self.is_authenticated()
    }

    /// Token of a live, unexpired session
    pub fn active_token(&self) -> Option<String> {
        if self.ensure_active() {
            self.token()
        } else {
            None
        }
    }

    /// Read the persisted token. Storage errors count as "no token".
    pub(crate) fn stored_token(&self) -> Option<String> {
        match self.inner.store.load() {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to read stored token");
                None
            }
        }
    }

    pub(crate) fn discard_stored_token(&self) {
        if let Err(e) = self.inner.store.clear() {
            warn!(error = %e, "Failed to clear stored token");
        }
    }

    /// Persist the token and make the session current
    pub(crate) fn install(&self, session: ActiveSession) {
        let principal = session.principal.clone();
        let expires_at = session.expires_at;
        {
            let mut state = self.inner.state.lock();
            if let Err(e) = self.inner.store.save(&session.token) {
                warn!(error = %e, "Failed to persist token; session will not survive restart");
            }
            *state = SessionState::Authenticated(session);
        }
        info!(principal = %principal.id, %expires_at, "Session established");
        self.emit(SessionEvent::SignedIn {
            principal,
            expires_at,
        });
    }

    /// Leave the uninitialized state and announce readiness
    pub(crate) fn mark_ready(&self) {
        let authenticated = {
            let mut state = self.inner.state.lock();
            if matches!(*state, SessionState::Uninitialized) {
                *state = SessionState::Anonymous;
            }
            matches!(*state, SessionState::Authenticated(_))
        };
        debug!(authenticated, "Session ready");
        self.emit(SessionEvent::Ready { authenticated });
    }

    /// Push expiry to `now + ttl`. Never moves it backwards. Returns `None`
    /// when there is no session to extend; an already expired session is
    /// cleared instead.
    pub(crate) fn extend(&self, ttl: Duration) -> Option<DateTime<Utc>> {
        let now = self.now();
        let extended = {
            let mut state = self.inner.state.lock();
            match &mut *state {
                SessionState::Authenticated(session) if !session.is_expired_at(now) => {
                    let target = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
                    session.expires_at = session.expires_at.max(target);
                    Some(session.expires_at)
                }
                SessionState::Authenticated(_) => None,
                _ => return None,
            }
        };

        match extended {
            Some(expires_at) => {
                debug!(%expires_at, "Session extended");
                self.emit(SessionEvent::Extended { expires_at });
                Some(expires_at)
            }
            None => {
                self.invalidate(SignOutReason::Expired);
                None
            }
        }
    }

    /// Clear the session if its expiry has passed. Returns true if it did.
    pub fn check_expiry(&self) -> bool {
        let now = self.now();
        let expired = matches!(
            &*self.inner.state.lock(),
            SessionState::Authenticated(session) if session.is_expired_at(now)
        );
        if expired {
            self.invalidate(SignOutReason::Expired)
        } else {
            false
        }
    }

    /// The single clear-and-redirect procedure: remove the stored token,
    /// drop the principal and broadcast `SignedOut`. Safe to call repeatedly;
    /// only the call that ends a session broadcasts.
    pub fn invalidate(&self, reason: SignOutReason) -> bool {
        self.clear_where(reason, |_| true)
    }

    /// Invalidate only if the current session still holds `token`. A
    /// rejection of a token that has since been replaced is ignored.
    pub fn invalidate_if_token(&self, token: &str, reason: SignOutReason) -> bool {
        self.clear_where(reason, |state| {
            matches!(state, SessionState::Authenticated(session) if session.token == token)
        })
    }

    fn clear_where<F>(&self, reason: SignOutReason, applies: F) -> bool
    where
        F: FnOnce(&SessionState) -> bool,
    {
        let was_authenticated = {
            let mut state = self.inner.state.lock();
            if !applies(&*state) {
                debug!(?reason, "Ignoring sign-out for a replaced session");
                return false;
            }
            if let Err(e) = self.inner.store.clear() {
                warn!(error = %e, "Failed to clear stored token");
            }
            let was = matches!(*state, SessionState::Authenticated(_));
            *state = SessionState::Anonymous;
            was
        };

        if was_authenticated {
            info!(?reason, "Session cleared");
            self.emit(SessionEvent::SignedOut { reason });
        }
        was_authenticated
    }

    fn emit(&self, event: SessionEvent) {
        // No receivers is fine: nobody is listening yet
        let _ = self.inner.events.send(event);
    }
}
