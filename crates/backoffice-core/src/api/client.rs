//! API client for the back-office REST API.
//!
//! Every resource call carries the session's bearer token and passes through
//! the 401 hook: an unauthorized answer clears the session that sent the
//! token through [`SessionHandle::invalidate_if_token`]. The auth endpoints (login, logout, verify)
//! skip the hook so a refused login cannot end an unrelated session.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{shapes, ApiError};
use crate::auth::{AuthBackend, LoginGrant, SessionHandle, SignOutReason};
use crate::models::{
    AnalyticsReport, AuditLogEntry, AuditLogQuery, CustomerUser, DashboardStats, DateRange, Page,
    Principal, Report, ReportRequest, Ticket, TicketQuery, Transaction, TransactionQuery, UserQuery,
};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting
const INITIAL_BACKOFF_MS: u64 = 1000;

pub const LOGIN_PATH: &str = "/admin/auth/login";
pub const LOGOUT_PATH: &str = "/admin/auth/logout";
pub const VERIFY_PATH: &str = "/admin/auth/verify";
pub const DASHBOARD_STATS_PATH: &str = "/admin/dashboard/stats";
pub const USERS_PATH: &str = "/admin/users";
pub const TRANSACTIONS_PATH: &str = "/admin/transactions";
pub const TICKETS_PATH: &str = "/admin/tickets";
pub const AUDIT_LOGS_PATH: &str = "/admin/audit-logs";
pub const USER_ANALYTICS_PATH: &str = "/admin/analytics/users";
pub const TRANSACTION_ANALYTICS_PATH: &str = "/admin/analytics/transactions";
pub const REVENUE_ANALYTICS_PATH: &str = "/admin/analytics/revenue";
pub const REPORTS_PATH: &str = "/admin/reports";
pub const GENERATE_REPORT_PATH: &str = "/admin/reports/generate";

/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    session: SessionHandle,
    initial_backoff: Duration,
}

impl ApiClient {
    pub fn new(base_url: &str, session: SessionHandle) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    /// Override the first rate-limit backoff delay
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request, retrying 429 answers with exponential backoff
    async fn send_with_retry<F>(&self, path: &str, build: F) -> Result<Response, ApiError>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            let response = build().send().await?;
            if response.status().as_u16() != 429 {
                return Ok(response);
            }

            retries += 1;
            if retries > MAX_RATE_LIMIT_RETRIES {
                return Err(ApiError::RateLimited);
            }
            warn!(path, retry = retries, backoff_ms = backoff.as_millis() as u64, "Rate limited, backing off");
            tokio::time::sleep(backoff).await;
            backoff *= 2;
        }
    }

    async fn read_json(path: &str, response: Response) -> Result<Value, ApiError> {
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text)
            .map_err(|e| ApiError::MalformedResponse(format!("{}: {}", path, e)))
    }

    /// Authenticated resource call with the 401 hook
    async fn resource(
        &self,
        method: Method,
        path: &str,
        params: &[(&'static str, String)],
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let token = self.session.active_token();
        let url = self.url(path);

        let response = self
            .send_with_retry(path, || {
                let mut request = self.client.request(method.clone(), &url).query(params);
                if let Some(token) = &token {
                    request = request.bearer_auth(token);
                }
                if let Some(body) = body {
                    request = request.json(body);
                }
                request
            })
            .await?;

        let status = response.status();
        if status.as_u16() == 401 {
            // Only the session that sent the token can be ended by its rejection
            if let Some(token) = &token {
                if self.session.invalidate_if_token(token, SignOutReason::Unauthorized) {
                    warn!(path, "Request unauthorized, session cleared");
                }
            }
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        debug!(path, %status, "Resource fetched");
        Self::read_json(path, response).await
    }

    pub async fn get_resource(
        &self,
        path: &str,
        params: &[(&'static str, String)],
    ) -> Result<Value, ApiError> {
        self.resource(Method::GET, path, params, None).await
    }

    pub async fn post_resource(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        self.resource(Method::POST, path, &[], Some(body)).await
    }

    // ===== Data Fetching Methods =====

    pub async fn fetch_dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        let value = self.get_resource(DASHBOARD_STATS_PATH, &[]).await?;
        shapes::parse_dashboard(&value)
    }

    pub async fn fetch_users(&self, query: &UserQuery) -> Result<Page<CustomerUser>, ApiError> {
        let value = self.get_resource(USERS_PATH, &query.to_params()).await?;
        shapes::parse_page(&value, "users", query.page, query.limit)
    }

    pub async fn fetch_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Page<Transaction>, ApiError> {
        let value = self.get_resource(TRANSACTIONS_PATH, &query.to_params()).await?;
        shapes::parse_page(&value, "transactions", query.page, query.limit)
    }

    pub async fn fetch_tickets(&self, query: &TicketQuery) -> Result<Vec<Ticket>, ApiError> {
        let value = self.get_resource(TICKETS_PATH, &query.to_params()).await?;
        shapes::parse_list(&value, "tickets")
    }

    pub async fn fetch_audit_logs(
        &self,
        query: &AuditLogQuery,
    ) -> Result<Vec<AuditLogEntry>, ApiError> {
        let value = self.get_resource(AUDIT_LOGS_PATH, &query.to_params()).await?;
        shapes::parse_list(&value, "logs")
    }

    /// Transaction analytics, topped up from the user and revenue endpoints.
    /// Only the transaction payload is required.
    pub async fn fetch_analytics(&self, range: DateRange) -> Result<AnalyticsReport, ApiError> {
        let params = [("dateRange", range.as_param().to_string())];
        let (transactions, users, revenue) = futures::future::join3(
            self.get_resource(TRANSACTION_ANALYTICS_PATH, &params),
            self.get_resource(USER_ANALYTICS_PATH, &params),
            self.get_resource(REVENUE_ANALYTICS_PATH, &params),
        )
        .await;

        let users = users
            .map_err(|e| warn!(error = %e, "User analytics unavailable"))
            .ok();
        let revenue = revenue
            .map_err(|e| warn!(error = %e, "Revenue analytics unavailable"))
            .ok();
        shapes::parse_analytics(&transactions?, users.as_ref(), revenue.as_ref())
    }

    pub async fn fetch_reports(&self) -> Result<Vec<Report>, ApiError> {
        let value = self.get_resource(REPORTS_PATH, &[]).await?;
        shapes::parse_list(&value, "reports")
    }

    pub async fn generate_report(&self, request: &ReportRequest) -> Result<Report, ApiError> {
        let body = serde_json::to_value(request)
            .map_err(|e| ApiError::MalformedResponse(format!("report request: {}", e)))?;
        let value = self.post_resource(GENERATE_REPORT_PATH, &body).await?;
        shapes::parse_report(&value)
    }
}

// ============================================================================
// Auth endpoints (no 401 hook)
// ============================================================================

#[async_trait]
impl AuthBackend for ApiClient {
    async fn login(&self, identifier: &str, secret: &str) -> Result<LoginGrant, ApiError> {
        let url = self.url(LOGIN_PATH);
        let body = json!({ "email": identifier, "password": secret });
        let response = self
            .send_with_retry(LOGIN_PATH, || self.client.post(&url).json(&body))
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_login_status(status, &body));
        }

        let value = Self::read_json(LOGIN_PATH, response).await?;
        let login = shapes::parse_login(&value)?;
        Ok(LoginGrant {
            token: login.token,
            principal: login.user,
        })
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        let url = self.url(LOGOUT_PATH);
        let response = self
            .send_with_retry(LOGOUT_PATH, || self.client.post(&url).bearer_auth(token))
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }
        Ok(())
    }

    async fn verify(&self, token: &str) -> Result<Principal, ApiError> {
        let url = self.url(VERIFY_PATH);
        let response = self
            .send_with_retry(VERIFY_PATH, || self.client.get(&url).bearer_auth(token))
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }
        let value = Self::read_json(VERIFY_PATH, response).await?;
        shapes::parse_principal(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{ActiveSession, MemoryTokenStore, SessionEvent, TokenStore};
    use crate::clock::SystemClock;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use chrono::{Duration as ChronoDuration, Utc};
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Seen {
        auth_headers: Arc<Mutex<Vec<Option<String>>>>,
        hits: Arc<AtomicUsize>,
    }

    async fn users_ok(State(seen): State<Seen>, headers: HeaderMap) -> Json<Value> {
        seen.auth_headers.lock().push(
            headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        );
        Json(json!({
            "users": [{ "userId": "u-1", "name": "John Doe", "status": "active" }],
            "totalPages": 4,
            "page": 1,
        }))
    }

    async fn unauthorized() -> (StatusCode, Json<Value>) {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "expired" })))
    }

    async fn rate_limited_once(State(seen): State<Seen>) -> (StatusCode, Json<Value>) {
        if seen.hits.fetch_add(1, Ordering::SeqCst) == 0 {
            (StatusCode::TOO_MANY_REQUESTS, Json(json!({})))
        } else {
            (StatusCode::OK, Json(json!({ "tickets": [] })))
        }
    }

    async fn slow_unauthorized() -> (StatusCode, Json<Value>) {
        tokio::time::sleep(Duration::from_millis(300)).await;
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "expired" })))
    }

    async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if body["email"] == "ops@example.com" && body["password"] == "pw" {
            (
                StatusCode::OK,
                Json(json!({ "token": "live-token", "user": { "adminId": "a-1", "email": "ops@example.com", "role": "admin" } })),
            )
        } else {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid email or password" })),
            )
        }
    }

    async fn serve(seen: Seen) -> String {
        let app = Router::new()
            .route(USERS_PATH, get(users_ok))
            .route(TRANSACTIONS_PATH, get(unauthorized))
            .route(TICKETS_PATH, get(rate_limited_once))
            .route(REPORTS_PATH, get(slow_unauthorized))
            .route(LOGIN_PATH, post(login))
            .with_state(seen);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        format!("http://{}", addr)
    }

    fn signed_in_handle(store: Arc<MemoryTokenStore>) -> SessionHandle {
        let handle = SessionHandle::new(store, Arc::new(SystemClock));
        let principal = Principal {
            id: "a-1".into(),
            email: "ops@example.com".into(),
            role: "admin".into(),
            name: None,
            groups: vec![],
        };
        handle.install(ActiveSession::new(
            principal,
            "live-token".into(),
            Utc::now() + ChronoDuration::minutes(15),
        ));
        handle
    }

    #[tokio::test]
    async fn test_bearer_header_and_paging() {
        let seen = Seen::default();
        let base = serve(seen.clone()).await;
        let store = Arc::new(MemoryTokenStore::new());
        let client = ApiClient::new(&base, signed_in_handle(store)).expect("client");

        let page = client.fetch_users(&UserQuery::default()).await.expect("users");
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_pages, 4);
        assert_eq!(
            seen.auth_headers.lock().as_slice(),
            &[Some("Bearer live-token".to_string())]
        );
    }

    #[tokio::test]
    async fn test_unauthorized_clears_session() {
        let base = serve(Seen::default()).await;
        let store = Arc::new(MemoryTokenStore::new());
        let handle = signed_in_handle(store.clone());
        let mut events = handle.subscribe();
        let client = ApiClient::new(&base, handle.clone()).expect("client");

        let err = client
            .fetch_transactions(&TransactionQuery::default())
            .await
            .expect_err("401");
        assert!(err.is_unauthorized());
        assert!(!handle.is_authenticated());
        assert_eq!(store.load().expect("load"), None);
        assert_eq!(
            events.try_recv().ok(),
            Some(SessionEvent::SignedOut {
                reason: SignOutReason::Unauthorized
            })
        );
    }

    #[tokio::test]
    async fn test_late_unauthorized_keeps_newer_session() {
        let base = serve(Seen::default()).await;
        let store = Arc::new(MemoryTokenStore::new());
        let handle = signed_in_handle(store.clone());
        let client = ApiClient::new(&base, handle.clone()).expect("client");

        let in_flight = tokio::spawn({
            let client = client.clone();
            async move { client.fetch_reports().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        handle.invalidate(SignOutReason::Logout);
        assert_eq!(handle.principal(), None);
        handle.install(ActiveSession::new(
            Principal {
                id: "a-1".into(),
                email: "ops@example.com".into(),
                role: "admin".into(),
                name: None,
                groups: vec![],
            },
            "new-token".into(),
            Utc::now() + ChronoDuration::minutes(15),
        ));

        let err = in_flight.await.expect("join").expect_err("401");
        assert!(err.is_unauthorized());
        assert!(handle.is_authenticated());
        assert_eq!(handle.token().as_deref(), Some("new-token"));
        assert_eq!(store.load().expect("load").as_deref(), Some("new-token"));
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried() {
        let seen = Seen::default();
        let base = serve(seen.clone()).await;
        let handle = signed_in_handle(Arc::new(MemoryTokenStore::new()));
        let client = ApiClient::new(&base, handle)
            .expect("client")
            .with_initial_backoff(Duration::from_millis(5));

        let tickets = client.fetch_tickets(&TicketQuery::default()).await.expect("tickets");
        assert!(tickets.is_empty());
        assert_eq!(seen.hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refused_login_keeps_session() {
        let base = serve(Seen::default()).await;
        let handle = signed_in_handle(Arc::new(MemoryTokenStore::new()));
        let client = ApiClient::new(&base, handle.clone()).expect("client");

        let err = AuthBackend::login(&client, "ops@example.com", "wrong")
            .await
            .expect_err("refused");
        assert!(matches!(err, ApiError::InvalidCredentials(m) if m == "Invalid email or password"));
        assert!(handle.is_authenticated());

        let grant = AuthBackend::login(&client, "ops@example.com", "pw")
            .await
            .expect("login");
        assert_eq!(grant.token, "live-token");
        assert_eq!(grant.principal.id, "a-1");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_failure() {
        let handle = SessionHandle::new(Arc::new(MemoryTokenStore::new()), Arc::new(SystemClock));
        let client = ApiClient::new("http://127.0.0.1:9", handle).expect("client");
        let err = client.fetch_reports().await.expect_err("unreachable");
        assert!(matches!(err, ApiError::NetworkFailure(_)));
    }
}
