//! Data-view fetch contract.
//!
//! Each view asks the `DataService` for its data and always gets some:
//! live data when the API answers, otherwise the view's fixture run through
//! the same filter and pagination the API would have applied. Demo mode
//! never touches the network.

use std::future::Future;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};
use crate::demo;
use crate::models::{
    AnalyticsReport, AuditLogEntry, AuditLogQuery, CustomerUser, DashboardStats, DateRange, Page,
    Report, ReportRequest, ReportStatus, Ticket, TicketQuery, Transaction, TransactionQuery,
    UserQuery,
};

/// Where a view's data came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataOrigin {
    Live,
    Demo,
    /// The live fetch failed; fixture data is shown instead
    Fallback { reason: String },
}

impl DataOrigin {
    pub fn is_live(&self) -> bool {
        matches!(self, DataOrigin::Live)
    }

    /// Short banner text for non-live data
    pub fn banner(&self) -> Option<String> {
        match self {
            DataOrigin::Live => None,
            DataOrigin::Demo => Some("Demo data".to_string()),
            DataOrigin::Fallback { reason } => Some(format!("Using demo data ({})", reason)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewData<T> {
    pub data: T,
    pub origin: DataOrigin,
}

impl<T> ViewData<T> {
    pub fn live(data: T) -> Self {
        Self {
            data,
            origin: DataOrigin::Live,
        }
    }

    pub fn demo(data: T) -> Self {
        Self {
            data,
            origin: DataOrigin::Demo,
        }
    }
}

#[derive(Clone)]
pub struct DataService {
    client: Option<ApiClient>,
}

impl DataService {
    /// Service that serves fixtures only
    pub fn demo() -> Self {
        Self { client: None }
    }

    pub fn live(client: ApiClient) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn is_demo(&self) -> bool {
        self.client.is_none()
    }

    async fn resolve<T, F, Fut>(
        &self,
        view: &'static str,
        fetch: F,
        fallback: impl FnOnce() -> T,
    ) -> ViewData<T>
    where
        F: FnOnce(ApiClient) -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let Some(client) = &self.client else {
            debug!(view, "Serving demo data");
            return ViewData::demo(fallback());
        };

        match fetch(client.clone()).await {
            Ok(data) => ViewData::live(data),
            Err(e) => {
                warn!(view, error = %e, "Fetch failed, falling back to demo data");
                ViewData {
                    data: fallback(),
                    origin: DataOrigin::Fallback {
                        reason: fallback_reason(&e),
                    },
                }
            }
        }
    }

    pub async fn dashboard(&self) -> ViewData<DashboardStats> {
        self.resolve(
            "dashboard",
            |client| async move { client.fetch_dashboard_stats().await },
            demo::dashboard_stats,
        )
        .await
    }

    pub async fn users(&self, query: &UserQuery) -> ViewData<Page<CustomerUser>> {
        let owned = query.clone();
        self.resolve(
            "users",
            |client| async move { client.fetch_users(&owned).await },
            || query.apply(&demo::users()),
        )
        .await
    }

    pub async fn transactions(&self, query: &TransactionQuery) -> ViewData<Page<Transaction>> {
        let owned = query.clone();
        self.resolve(
            "transactions",
            |client| async move { client.fetch_transactions(&owned).await },
            || query.apply(&demo::transactions()),
        )
        .await
    }

    pub async fn tickets(&self, query: &TicketQuery) -> ViewData<Vec<Ticket>> {
        let owned = query.clone();
        self.resolve(
            "tickets",
            |client| async move { client.fetch_tickets(&owned).await },
            || query.apply(&demo::tickets()),
        )
        .await
    }

    pub async fn audit_logs(&self, query: &AuditLogQuery) -> ViewData<Vec<AuditLogEntry>> {
        let owned = query.clone();
        self.resolve(
            "audit_logs",
            |client| async move { client.fetch_audit_logs(&owned).await },
            || query.apply(&demo::audit_logs()),
        )
        .await
    }

    pub async fn analytics(&self, range: DateRange) -> ViewData<AnalyticsReport> {
        self.resolve(
            "analytics",
            |client| async move { client.fetch_analytics(range).await },
            demo::analytics,
        )
        .await
    }

    pub async fn reports(&self) -> ViewData<Vec<Report>> {
        self.resolve(
            "reports",
            |client| async move { client.fetch_reports().await },
            demo::reports,
        )
        .await
    }

    /// Request a new report. Demo mode answers with a pending report
    /// without any network call.
    pub async fn generate_report(&self, request: &ReportRequest) -> Result<Report, ApiError> {
        match &self.client {
            Some(client) => client.generate_report(request).await,
            None => Ok(pending_report(request, Utc::now())),
        }
    }
}

/// A freshly queued report as shown before the server has produced it
pub fn pending_report(request: &ReportRequest, now: DateTime<Utc>) -> Report {
    Report {
        id: format!("local-{}", now.timestamp_millis()),
        name: format!("{} Report", request.report_type.label()),
        kind: request.report_type,
        date: Some(now.format("%Y-%m-%d").to_string()),
        size: None,
        status: ReportStatus::Pending,
    }
}

fn fallback_reason(error: &ApiError) -> String {
    match error {
        ApiError::Unauthorized => "session expired".to_string(),
        ApiError::NetworkFailure(_) => "API unreachable".to_string(),
        ApiError::MalformedResponse(_) => "unexpected response".to_string(),
        ApiError::RateLimited => "rate limited".to_string(),
        other => other.to_string(),
    }
}
