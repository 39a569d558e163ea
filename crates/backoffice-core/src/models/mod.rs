//! Data models for back-office entities.
//!
//! This module contains the records the console displays:
//!
//! - `Principal`: the signed-in operator
//! - `CustomerUser`, `Transaction`, `Ticket`, `AuditLogEntry`: listing rows
//! - `DashboardStats`, `AnalyticsReport`: KPI and chart data
//! - `Report`: generated report metadata
//! - Query and pagination types used by the listing views

pub mod analytics;
pub mod audit_log;
pub mod dashboard;
pub mod principal;
pub mod query;
pub mod report;
pub mod ticket;
pub mod transaction;
pub mod user;

pub use analytics::{AnalyticsReport, AnalyticsSummary, TypeBreakdown};
pub use audit_log::{AuditLogEntry, AuditStatus};
pub use dashboard::{CategoryShare, DashboardStats, SeriesPoint};
pub use principal::Principal;
pub use query::{
    paginate, AuditLogQuery, DateRange, Page, TicketQuery, TransactionQuery, UserQuery,
    DEFAULT_PAGE_SIZE,
};
pub use report::{Report, ReportRequest, ReportStatus, ReportType};
pub use ticket::{Ticket, TicketPriority, TicketStatus};
pub use transaction::{PaymentMethod, Transaction, TransactionStatus, TransactionType};
pub use user::{CustomerUser, UserStatus};

use serde::{Deserialize, Deserializer};

/// Accept identifiers sent either as JSON strings or numbers
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    })
}

/// Case-insensitive substring match
pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
