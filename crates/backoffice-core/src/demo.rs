//! Fixed data for demo mode and for the fallback render when a live fetch
//! fails.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::error;

use crate::api::shapes;
use crate::models::{
    AnalyticsReport, AuditLogEntry, CustomerUser, DashboardStats, Principal, Report, Ticket,
    Transaction,
};

/// Every demo token starts with this
pub const DEMO_TOKEN_PREFIX: &str = "demo-token-";

pub const DEMO_ADMIN_ID: &str = "demo-admin-001";

const DEMO_ADMIN_EMAIL: &str = "admin@breakfree.com";

const USERS: &str = include_str!("../fixtures/users.json");
const TRANSACTIONS: &str = include_str!("../fixtures/transactions.json");
const TICKETS: &str = include_str!("../fixtures/tickets.json");
const AUDIT_LOGS: &str = include_str!("../fixtures/audit_logs.json");
const REPORTS: &str = include_str!("../fixtures/reports.json");
const DASHBOARD: &str = include_str!("../fixtures/dashboard.json");
const ANALYTICS: &str = include_str!("../fixtures/analytics.json");

/// Principal for a fresh demo login
pub fn demo_principal(identifier: &str) -> Principal {
    Principal {
        id: DEMO_ADMIN_ID.to_string(),
        email: identifier.to_string(),
        role: "admin".to_string(),
        name: Some("BreakFree Admin".to_string()),
        groups: Vec::new(),
    }
}

/// Principal for a demo session restored from a stored token
pub fn restored_principal() -> Principal {
    Principal {
        id: DEMO_ADMIN_ID.to_string(),
        email: DEMO_ADMIN_EMAIL.to_string(),
        role: "admin".to_string(),
        name: Some("Demo Admin".to_string()),
        groups: Vec::new(),
    }
}

pub fn demo_token(now: DateTime<Utc>) -> String {
    format!("{}{}", DEMO_TOKEN_PREFIX, now.timestamp_millis())
}

fn fixture(name: &str, raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        error!(fixture = name, error = %e, "Demo fixture is not valid JSON");
        Value::Null
    })
}

fn fixture_list<T: serde::de::DeserializeOwned>(name: &str, raw: &str) -> Vec<T> {
    shapes::parse_list(&fixture(name, raw), name).unwrap_or_default()
}

pub fn users() -> Vec<CustomerUser> {
    fixture_list("users", USERS)
}

pub fn transactions() -> Vec<Transaction> {
    fixture_list("transactions", TRANSACTIONS)
}

pub fn tickets() -> Vec<Ticket> {
    fixture_list("tickets", TICKETS)
}

pub fn audit_logs() -> Vec<AuditLogEntry> {
    fixture_list("logs", AUDIT_LOGS)
}

pub fn reports() -> Vec<Report> {
    fixture_list("reports", REPORTS)
}

pub fn dashboard_stats() -> DashboardStats {
    shapes::parse_dashboard(&fixture("dashboard", DASHBOARD)).unwrap_or_default()
}

pub fn analytics() -> AnalyticsReport {
    shapes::parse_analytics(&fixture("analytics", ANALYTICS), None, None).unwrap_or_default()
}
