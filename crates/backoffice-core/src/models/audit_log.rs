use serde::{Deserialize, Serialize};

use crate::utils::title_case;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Success,
    Failed,
    #[default]
    #[serde(other)]
    Warning,
}

impl AuditStatus {
    pub fn label(&self) -> String {
        title_case(match self {
            AuditStatus::Success => "success",
            AuditStatus::Failed => "failed",
            AuditStatus::Warning => "warning",
        })
    }
}

/// One row of the server-side audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    #[serde(alias = "log_id", alias = "id")]
    pub log_id: String,
    #[serde(alias = "admin_id")]
    pub admin_id: Option<String>,
    #[serde(alias = "admin_email")]
    pub admin_email: Option<String>,
    pub action: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "ip_address")]
    pub ip_address: Option<String>,
    #[serde(alias = "user_agent")]
    pub user_agent: Option<String>,
    pub timestamp: Option<String>,
    #[serde(default)]
    pub status: AuditStatus,
}

/// Actions offered by the audit log filter
pub const AUDIT_ACTIONS: [&str; 5] = [
    "ADMIN_LOGIN",
    "VIEW_USER",
    "UPDATE_TICKET",
    "DOWNLOAD_REPORT",
    "FAILED_LOGIN",
];
