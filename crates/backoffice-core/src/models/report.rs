use serde::{Deserialize, Serialize};

use super::string_or_number;
use crate::utils::title_case;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Transactions,
    Users,
    Revenue,
    Tickets,
    #[serde(other)]
    Other,
}

impl ReportType {
    pub const GENERATABLE: [ReportType; 4] = [
        ReportType::Transactions,
        ReportType::Users,
        ReportType::Revenue,
        ReportType::Tickets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Transactions => "transactions",
            ReportType::Users => "users",
            ReportType::Revenue => "revenue",
            ReportType::Tickets => "tickets",
            ReportType::Other => "other",
        }
    }

    pub fn label(&self) -> String {
        title_case(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Completed,
    #[default]
    Pending,
    #[serde(other)]
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(alias = "reportId", alias = "report_id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", alias = "reportType", alias = "report_type")]
    pub kind: ReportType,
    #[serde(alias = "createdAt", alias = "created_at")]
    pub date: Option<String>,
    pub size: Option<String>,
    #[serde(default)]
    pub status: ReportStatus,
}

/// Parameters for generating a new report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub report_type: ReportType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
}
