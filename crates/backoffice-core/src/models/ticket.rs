use serde::{Deserialize, Serialize};

use crate::utils::title_case;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
    #[serde(other)]
    Unknown,
}

impl TicketStatus {
    pub const FILTERS: [Option<TicketStatus>; 5] = [
        None,
        Some(TicketStatus::Open),
        Some(TicketStatus::InProgress),
        Some(TicketStatus::Resolved),
        Some(TicketStatus::Closed),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Resolved => "resolved",
            TicketStatus::Closed => "closed",
            TicketStatus::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> String {
        title_case(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TicketPriority {
    pub const FILTERS: [Option<TicketPriority>; 5] = [
        None,
        Some(TicketPriority::Low),
        Some(TicketPriority::Medium),
        Some(TicketPriority::High),
        Some(TicketPriority::Urgent),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Medium => "medium",
            TicketPriority::High => "high",
            TicketPriority::Urgent => "urgent",
        }
    }

    pub fn label(&self) -> String {
        title_case(self.as_str())
    }
}

fn default_priority() -> TicketPriority {
    TicketPriority::Medium
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[serde(alias = "ticket_id", alias = "id")]
    pub ticket_id: String,
    #[serde(alias = "user_id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub subject: String,
    pub status: TicketStatus,
    #[serde(default = "default_priority")]
    pub priority: TicketPriority,
    pub category: Option<String>,
    #[serde(alias = "created_at")]
    pub created_at: Option<String>,
    #[serde(alias = "last_update", alias = "updatedAt", alias = "updated_at")]
    pub last_update: Option<String>,
    #[serde(alias = "assigned_to")]
    pub assigned_to: Option<String>,
}
