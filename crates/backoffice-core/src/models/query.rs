//! Listing queries and client-side pagination.
//!
//! Queries serialize to the API's query parameters and also filter the demo
//! fixtures locally, so both data origins page and filter the same way.

use serde::{Deserialize, Serialize};

use super::{
    contains_ignore_case, AuditLogEntry, CustomerUser, Ticket, TicketPriority, TicketStatus,
    Transaction, TransactionStatus, TransactionType, UserStatus,
};

/// Rows per page for paginated listings
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Slice `items` into the requested 1-based page.
/// Pages past the end are clamped to the last page.
pub fn paginate<T: Clone>(items: &[T], page: usize, limit: usize) -> Page<T> {
    let limit = limit.max(1);
    let total_pages = items.len().div_ceil(limit).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * limit;
    let end = (start + limit).min(items.len());

    Page {
        items: items.get(start..end).map(<[T]>::to_vec).unwrap_or_default(),
        page,
        total_pages,
    }
}

fn push_search(params: &mut Vec<(&'static str, String)>, search: &str) {
    let trimmed = search.trim();
    if !trimmed.is_empty() {
        params.push(("search", trimmed.to_string()));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserQuery {
    pub page: usize,
    pub limit: usize,
    pub status: Option<UserStatus>,
    pub search: String,
}

impl Default for UserQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            status: None,
            search: String::new(),
        }
    }
}

impl UserQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(status) = self.status {
            params.push(("filter", status.as_str().to_string()));
        }
        push_search(&mut params, &self.search);
        params
    }

    pub fn matches(&self, user: &CustomerUser) -> bool {
        self.status.map_or(true, |s| user.status == s) && user.matches_search(self.search.trim())
    }

    /// Filter then paginate a local dataset
    pub fn apply(&self, users: &[CustomerUser]) -> Page<CustomerUser> {
        let filtered: Vec<CustomerUser> = users.iter().filter(|u| self.matches(u)).cloned().collect();
        paginate(&filtered, self.page, self.limit)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionQuery {
    pub page: usize,
    pub limit: usize,
    pub kind: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
    pub search: String,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            kind: None,
            status: None,
            search: String::new(),
        }
    }
}

impl TransactionQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(kind) = self.kind {
            params.push(("type", kind.as_str().to_string()));
        }
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        push_search(&mut params, &self.search);
        params
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        self.kind.map_or(true, |k| txn.kind == k)
            && self.status.map_or(true, |s| txn.status == s)
            && txn.matches_search(self.search.trim())
    }

    pub fn apply(&self, transactions: &[Transaction]) -> Page<Transaction> {
        let filtered: Vec<Transaction> = transactions
            .iter()
            .filter(|t| self.matches(t))
            .cloned()
            .collect();
        paginate(&filtered, self.page, self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TicketQuery {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
}

impl TicketQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(priority) = self.priority {
            params.push(("priority", priority.as_str().to_string()));
        }
        params
    }

    pub fn apply(&self, tickets: &[Ticket]) -> Vec<Ticket> {
        tickets
            .iter()
            .filter(|t| self.status.map_or(true, |s| t.status == s))
            .filter(|t| self.priority.map_or(true, |p| t.priority == p))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuditLogQuery {
    pub action: Option<String>,
}

impl AuditLogQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        self.action
            .iter()
            .map(|a| ("action", a.clone()))
            .collect()
    }

    pub fn apply(&self, logs: &[AuditLogEntry]) -> Vec<AuditLogEntry> {
        logs.iter()
            .filter(|l| {
                self.action
                    .as_deref()
                    .map_or(true, |a| contains_ignore_case(&l.action, a))
            })
            .cloned()
            .collect()
    }
}

/// Date range selector for the analytics view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    Last7Days,
    #[default]
    Last30Days,
    Last90Days,
    LastYear,
}

impl DateRange {
    pub const ALL: [DateRange; 4] = [
        DateRange::Last7Days,
        DateRange::Last30Days,
        DateRange::Last90Days,
        DateRange::LastYear,
    ];

    /// Wire value of the `dateRange` parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            DateRange::Last7Days => "7d",
            DateRange::Last30Days => "30d",
            DateRange::Last90Days => "90d",
            DateRange::LastYear => "1y",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DateRange::Last7Days => "Last 7 days",
            DateRange::Last30Days => "Last 30 days",
            DateRange::Last90Days => "Last 90 days",
            DateRange::LastYear => "Last year",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            DateRange::Last7Days => DateRange::Last30Days,
            DateRange::Last30Days => DateRange::Last90Days,
            DateRange::Last90Days => DateRange::LastYear,
            DateRange::LastYear => DateRange::Last7Days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str, status: UserStatus) -> CustomerUser {
        CustomerUser {
            user_id: id.to_string(),
            name: name.to_string(),
            email: None,
            phone: None,
            status,
            join_date: None,
            total_transactions: 0,
            total_spent: 0.0,
            last_active: None,
        }
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=45).collect();
        let p = paginate(&items, 1, 20);
        assert_eq!(p.items.len(), 20);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next());
        assert!(!p.has_prev());

        let last = paginate(&items, 3, 20);
        assert_eq!(last.items, vec![41, 42, 43, 44, 45]);
        assert!(!last.has_next());

        let clamped = paginate(&items, 99, 20);
        assert_eq!(clamped.page, 3);
    }

    #[test]
    fn test_paginate_empty() {
        let items: Vec<u32> = Vec::new();
        let p = paginate(&items, 1, 20);
        assert!(p.items.is_empty());
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 1);
    }

    #[test]
    fn test_user_query_params() {
        let q = UserQuery {
            status: Some(UserStatus::Suspended),
            search: "  jane ".into(),
            ..Default::default()
        };
        assert_eq!(
            q.to_params(),
            vec![
                ("page", "1".to_string()),
                ("limit", "20".to_string()),
                ("filter", "suspended".to_string()),
                ("search", "jane".to_string()),
            ]
        );
        assert_eq!(UserQuery::default().to_params().len(), 2);
    }

    #[test]
    fn test_user_query_apply() {
        let users = vec![
            user("u1", "John Doe", UserStatus::Active),
            user("u2", "Jane Smith", UserStatus::Active),
            user("u3", "Bob Johnson", UserStatus::Inactive),
        ];
        let active = UserQuery {
            status: Some(UserStatus::Active),
            ..Default::default()
        };
        assert_eq!(active.apply(&users).items.len(), 2);

        let search = UserQuery {
            search: "john".into(),
            ..Default::default()
        };
        let names: Vec<String> = search.apply(&users).items.into_iter().map(|u| u.name).collect();
        assert_eq!(names, vec!["John Doe", "Bob Johnson"]);
    }

    #[test]
    fn test_date_range_cycle() {
        let mut r = DateRange::default();
        assert_eq!(r.as_param(), "30d");
        for _ in 0..4 {
            r = r.next();
        }
        assert_eq!(r, DateRange::Last30Days);
    }
}
