use serde::{Deserialize, Serialize};

use super::contains_ignore_case;
use crate::utils::{format_currency, mask_email, mask_phone, title_case};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    #[default]
    Inactive,
    Suspended,
    #[serde(other)]
    Unknown,
}

impl UserStatus {
    /// Filter choices in cycling order (`None` = all)
    pub const FILTERS: [Option<UserStatus>; 4] = [
        None,
        Some(UserStatus::Active),
        Some(UserStatus::Inactive),
        Some(UserStatus::Suspended),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Suspended => "suspended",
            UserStatus::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> String {
        title_case(self.as_str())
    }
}

/// A customer account as listed on the Users view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUser {
    #[serde(alias = "user_id", alias = "id")]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub status: UserStatus,
    #[serde(alias = "join_date")]
    pub join_date: Option<String>,
    #[serde(default, alias = "total_transactions")]
    pub total_transactions: u64,
    #[serde(default, alias = "total_spent")]
    pub total_spent: f64,
    #[serde(alias = "last_active")]
    pub last_active: Option<String>,
}

impl CustomerUser {
    pub fn masked_email(&self) -> String {
        mask_email(self.email.as_deref())
    }

    pub fn masked_phone(&self) -> String {
        mask_phone(self.phone.as_deref())
    }

    pub fn total_spent_display(&self) -> String {
        format_currency(self.total_spent, "USD")
    }

    /// Search by name, email or user ID
    pub fn matches_search(&self, query: &str) -> bool {
        query.is_empty()
            || contains_ignore_case(&self.name, query)
            || contains_ignore_case(&self.user_id, query)
            || self
                .email
                .as_deref()
                .is_some_and(|e| contains_ignore_case(e, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_parses_camel_and_snake_case() {
        let camel = r#"{"userId":"user-001","name":"John Doe","status":"active","totalSpent":12.5}"#;
        let snake = r#"{"user_id":"user-001","name":"John Doe","status":"active","total_spent":12.5}"#;
        let a: CustomerUser = serde_json::from_str(camel).expect("camelCase");
        let b: CustomerUser = serde_json::from_str(snake).expect("snake_case");
        assert_eq!(a, b);
        assert_eq!(a.status, UserStatus::Active);
    }

    #[test]
    fn test_unknown_status() {
        let u: CustomerUser =
            serde_json::from_str(r#"{"userId":"u","status":"frozen"}"#).expect("parse");
        assert_eq!(u.status, UserStatus::Unknown);
    }

    #[test]
    fn test_matches_search() {
        let u: CustomerUser = serde_json::from_str(
            r#"{"userId":"user-002","name":"Jane Smith","email":"jane.smith@example.com"}"#,
        )
        .expect("parse");
        assert!(u.matches_search(""));
        assert!(u.matches_search("jane"));
        assert!(u.matches_search("USER-002"));
        assert!(u.matches_search("example.com"));
        assert!(!u.matches_search("bob"));
    }
}
