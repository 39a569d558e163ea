//! Operator audit events.
//!
//! Events are written through `tracing` on the `audit` target so a
//! subscriber can route them separately from diagnostic logs.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

use crate::utils::{mask_account_number, mask_card_number};

pub const AUDIT_TARGET: &str = "audit";

/// Value of the `source` field on every event
pub const AUDIT_SOURCE: &str = "admin-console";

pub const ADMIN_LOGIN: &str = "ADMIN_LOGIN";
pub const ADMIN_LOGIN_FAILED: &str = "ADMIN_LOGIN_FAILED";
pub const ADMIN_LOGOUT: &str = "ADMIN_LOGOUT";

/// Keys never allowed into an audit record
const SENSITIVE_KEYS: [&str; 11] = [
    "cardNumber",
    "cvv",
    "cvc",
    "pin",
    "password",
    "accessToken",
    "refreshToken",
    "privateKey",
    "secret",
    "ssn",
    "routingNumber",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEvent {
    pub action: String,
    pub actor: Option<String>,
    pub timestamp: String,
    pub details: Value,
    pub source: &'static str,
}

impl AuditEvent {
    pub fn new(action: &str, actor: Option<&str>, at: DateTime<Utc>, details: Value) -> Self {
        Self {
            action: action.to_string(),
            actor: actor.map(str::to_string),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            details: sanitize_details(details),
            source: AUDIT_SOURCE,
        }
    }

    /// Write the event to the audit log target
    pub fn emit(&self) {
        let details = serde_json::to_string(&self.details).unwrap_or_default();
        info!(
            target: AUDIT_TARGET,
            action = %self.action,
            actor = self.actor.as_deref().unwrap_or("-"),
            timestamp = %self.timestamp,
            source = self.source,
            details = %details,
            "audit event"
        );
    }
}

/// Strip sensitive keys and add a masked `displayNumber` for card or account
/// suffixes. Non-object values become an empty object.
pub fn sanitize_details(details: Value) -> Value {
    let mut map = match details {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    for key in SENSITIVE_KEYS {
        map.remove(key);
    }

    if let Some(last4) = map.get("last4").and_then(Value::as_str).map(str::to_string) {
        map.insert(
            "displayNumber".to_string(),
            Value::String(mask_card_number(Some(&last4))),
        );
    }
    if let Some(digits) = map
        .get("lastFourDigits")
        .and_then(Value::as_str)
        .map(str::to_string)
    {
        map.insert(
            "displayNumber".to_string(),
            Value::String(mask_account_number(Some(&digits))),
        );
    }

    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_strips_sensitive_keys() {
        let cleaned = sanitize_details(json!({
            "email": "ops@example.com",
            "password": "hunter2",
            "cvv": "123",
            "accessToken": "abc",
        }));
        assert_eq!(cleaned, json!({ "email": "ops@example.com" }));
    }

    #[test]
    fn test_sanitize_masks_suffixes() {
        let cleaned = sanitize_details(json!({ "last4": "4242" }));
        assert_eq!(cleaned["displayNumber"], "**** **** **** 4242");

        let cleaned = sanitize_details(json!({ "lastFourDigits": "1234" }));
        assert_eq!(cleaned["displayNumber"], "****1234");
    }

    #[test]
    fn test_non_object_details_become_empty() {
        assert_eq!(sanitize_details(Value::Null), json!({}));
        assert_eq!(sanitize_details(json!("text")), json!({}));
    }

    #[test]
    fn test_event_fields() {
        let at = DateTime::parse_from_rfc3339("2025-01-15T10:30:00Z")
            .expect("timestamp")
            .with_timezone(&Utc);
        let event = AuditEvent::new(ADMIN_LOGIN, Some("demo-admin-001"), at, json!({ "pin": "0000" }));
        assert_eq!(event.timestamp, "2025-01-15T10:30:00.000Z");
        assert_eq!(event.source, "admin-console");
        assert_eq!(event.details, json!({}));
    }
}
