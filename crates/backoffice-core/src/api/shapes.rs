//! Response-shape boundary.
//!
//! The back-office API does not return uniform shapes: a listing can be a
//! bare array or wrapped in `data`, `items`, `results` or a resource key
//! such as `users`, and may carry pagination metadata at the top level or
//! under `pagination`/`meta`. Everything is parsed here, once, into the
//! typed models. Records that do not parse are skipped with a warning; an
//! envelope that matches none of the known layouts is a
//! `MalformedResponse`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::ApiError;
use crate::models::{AnalyticsReport, DashboardStats, Page, Principal, Report, SeriesPoint};

/// Generic wrapper keys tried after the resource-specific key
const ENVELOPE_KEYS: [&str; 3] = ["data", "items", "results"];

/// Nested objects that may hold pagination metadata
const PAGINATION_KEYS: [&str; 2] = ["pagination", "meta"];

/// Dashboard chart keys, parsed separately from the headline numbers
const DASHBOARD_CHART_KEYS: [&str; 6] = [
    "revenueData",
    "revenue_data",
    "transactionTypes",
    "transaction_types",
    "userActivity",
    "user_activity",
];

/// Body of a successful login
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    pub token: String,
    #[serde(alias = "admin", alias = "principal")]
    pub user: Principal,
}

/// Find the record array inside a listing response
fn find_list<'a>(value: &'a Value, resource_key: &str) -> Option<&'a Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => std::iter::once(resource_key)
            .chain(ENVELOPE_KEYS)
            .filter_map(|key| map.get(key))
            .find_map(|inner| match inner {
                Value::Array(items) => Some(items),
                // One level of nesting, e.g. {"data": {"users": [...]}}
                Value::Object(_) => find_list_shallow(inner, resource_key),
                _ => None,
            }),
        _ => None,
    }
}

fn find_list_shallow<'a>(value: &'a Value, resource_key: &str) -> Option<&'a Vec<Value>> {
    let map = value.as_object()?;
    std::iter::once(resource_key)
        .chain(ENVELOPE_KEYS)
        .find_map(|key| map.get(key).and_then(Value::as_array))
}

/// Parse every record that fits `T`, skipping the rest
fn parse_records<T: DeserializeOwned>(items: &[Value], resource_key: &str) -> Vec<T> {
    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0usize;
    for item in items {
        match serde_json::from_value::<T>(item.clone()) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                warn!(resource = resource_key, error = %e, "Skipping unrecognised record");
            }
        }
    }
    if skipped > 0 {
        warn!(resource = resource_key, skipped, kept = records.len(), "Dropped records from response");
    }
    records
}

pub fn parse_list<T: DeserializeOwned>(value: &Value, resource_key: &str) -> Result<Vec<T>, ApiError> {
    let items = find_list(value, resource_key).ok_or_else(|| {
        ApiError::MalformedResponse(format!("no {} list in response", resource_key))
    })?;
    Ok(parse_records(items, resource_key))
}

/// Look up a numeric field at the top level, under a wrapper, or under a
/// pagination object
fn find_number(value: &Value, keys: &[&str]) -> Option<u64> {
    let map = value.as_object()?;
    let direct = keys.iter().find_map(|k| map.get(*k).and_then(as_u64));
    direct
        .or_else(|| {
            PAGINATION_KEYS
                .iter()
                .filter_map(|p| map.get(*p))
                .find_map(|inner| find_number(inner, keys))
        })
        .or_else(|| {
            ENVELOPE_KEYS
                .iter()
                .filter_map(|p| map.get(*p))
                .filter(|inner| inner.is_object())
                .find_map(|inner| find_number(inner, keys))
        })
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse a paginated listing. Without pagination metadata the response is
/// treated as a single page.
pub fn parse_page<T: DeserializeOwned>(
    value: &Value,
    resource_key: &str,
    requested_page: usize,
    limit: usize,
) -> Result<Page<T>, ApiError> {
    let items = parse_list(value, resource_key)?;

    let total_pages = find_number(value, &["totalPages", "total_pages", "pages", "pageCount"])
        .map(|n| n as usize)
        .or_else(|| {
            find_number(value, &["total", "totalCount", "total_count", "count"])
                .map(|total| (total as usize).div_ceil(limit.max(1)))
        })
        .unwrap_or(1)
        .max(1);

    let page = find_number(value, &["page", "currentPage", "current_page"])
        .map(|n| n as usize)
        .unwrap_or(requested_page)
        .clamp(1, total_pages);

    Ok(Page {
        items,
        page,
        total_pages,
    })
}

/// Unwrap a single object that may sit under `data` or a resource key
fn find_object<'a>(value: &'a Value, resource_key: &str) -> Option<&'a Value> {
    let map = value.as_object()?;
    std::iter::once(resource_key)
        .chain(ENVELOPE_KEYS)
        .filter_map(|key| map.get(key))
        .find(|inner| inner.is_object())
        .or(Some(value))
}

pub fn parse_dashboard(value: &Value) -> Result<DashboardStats, ApiError> {
    let object = find_object(value, "stats")
        .ok_or_else(|| ApiError::MalformedResponse("dashboard stats is not an object".into()))?;
    let mut stats: DashboardStats = serde_json::from_value(headline_only(object))
        .map_err(|e| ApiError::MalformedResponse(format!("dashboard stats: {}", e)))?;

    stats.revenue_data = parse_series(object, "revenueData", &["revenue_data", "revenue"]);
    stats.user_activity = parse_series(object, "userActivity", &["user_activity", "activity"]);
    stats.transaction_types = object
        .get("transactionTypes")
        .or_else(|| object.get("transaction_types"))
        .and_then(Value::as_array)
        .map(|items| parse_records(items, "transactionTypes"))
        .unwrap_or_default();
    Ok(stats)
}

/// Copy of an object without its chart data, so a malformed chart can
/// never sink the headline numbers
fn headline_only(object: &Value) -> Value {
    match object {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(k, v)| {
                    !v.is_array() && !v.is_object() && !DASHBOARD_CHART_KEYS.contains(&k.as_str())
                })
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Parse a chart series. A series in an unknown shape becomes empty.
fn parse_series(object: &Value, key: &str, aliases: &[&str]) -> Vec<SeriesPoint> {
    std::iter::once(key)
        .chain(aliases.iter().copied())
        .find_map(|k| object.get(k).and_then(Value::as_array))
        .map(|items| parse_records(items, key))
        .unwrap_or_default()
}

/// Parse the transactions analytics payload. `users` and `revenue` are the
/// optional companion endpoints; their series fill gaps the main payload
/// leaves empty.
pub fn parse_analytics(
    transactions: &Value,
    users: Option<&Value>,
    revenue: Option<&Value>,
) -> Result<AnalyticsReport, ApiError> {
    let object = find_object(transactions, "analytics")
        .filter(|v| v.is_object())
        .ok_or_else(|| ApiError::MalformedResponse("analytics is not an object".into()))?;

    let mut report = AnalyticsReport {
        summary: object
            .get("summary")
            .and_then(|s| serde_json::from_value(s.clone()).ok())
            .unwrap_or_default(),
        revenue_by_day: parse_series(object, "revenueByDay", &["revenue_by_day", "revenue"]),
        transactions_by_type: object
            .get("transactionsByType")
            .or_else(|| object.get("transactions_by_type"))
            .and_then(Value::as_array)
            .map(|items| parse_records(items, "transactionsByType"))
            .unwrap_or_default(),
        user_growth: parse_series(object, "userGrowth", &["user_growth", "growth"]),
    };

    if report.user_growth.is_empty() {
        if let Some(users) = users.and_then(|v| find_object(v, "analytics")) {
            report.user_growth = parse_series(users, "userGrowth", &["user_growth", "growth", "data"]);
        }
    }
    if report.revenue_by_day.is_empty() {
        if let Some(revenue) = revenue.and_then(|v| find_object(v, "analytics")) {
            report.revenue_by_day =
                parse_series(revenue, "revenueByDay", &["revenue_by_day", "revenue", "data"]);
        }
    }
    Ok(report)
}

pub fn parse_report(value: &Value) -> Result<Report, ApiError> {
    let object = find_object(value, "report")
        .ok_or_else(|| ApiError::MalformedResponse("report is not an object".into()))?;
    serde_json::from_value(object.clone())
        .map_err(|e| ApiError::MalformedResponse(format!("report: {}", e)))
}

pub fn parse_login(value: &Value) -> Result<LoginResponse, ApiError> {
    let object = find_object(value, "session")
        .ok_or_else(|| ApiError::MalformedResponse("login response is not an object".into()))?;
    serde_json::from_value(object.clone())
        .map_err(|e| ApiError::MalformedResponse(format!("login response: {}", e)))
}

pub fn parse_principal(value: &Value) -> Result<Principal, ApiError> {
    let object = find_object(value, "user")
        .and_then(|inner| find_object(inner, "user"))
        .ok_or_else(|| ApiError::MalformedResponse("verify response is not an object".into()))?;
    serde_json::from_value(object.clone())
        .map_err(|e| ApiError::MalformedResponse(format!("principal: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerUser, Transaction};
    use serde_json::json;

    #[test]
    fn test_list_envelopes() {
        let record = json!({ "userId": "u-1", "name": "A", "status": "active" });
        let shapes = [
            json!([record.clone()]),
            json!({ "users": [record.clone()] }),
            json!({ "data": [record.clone()] }),
            json!({ "items": [record.clone()] }),
            json!({ "data": { "users": [record.clone()] } }),
        ];
        for shape in shapes {
            let users: Vec<CustomerUser> = parse_list(&shape, "users").expect("parsed");
            assert_eq!(users.len(), 1, "shape {}", shape);
            assert_eq!(users[0].user_id, "u-1");
        }
    }

    #[test]
    fn test_unknown_envelope_is_malformed() {
        let err = parse_list::<CustomerUser>(&json!({ "rows": [] }), "users").expect_err("malformed");
        assert!(matches!(err, ApiError::MalformedResponse(_)));
        assert!(parse_list::<CustomerUser>(&json!("text"), "users").is_err());
    }

    #[test]
    fn test_bad_records_are_skipped() {
        let value = json!({ "transactions": [
            { "transactionId": "t-1", "type": "bill_payment", "amount": 10, "status": "completed" },
            { "nonsense": true },
        ]});
        let txns: Vec<Transaction> = parse_list(&value, "transactions").expect("parsed");
        assert_eq!(txns.len(), 1);
    }

    #[test]
    fn test_page_metadata() {
        let value = json!({ "users": [], "totalPages": 7, "page": 3 });
        let page: Page<CustomerUser> = parse_page(&value, "users", 1, 20).expect("page");
        assert_eq!((page.page, page.total_pages), (3, 7));

        let value = json!({ "data": [], "pagination": { "total": 45 } });
        let page: Page<CustomerUser> = parse_page(&value, "users", 2, 20).expect("page");
        assert_eq!((page.page, page.total_pages), (2, 3));

        let value = json!([]);
        let page: Page<CustomerUser> = parse_page(&value, "users", 4, 20).expect("page");
        assert_eq!((page.page, page.total_pages), (1, 1));
    }

    #[test]
    fn test_dashboard_with_broken_chart() {
        let value = json!({ "data": {
            "totalUsers": 45,
            "totalRevenue": 100.5,
            "revenueData": "not a list",
            "userActivity": [{ "day": "Mon", "users": 12 }],
        }});
        let stats = parse_dashboard(&value).expect("stats");
        assert_eq!(stats.total_users, 45);
        assert!(stats.revenue_data.is_empty());
        assert_eq!(stats.user_activity, vec![SeriesPoint::new("Mon", 12.0)]);
    }

    #[test]
    fn test_analytics_companions_fill_gaps() {
        let transactions = json!({
            "summary": { "totalRevenue": 10.0, "totalTransactions": 2 },
            "transactionsByType": [{ "type": "Savings", "count": 2, "amount": 10.0 }],
        });
        let users = json!({ "data": { "userGrowth": [{ "month": "Jan", "users": 5 }] } });
        let report = parse_analytics(&transactions, Some(&users), None).expect("analytics");
        assert_eq!(report.summary.total_transactions, 2);
        assert_eq!(report.user_growth, vec![SeriesPoint::new("Jan", 5.0)]);
        assert!(report.revenue_by_day.is_empty());
        assert!(parse_analytics(&json!([1, 2]), None, None).is_err());
    }

    #[test]
    fn test_principal_and_login() {
        let principal = parse_principal(&json!({ "user": { "adminId": "a-1", "email": "x@y.z" } }))
            .expect("principal");
        assert_eq!(principal.id, "a-1");

        let login = parse_login(&json!({ "token": "t", "user": { "userId": "u", "email": "x@y.z" } }))
            .expect("login");
        assert_eq!(login.token, "t");
        assert_eq!(login.user.id, "u");
    }
}
