use serde::{Deserialize, Serialize};

/// A labelled point in a time series (month, weekday or date)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    #[serde(alias = "month", alias = "day", alias = "date", alias = "period")]
    pub label: String,
    #[serde(
        alias = "revenue",
        alias = "users",
        alias = "count",
        alias = "total",
        alias = "amount"
    )]
    pub value: f64,
}

impl SeriesPoint {
    pub fn new(label: &str, value: f64) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

/// Share of a category in a breakdown (pie chart slice)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    #[serde(alias = "type", alias = "category", alias = "label")]
    pub name: String,
    #[serde(alias = "percentage", alias = "share", alias = "count")]
    pub value: f64,
}

impl CategoryShare {
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

/// Headline KPIs and chart data for the dashboard view
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub active_users: u64,
    pub total_transactions: u64,
    pub total_revenue: f64,
    pub monthly_growth: f64,
    pub revenue_growth: f64,
    pub transaction_growth: f64,
    pub open_tickets: u64,
    pub revenue_data: Vec<SeriesPoint>,
    pub transaction_types: Vec<CategoryShare>,
    pub user_activity: Vec<SeriesPoint>,
}

impl DashboardStats {
    /// Average revenue per transaction, if there were any transactions
    pub fn average_transaction(&self) -> Option<f64> {
        (self.total_transactions > 0).then(|| self.total_revenue / self.total_transactions as f64)
    }

    /// Active users as a percentage of all users
    pub fn active_rate(&self) -> Option<f64> {
        (self.total_users > 0)
            .then(|| self.active_users as f64 / self.total_users as f64 * 100.0)
    }

    /// Percentage of each slice relative to the whole breakdown
    pub fn transaction_type_percentages(&self) -> Vec<(String, f64)> {
        let total: f64 = self.transaction_types.iter().map(|s| s.value).sum();
        if total <= 0.0 {
            return Vec::new();
        }
        self.transaction_types
            .iter()
            .map(|s| (s.name.clone(), s.value / total * 100.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_point_aliases() {
        let p: SeriesPoint = serde_json::from_str(r#"{"month":"Jan","revenue":65000}"#).expect("month");
        assert_eq!(p, SeriesPoint::new("Jan", 65000.0));
        let p: SeriesPoint = serde_json::from_str(r#"{"day":"Mon","users":1200}"#).expect("day");
        assert_eq!(p, SeriesPoint::new("Mon", 1200.0));
    }

    #[test]
    fn test_series_point_rejects_ambiguous_record() {
        // Two value aliases in one record is not a known shape
        let res = serde_json::from_str::<SeriesPoint>(r#"{"month":"Jan","revenue":1,"users":2}"#);
        assert!(res.is_err());
    }

    #[test]
    fn test_derived_ratios() {
        let stats = DashboardStats {
            total_users: 45,
            active_users: 32,
            total_transactions: 4,
            total_revenue: 100.0,
            ..Default::default()
        };
        assert_eq!(stats.average_transaction(), Some(25.0));
        let rate = stats.active_rate().expect("rate");
        assert!((rate - 71.11).abs() < 0.01);

        let empty = DashboardStats::default();
        assert_eq!(empty.average_transaction(), None);
        assert_eq!(empty.active_rate(), None);
    }

    #[test]
    fn test_transaction_type_percentages() {
        let stats = DashboardStats {
            transaction_types: vec![CategoryShare::new("A", 30.0), CategoryShare::new("B", 10.0)],
            ..Default::default()
        };
        let pct = stats.transaction_type_percentages();
        assert_eq!(pct[0], ("A".to_string(), 75.0));
        assert_eq!(pct[1], ("B".to_string(), 25.0));
    }
}
