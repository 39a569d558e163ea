use serde::{Deserialize, Serialize};

use super::dashboard::SeriesPoint;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    #[serde(default, alias = "total_revenue")]
    pub total_revenue: f64,
    #[serde(default, alias = "total_transactions")]
    pub total_transactions: u64,
    #[serde(default, alias = "average_transaction", alias = "avgTransaction")]
    pub average_transaction: f64,
    #[serde(default, alias = "active_users")]
    pub active_users: u64,
}

/// Transaction count and volume for one transaction type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeBreakdown {
    #[serde(rename = "type", alias = "name", alias = "category")]
    pub kind: String,
    #[serde(default, alias = "transactions")]
    pub count: u64,
    #[serde(default, alias = "volume", alias = "total")]
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub summary: AnalyticsSummary,
    pub revenue_by_day: Vec<SeriesPoint>,
    pub transactions_by_type: Vec<TypeBreakdown>,
    pub user_growth: Vec<SeriesPoint>,
}

impl AnalyticsReport {
    pub fn is_empty(&self) -> bool {
        self.revenue_by_day.is_empty()
            && self.transactions_by_type.is_empty()
            && self.user_growth.is_empty()
    }
}
