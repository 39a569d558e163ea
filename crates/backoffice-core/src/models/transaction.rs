use serde::{Deserialize, Serialize};

use super::contains_ignore_case;
use crate::utils::{format_currency, mask_account_number, mask_card_number, title_case};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    BillPayment,
    MoneyTransfer,
    CardPayment,
    Savings,
    #[serde(other)]
    Other,
}

impl TransactionType {
    /// Filter choices in cycling order (`None` = all)
    pub const FILTERS: [Option<TransactionType>; 5] = [
        None,
        Some(TransactionType::BillPayment),
        Some(TransactionType::MoneyTransfer),
        Some(TransactionType::CardPayment),
        Some(TransactionType::Savings),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::BillPayment => "bill_payment",
            TransactionType::MoneyTransfer => "money_transfer",
            TransactionType::CardPayment => "card_payment",
            TransactionType::Savings => "savings",
            TransactionType::Other => "other",
        }
    }

    pub fn label(&self) -> String {
        title_case(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl TransactionStatus {
    pub const FILTERS: [Option<TransactionStatus>; 5] = [
        None,
        Some(TransactionStatus::Completed),
        Some(TransactionStatus::Pending),
        Some(TransactionStatus::Failed),
        Some(TransactionStatus::Cancelled),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Cancelled => "cancelled",
            TransactionStatus::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> String {
        title_case(self.as_str())
    }
}

/// Payment instrument reference. Only the last four digits ever leave the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(alias = "lastFourDigits", alias = "last_four_digits")]
    pub last4: Option<String>,
}

impl PaymentMethod {
    /// Masked display form: card numbers as `**** **** **** 1234`, anything else as `****1234`
    pub fn masked(&self) -> String {
        if self.kind.eq_ignore_ascii_case("card") {
            mask_card_number(self.last4.as_deref())
        } else {
            mask_account_number(self.last4.as_deref())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(alias = "transaction_id", alias = "id")]
    pub transaction_id: String,
    #[serde(alias = "user_id")]
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub status: TransactionStatus,
    #[serde(alias = "payment_method")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(alias = "created_at")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub description: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Transaction {
    pub fn amount_display(&self) -> String {
        format_currency(self.amount, &self.currency)
    }

    pub fn instrument_display(&self) -> String {
        self.payment_method
            .as_ref()
            .map(PaymentMethod::masked)
            .unwrap_or_else(|| "N/A".to_string())
    }

    /// Search by transaction ID, user ID or description
    pub fn matches_search(&self, query: &str) -> bool {
        query.is_empty()
            || contains_ignore_case(&self.transaction_id, query)
            || contains_ignore_case(&self.description, query)
            || self
                .user_id
                .as_deref()
                .is_some_and(|u| contains_ignore_case(u, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_transaction() {
        let json = r#"{
            "transactionId": "txn-001",
            "userId": "user-001",
            "type": "bill_payment",
            "amount": 150.00,
            "status": "completed",
            "paymentMethod": { "type": "card", "last4": "4242" },
            "createdAt": "2025-01-10T10:30:00Z",
            "description": "Electricity Bill Payment"
        }"#;
        let t: Transaction = serde_json::from_str(json).expect("parse");
        assert_eq!(t.kind, TransactionType::BillPayment);
        assert_eq!(t.currency, "USD");
        assert_eq!(t.amount_display(), "$150.00");
        assert_eq!(t.instrument_display(), "**** **** **** 4242");
    }

    #[test]
    fn test_bank_instrument_masking() {
        let pm = PaymentMethod {
            kind: "bank".into(),
            last4: Some("1234".into()),
        };
        assert_eq!(pm.masked(), "****1234");
    }

    #[test]
    fn test_unknown_type_maps_to_other() {
        let t: Transaction = serde_json::from_str(
            r#"{"id":"t","type":"crypto_swap","status":"settled","amount":1}"#,
        )
        .expect("parse");
        assert_eq!(t.kind, TransactionType::Other);
        assert_eq!(t.status, TransactionStatus::Unknown);
    }
}
