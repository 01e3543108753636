//! Order models

use serde::{Deserialize, Serialize};

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Payment settlement status
///
/// Transitions only pending → completed, never reverses. Cash orders are
/// created already completed; wallet orders start pending and are completed
/// by payment reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub business_id: i64,
    pub customer_id: i64,
    pub total_amount: f64,
    /// Upfront amount due for wallet-enabled checkouts; 0 for cash
    pub partial_amount_total: f64,
    pub delivery_location: Option<String>,
    pub summarized_notes: Option<String>,
    pub order_status: OrderStatus,
    pub order_payment_status: PaymentStatus,
    /// Gateway-issued transaction token; set when payment is initiated
    pub order_token: Option<String>,
    pub created_at: i64,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Order line item with price snapshot
///
/// `price` is captured at order time so historical orders stay accurate when
/// the live product price changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Completed).unwrap(),
            "\"completed\""
        );

        let s: PaymentStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(s, PaymentStatus::Pending);
    }

    #[test]
    fn test_status_as_str_matches_db_values() {
        assert_eq!(OrderStatus::Pending.as_str(), "pending");
        assert_eq!(PaymentStatus::Pending.as_str(), "pending");
        assert_eq!(PaymentStatus::Completed.as_str(), "completed");
    }
}
