use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "payment_type", rename_all = "snake_case")]
pub enum PaymentType {
    Rent,
    SecurityDeposit,
}

impl PaymentType {
    pub fn to_str(&self) -> &str {
        match self {
            PaymentType::Rent => "rent",
            PaymentType::SecurityDeposit => "security_deposit",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Successful,
    Failed,
}

impl PaymentStatus {
    pub fn to_str(&self) -> &str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Successful => "successful",
            PaymentStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Option<Uuid>,
    pub property_id: Uuid,
    pub customer_id: Uuid,
    pub owner_id: Uuid,

    // LKR cents; amount = commission_amount + owner_payout
    pub amount: i64,
    pub commission_amount: i64,
    pub owner_payout: i64,

    pub payment_type: PaymentType,
    pub status: PaymentStatus,

    pub gateway_order_id: String,
    pub gateway_payment_id: Option<String>,
    pub raw_response: Option<JsonValue>,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct StoredPaymentToken {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub token: String,
    pub card_holder_name: Option<String>,
    pub card_no_masked: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

// Helper functions for amount conversion
pub fn rupees_to_cents(rupees: f64) -> i64 {
    (rupees * 100.0).round() as i64
}

pub fn cents_to_rupees(cents: i64) -> f64 {
    cents as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rupees_to_cents() {
        assert_eq!(rupees_to_cents(100.0), 10000);
        assert_eq!(rupees_to_cents(0.50), 50);
        assert_eq!(rupees_to_cents(123.45), 12345);
    }

    #[test]
    fn test_cents_to_rupees() {
        assert_eq!(cents_to_rupees(10000), 100.0);
        assert_eq!(cents_to_rupees(50), 0.50);
        assert_eq!(cents_to_rupees(12345), 123.45);
    }
}
