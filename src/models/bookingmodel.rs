use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Active,
    Completed,
    Cancelled,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "booking_payment_status", rename_all = "lowercase")]
pub enum BookingPaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: Uuid,
    // Doubles as the gateway order id
    pub reference: String,
    pub property_id: Uuid,
    pub customer_id: Uuid,
    pub owner_id: Uuid,
    pub status: BookingStatus,
    pub payment_status: BookingPaymentStatus,
    pub rent_amount: i64,
    pub security_deposit: i64,
    pub total_amount: i64,
    pub commission_amount: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "agreement_status", rename_all = "lowercase")]
pub enum AgreementStatus {
    Active,
    Terminated,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct RentalAgreement {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub property_id: Uuid,
    pub customer_id: Uuid,
    pub owner_id: Uuid,
    pub lease_start: DateTime<Utc>,
    pub lease_end: DateTime<Utc>,
    pub monthly_rent: i64,
    pub security_deposit: i64,
    pub status: AgreementStatus,
    // "YYYY-MM" of the last period the recurring job charged
    pub last_billed_period: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

pub fn generate_booking_reference() -> String {
    format!(
        "RNT_{}",
        uuid::Uuid::new_v4().to_string().replace("-", "").to_uppercase()[..16].to_string()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_reference_shape() {
        let reference = generate_booking_reference();
        assert!(reference.starts_with("RNT_"));
        assert_eq!(reference.len(), 20);

        // References must be unique per checkout
        assert_ne!(reference, generate_booking_reference());
    }
}
