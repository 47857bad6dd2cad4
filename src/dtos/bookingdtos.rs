use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::bookingmodel::{Booking, BookingPaymentStatus, BookingStatus};

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponseDto {
    pub id: Uuid,
    pub reference: String,
    pub property_id: Uuid,
    pub status: BookingStatus,
    pub payment_status: BookingPaymentStatus,
    pub rent_amount: i64,
    pub security_deposit: i64,
    pub total_amount: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Booking> for BookingResponseDto {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            reference: booking.reference,
            property_id: booking.property_id,
            status: booking.status,
            payment_status: booking.payment_status,
            rent_amount: booking.rent_amount,
            security_deposit: booking.security_deposit,
            total_amount: booking.total_amount,
            created_at: booking.created_at,
        }
    }
}
