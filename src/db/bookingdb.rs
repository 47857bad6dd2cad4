use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::Error;
use uuid::Uuid;

use super::db::DBClient;
use crate::{
    models::{
        bookingmodel::{Booking, BookingStatus, RentalAgreement},
        paymentmodel::{Payment, PaymentStatus, PaymentType},
        propertymodel::Property,
    },
    service::pricing,
};

/// Everything the settlement transaction needs, resolved by the caller
/// before any database work starts.
#[derive(Debug, Clone)]
pub struct SettlementInput {
    pub order_id: String,
    pub gateway_payment_id: String,
    pub property_id: Uuid,
    pub customer_id: Uuid,
    pub amount: i64,
    pub commission_rate_bp: i64,
    pub lease_start: DateTime<Utc>,
    pub lease_end: DateTime<Utc>,
    pub raw_response: Option<JsonValue>,
}

#[derive(Debug)]
pub enum SettlementOutcome {
    /// A payment with this gateway id already exists; nothing was written.
    AlreadyProcessed,
    Settled {
        booking: Booking,
        agreement: RentalAgreement,
        payment: Payment,
    },
}

#[async_trait]
pub trait BookingExt {
    async fn create_pending_booking(
        &self,
        reference: String,
        property: &Property,
        customer_id: Uuid,
        commission_rate_bp: i64,
    ) -> Result<Booking, Error>;

    async fn get_booking_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, Error>;

    async fn get_booking_by_reference(&self, reference: &str) -> Result<Option<Booking>, Error>;

    async fn get_bookings_by_customer(&self, customer_id: Uuid) -> Result<Vec<Booking>, Error>;

    async fn get_bookings_by_owner(&self, owner_id: Uuid) -> Result<Vec<Booking>, Error>;

    async fn get_active_agreement_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<RentalAgreement>, Error>;

    /// Move a still-pending booking to the given terminal status.
    /// Returns false when the booking was not pending (or unknown).
    async fn close_pending_booking(
        &self,
        reference: &str,
        status: BookingStatus,
    ) -> Result<bool, Error>;

    /// Apply a confirmed gateway payment: booking, rental agreement,
    /// payment row and property status move together or not at all.
    async fn settle_successful_payment(
        &self,
        input: SettlementInput,
    ) -> Result<SettlementOutcome, Error>;
}

const BOOKING_COLUMNS: &str = "id, reference, property_id, customer_id, owner_id, status, \
     payment_status, rent_amount, security_deposit, total_amount, commission_amount, \
     created_at, updated_at";

const AGREEMENT_COLUMNS: &str = "id, booking_id, property_id, customer_id, owner_id, \
     lease_start, lease_end, monthly_rent, security_deposit, status, last_billed_period, \
     created_at, updated_at";

const PAYMENT_COLUMNS: &str = "id, booking_id, property_id, customer_id, owner_id, amount, \
     commission_amount, owner_payout, payment_type, status, gateway_order_id, \
     gateway_payment_id, raw_response, created_at, updated_at";

#[async_trait]
impl BookingExt for DBClient {
    async fn create_pending_booking(
        &self,
        reference: String,
        property: &Property,
        customer_id: Uuid,
        commission_rate_bp: i64,
    ) -> Result<Booking, Error> {
        let total = property.rent_amount + property.security_deposit;
        let split = pricing::split_amount(total, commission_rate_bp);

        let booking = sqlx::query_as::<_, Booking>(&format!(
            r#"
            INSERT INTO bookings
            (reference, property_id, customer_id, owner_id, status, payment_status,
             rent_amount, security_deposit, total_amount, commission_amount)
            VALUES ($1, $2, $3, $4, 'pending', 'unpaid', $5, $6, $7, $8)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(reference)
        .bind(property.id)
        .bind(customer_id)
        .bind(property.owner_id)
        .bind(property.rent_amount)
        .bind(property.security_deposit)
        .bind(total)
        .bind(split.commission)
        .fetch_one(&self.pool)
        .await?;

        Ok(booking)
    }

    async fn get_booking_by_id(&self, booking_id: Uuid) -> Result<Option<Booking>, Error> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    async fn get_booking_by_reference(&self, reference: &str) -> Result<Option<Booking>, Error> {
        let booking = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE reference = $1"
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await?;

        Ok(booking)
    }

    async fn get_bookings_by_customer(&self, customer_id: Uuid) -> Result<Vec<Booking>, Error> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE customer_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    async fn get_bookings_by_owner(&self, owner_id: Uuid) -> Result<Vec<Booking>, Error> {
        let bookings = sqlx::query_as::<_, Booking>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS} FROM bookings
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }

    async fn get_active_agreement_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<RentalAgreement>, Error> {
        let agreement = sqlx::query_as::<_, RentalAgreement>(&format!(
            r#"
            SELECT {AGREEMENT_COLUMNS} FROM rental_agreements
            WHERE customer_id = $1 AND status = 'active'
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(agreement)
    }

    async fn close_pending_booking(
        &self,
        reference: &str,
        status: BookingStatus,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET status = $2, updated_at = NOW()
            WHERE reference = $1 AND status = 'pending'
            "#,
        )
        .bind(reference)
        .bind(status)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn settle_successful_payment(
        &self,
        input: SettlementInput,
    ) -> Result<SettlementOutcome, Error> {
        let mut tx = self.pool.begin().await?;

        // Lock the property row first; concurrent return/notify deliveries
        // for the same order serialize here.
        let property = sqlx::query_as::<_, Property>(
            r#"
            SELECT id, owner_id, title, description, address, city, property_type,
                   bedrooms, bathrooms, rent_amount, security_deposit, status,
                   is_available, created_at, updated_at
            FROM properties WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(input.property_id)
        .fetch_one(&mut *tx)
        .await?;

        let duplicate = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM payments WHERE gateway_payment_id = $1",
        )
        .bind(&input.gateway_payment_id)
        .fetch_optional(&mut *tx)
        .await?;

        if duplicate.is_some() {
            tx.rollback().await?;
            return Ok(SettlementOutcome::AlreadyProcessed);
        }

        let pending = sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE reference = $1 FOR UPDATE"
        ))
        .bind(&input.order_id)
        .fetch_optional(&mut *tx)
        .await?;

        let booking = match pending {
            Some(existing) => {
                sqlx::query_as::<_, Booking>(&format!(
                    r#"
                    UPDATE bookings
                    SET status = 'active', payment_status = 'paid', updated_at = NOW()
                    WHERE id = $1
                    RETURNING {BOOKING_COLUMNS}
                    "#
                ))
                .bind(existing.id)
                .fetch_one(&mut *tx)
                .await?
            }
            // The notification can land before (or without) a checkout-time
            // booking row; reconstruct it from the property.
            None => {
                let total = property.rent_amount + property.security_deposit;
                let split = pricing::split_amount(total, input.commission_rate_bp);

                sqlx::query_as::<_, Booking>(&format!(
                    r#"
                    INSERT INTO bookings
                    (reference, property_id, customer_id, owner_id, status, payment_status,
                     rent_amount, security_deposit, total_amount, commission_amount)
                    VALUES ($1, $2, $3, $4, 'active', 'paid', $5, $6, $7, $8)
                    RETURNING {BOOKING_COLUMNS}
                    "#
                ))
                .bind(&input.order_id)
                .bind(property.id)
                .bind(input.customer_id)
                .bind(property.owner_id)
                .bind(property.rent_amount)
                .bind(property.security_deposit)
                .bind(total)
                .bind(split.commission)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        let agreement = sqlx::query_as::<_, RentalAgreement>(&format!(
            r#"
            INSERT INTO rental_agreements
            (booking_id, property_id, customer_id, owner_id, lease_start, lease_end,
             monthly_rent, security_deposit, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'active')
            RETURNING {AGREEMENT_COLUMNS}
            "#
        ))
        .bind(booking.id)
        .bind(property.id)
        .bind(booking.customer_id)
        .bind(property.owner_id)
        .bind(input.lease_start)
        .bind(input.lease_end)
        .bind(property.rent_amount)
        .bind(property.security_deposit)
        .fetch_one(&mut *tx)
        .await?;

        let split = pricing::split_amount(input.amount, input.commission_rate_bp);

        // ON CONFLICT backstops the duplicate check above against a race
        // between two transactions that both passed it.
        let payment = sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payments
            (booking_id, property_id, customer_id, owner_id, amount, commission_amount,
             owner_payout, payment_type, status, gateway_order_id, gateway_payment_id,
             raw_response)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (gateway_payment_id) DO NOTHING
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(booking.id)
        .bind(property.id)
        .bind(booking.customer_id)
        .bind(property.owner_id)
        .bind(input.amount)
        .bind(split.commission)
        .bind(split.owner_payout)
        .bind(PaymentType::SecurityDeposit)
        .bind(PaymentStatus::Successful)
        .bind(&input.order_id)
        .bind(&input.gateway_payment_id)
        .bind(input.raw_response)
        .fetch_optional(&mut *tx)
        .await?;

        let payment = match payment {
            Some(payment) => payment,
            None => {
                tx.rollback().await?;
                return Ok(SettlementOutcome::AlreadyProcessed);
            }
        };

        sqlx::query(
            r#"
            UPDATE properties
            SET status = 'rented', is_available = FALSE, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(property.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SettlementOutcome::Settled {
            booking,
            agreement,
            payment,
        })
    }
}
