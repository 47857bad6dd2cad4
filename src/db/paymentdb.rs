use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{Error, FromRow};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::paymentmodel::{Payment, PaymentStatus, PaymentType, StoredPaymentToken};

/// A rental agreement joined with everything the billing job needs to
/// charge it and notify the parties.
#[derive(Debug, Clone, FromRow)]
pub struct DueAgreement {
    pub agreement_id: Uuid,
    pub booking_id: Uuid,
    pub property_id: Uuid,
    pub customer_id: Uuid,
    pub owner_id: Uuid,
    pub monthly_rent: i64,
    pub property_title: String,
    pub customer_name: String,
    pub customer_email: String,
    pub owner_name: String,
    pub owner_email: String,
    pub token: String,
}

#[derive(Debug, FromRow)]
pub struct PaymentHistoryRow {
    pub id: Uuid,
    pub property_title: String,
    pub amount: i64,
    pub commission_amount: i64,
    pub owner_payout: i64,
    pub payment_type: PaymentType,
    pub status: PaymentStatus,
    pub gateway_order_id: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait PaymentExt {
    async fn get_payment_by_gateway_id(
        &self,
        gateway_payment_id: &str,
    ) -> Result<Option<Payment>, Error>;

    /// Keyed, idempotent status update. Only status and the raw gateway
    /// blob change; commission/owner_payout never move here.
    async fn update_payment_status_by_gateway_id(
        &self,
        gateway_payment_id: &str,
        status: PaymentStatus,
        raw_response: Option<JsonValue>,
    ) -> Result<Option<Payment>, Error>;

    async fn insert_payment(
        &self,
        booking_id: Option<Uuid>,
        property_id: Uuid,
        customer_id: Uuid,
        owner_id: Uuid,
        amount: i64,
        commission_amount: i64,
        owner_payout: i64,
        payment_type: PaymentType,
        status: PaymentStatus,
        gateway_order_id: String,
        gateway_payment_id: Option<String>,
        raw_response: Option<JsonValue>,
    ) -> Result<Option<Payment>, Error>;

    async fn get_payments_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<PaymentHistoryRow>, Error>;

    async fn get_payments_by_owner(&self, owner_id: Uuid)
        -> Result<Vec<PaymentHistoryRow>, Error>;

    async fn get_all_payments(&self) -> Result<Vec<PaymentHistoryRow>, Error>;

    // Stored tokens for recurring billing
    async fn upsert_stored_token(
        &self,
        customer_id: Uuid,
        token: String,
        card_holder_name: Option<String>,
        card_no_masked: Option<String>,
    ) -> Result<StoredPaymentToken, Error>;

    async fn get_stored_token(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<StoredPaymentToken>, Error>;

    // Recurring billing support
    async fn get_due_agreements(&self, period: &str) -> Result<Vec<DueAgreement>, Error>;

    /// Atomically claim the billing period for an agreement. Returns false
    /// when another run already claimed it (re-entrancy guard).
    async fn claim_billing_period(&self, agreement_id: Uuid, period: &str)
        -> Result<bool, Error>;
}

const PAYMENT_COLUMNS: &str = "id, booking_id, property_id, customer_id, owner_id, amount, \
     commission_amount, owner_payout, payment_type, status, gateway_order_id, \
     gateway_payment_id, raw_response, created_at, updated_at";

const HISTORY_COLUMNS: &str = "p.id, pr.title AS property_title, p.amount, \
     p.commission_amount, p.owner_payout, p.payment_type, p.status, p.gateway_order_id, \
     p.created_at";

#[async_trait]
impl PaymentExt for DBClient {
    async fn get_payment_by_gateway_id(
        &self,
        gateway_payment_id: &str,
    ) -> Result<Option<Payment>, Error> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE gateway_payment_id = $1"
        ))
        .bind(gateway_payment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    async fn update_payment_status_by_gateway_id(
        &self,
        gateway_payment_id: &str,
        status: PaymentStatus,
        raw_response: Option<JsonValue>,
    ) -> Result<Option<Payment>, Error> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            r#"
            UPDATE payments
            SET status = $2,
                raw_response = COALESCE($3, raw_response),
                updated_at = NOW()
            WHERE gateway_payment_id = $1
            RETURNING {PAYMENT_COLUMNS}
            "#
        ))
        .bind(gateway_payment_id)
        .bind(status)
        .bind(raw_response)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    async fn insert_payment(
        &self,
        booking_id: Option<Uuid>,
        property_id: Uuid,
        customer_id: Uuid,
        owner_id: Uuid,
        amount: i64,
        commission_amount: i64,
        owner_payout: i64,
        payment_type: PaymentType,
        status: PaymentStatus,
        gateway_order_id: String,
        gateway_payment_id: Option<String>,
        raw_response: Option<JsonValue>,
    ) -> Result<Option<Payment>, Error> {
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
        .bind(booking_id)
        .bind(property_id)
        .bind(customer_id)
        .bind(owner_id)
        .bind(amount)
        .bind(commission_amount)
        .bind(owner_payout)
        .bind(payment_type)
        .bind(status)
        .bind(gateway_order_id)
        .bind(gateway_payment_id)
        .bind(raw_response)
        .fetch_optional(&self.pool)
        .await?;

        Ok(payment)
    }

    async fn get_payments_by_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<PaymentHistoryRow>, Error> {
        let rows = sqlx::query_as::<_, PaymentHistoryRow>(&format!(
            r#"
            SELECT {HISTORY_COLUMNS}
            FROM payments p
            JOIN properties pr ON pr.id = p.property_id
            WHERE p.customer_id = $1
            ORDER BY p.created_at DESC
            "#
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get_payments_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<PaymentHistoryRow>, Error> {
        let rows = sqlx::query_as::<_, PaymentHistoryRow>(&format!(
            r#"
            SELECT {HISTORY_COLUMNS}
            FROM payments p
            JOIN properties pr ON pr.id = p.property_id
            WHERE p.owner_id = $1
            ORDER BY p.created_at DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get_all_payments(&self) -> Result<Vec<PaymentHistoryRow>, Error> {
        let rows = sqlx::query_as::<_, PaymentHistoryRow>(&format!(
            r#"
            SELECT {HISTORY_COLUMNS}
            FROM payments p
            JOIN properties pr ON pr.id = p.property_id
            ORDER BY p.created_at DESC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn upsert_stored_token(
        &self,
        customer_id: Uuid,
        token: String,
        card_holder_name: Option<String>,
        card_no_masked: Option<String>,
    ) -> Result<StoredPaymentToken, Error> {
        let stored = sqlx::query_as::<_, StoredPaymentToken>(
            r#"
            INSERT INTO stored_payment_tokens
            (customer_id, token, card_holder_name, card_no_masked)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (customer_id) DO UPDATE
            SET token = EXCLUDED.token,
                card_holder_name = EXCLUDED.card_holder_name,
                card_no_masked = EXCLUDED.card_no_masked,
                updated_at = NOW()
            RETURNING id, customer_id, token, card_holder_name, card_no_masked,
                      created_at, updated_at
            "#,
        )
        .bind(customer_id)
        .bind(token)
        .bind(card_holder_name)
        .bind(card_no_masked)
        .fetch_one(&self.pool)
        .await?;

        Ok(stored)
    }

    async fn get_stored_token(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<StoredPaymentToken>, Error> {
        let token = sqlx::query_as::<_, StoredPaymentToken>(
            r#"
            SELECT id, customer_id, token, card_holder_name, card_no_masked,
                   created_at, updated_at
            FROM stored_payment_tokens
            WHERE customer_id = $1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(token)
    }

    async fn get_due_agreements(&self, period: &str) -> Result<Vec<DueAgreement>, Error> {
        let due = sqlx::query_as::<_, DueAgreement>(
            r#"
            SELECT ra.id AS agreement_id, ra.booking_id, ra.property_id, ra.customer_id,
                   ra.owner_id, ra.monthly_rent, pr.title AS property_title,
                   cu.name AS customer_name, cu.email AS customer_email,
                   ow.name AS owner_name, ow.email AS owner_email,
                   t.token
            FROM rental_agreements ra
            JOIN properties pr ON pr.id = ra.property_id
            JOIN users cu ON cu.id = ra.customer_id
            JOIN users ow ON ow.id = ra.owner_id
            JOIN stored_payment_tokens t ON t.customer_id = ra.customer_id
            WHERE ra.status = 'active'
              AND ra.lease_start <= NOW()
              AND ra.lease_end >= NOW()
              AND (ra.last_billed_period IS NULL OR ra.last_billed_period < $1)
            ORDER BY ra.created_at ASC
            "#,
        )
        .bind(period)
        .fetch_all(&self.pool)
        .await?;

        Ok(due)
    }

    async fn claim_billing_period(
        &self,
        agreement_id: Uuid,
        period: &str,
    ) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE rental_agreements
            SET last_billed_period = $2, updated_at = NOW()
            WHERE id = $1
              AND status = 'active'
              AND (last_billed_period IS NULL OR last_billed_period < $2)
            "#,
        )
        .bind(agreement_id)
        .bind(period)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
