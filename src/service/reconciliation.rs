use std::sync::Arc;

use chrono::{Duration, Months, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    db::{
        bookingdb::{BookingExt, SettlementInput, SettlementOutcome},
        db::DBClient,
        paymentdb::PaymentExt,
        propertydb::PropertyExt,
        userdb::UserExt,
    },
    dtos::paymentdtos::{GatewayNotification, GatewayReturnQuery},
    error::HttpError,
    mail::mails::{send_owner_payout_email, send_payment_receipt_email},
    models::{
        bookingmodel::BookingStatus,
        paymentmodel::{PaymentStatus, PaymentType},
    },
    service::{
        gateway::{parse_amount_cents, CheckoutIntent, PaymentGateway},
        pricing,
    },
};

// Lease terms applied at settlement time
const LEASE_START_OFFSET_DAYS: i64 = 7;
const LEASE_DURATION_MONTHS: u32 = 12;

/// Gateway outcome classes, mapped from the numeric status code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusClass {
    Success,
    Cancelled,
    Failed,
    /// No status code at all: the customer abandoned or the redirect was
    /// cut short. Nothing may be mutated.
    Interrupted,
}

pub fn classify_status(status_code: Option<&str>) -> StatusClass {
    match status_code {
        None => StatusClass::Interrupted,
        Some("2") => StatusClass::Success,
        Some("0") => StatusClass::Cancelled,
        Some(_) => StatusClass::Failed,
    }
}

/// What the browser-return handler should tell the user.
#[derive(Debug, PartialEq)]
pub enum ReturnDisposition {
    Settled { reference: String },
    AlreadyProcessed { reference: String },
    Cancelled { reference: String },
    Failed { reference: String },
    Interrupted,
}

#[derive(Debug, Error)]
pub enum NotifyRejection {
    #[error("notification signature mismatch")]
    InvalidSignature,

    #[error("malformed notification: {0}")]
    BadPayload(String),

    #[error("notification processing failed: {0}")]
    Internal(String),
}

#[derive(Clone)]
pub struct ReconciliationService {
    db_client: Arc<DBClient>,
    gateway: Arc<PaymentGateway>,
    commission_rate_bp: i64,
}

impl ReconciliationService {
    pub fn new(db_client: Arc<DBClient>, gateway: Arc<PaymentGateway>, commission_rate_bp: i64) -> Self {
        Self {
            db_client,
            gateway,
            commission_rate_bp,
        }
    }

    /// Browser return path. Untrusted on its own: the signature is checked
    /// when present, and the notify path re-reconciles the same order.
    pub async fn handle_return(
        &self,
        query: GatewayReturnQuery,
    ) -> Result<ReturnDisposition, HttpError> {
        let class = classify_status(query.status_code.as_deref());
        if class == StatusClass::Interrupted {
            return Ok(ReturnDisposition::Interrupted);
        }

        let order_id = query
            .order_id
            .clone()
            .ok_or_else(|| HttpError::bad_request("Missing order_id"))?;

        if let (Some(sig), Some(amount), Some(currency), Some(status_code)) = (
            query.md5sig.as_deref(),
            query.payhere_amount.as_deref(),
            query.payhere_currency.as_deref(),
            query.status_code.as_deref(),
        ) {
            if !self
                .gateway
                .verify_notification(&order_id, amount, currency, status_code, sig)
            {
                tracing::warn!("Gateway return signature mismatch for order {}", order_id);
                return Err(HttpError::bad_request("Invalid gateway signature"));
            }
        }

        match class {
            StatusClass::Success => {
                let payment_id = query
                    .payment_id
                    .clone()
                    .ok_or_else(|| HttpError::bad_request("Missing payment_id"))?;
                let amount = query
                    .payhere_amount
                    .as_deref()
                    .and_then(parse_amount_cents)
                    .ok_or_else(|| HttpError::bad_request("Missing or malformed amount"))?;

                let (property_id, customer_id) = self
                    .resolve_parties(&order_id, query.custom_1.as_deref(), query.custom_2.as_deref())
                    .await
                    .map_err(HttpError::bad_request)?;

                let raw = serde_json::to_value(&query).ok();

                let outcome = self
                    .settle(&order_id, &payment_id, amount, property_id, customer_id, raw)
                    .await
                    .map_err(|e| {
                        tracing::error!(
                            "Settlement failed for order {} (payment {}): {}",
                            order_id,
                            payment_id,
                            e
                        );
                        HttpError::server_error(
                            "Payment received but processing failed. Our team has been notified.",
                        )
                    })?;

                match outcome {
                    SettlementOutcome::AlreadyProcessed => {
                        Ok(ReturnDisposition::AlreadyProcessed { reference: order_id })
                    }
                    SettlementOutcome::Settled { .. } => {
                        Ok(ReturnDisposition::Settled { reference: order_id })
                    }
                }
            }
            StatusClass::Cancelled => {
                let closed = self
                    .db_client
                    .close_pending_booking(&order_id, BookingStatus::Cancelled)
                    .await
                    .map_err(|e| HttpError::server_error(e.to_string()))?;
                tracing::info!("Order {} cancelled by customer (closed={})", order_id, closed);
                Ok(ReturnDisposition::Cancelled { reference: order_id })
            }
            StatusClass::Failed => {
                let _ = self
                    .db_client
                    .close_pending_booking(&order_id, BookingStatus::Cancelled)
                    .await
                    .map_err(|e| HttpError::server_error(e.to_string()))?;
                tracing::warn!(
                    "Order {} failed at gateway (status_code {:?})",
                    order_id,
                    query.status_code
                );
                Ok(ReturnDisposition::Failed { reference: order_id })
            }
            StatusClass::Interrupted => unreachable!("handled above"),
        }
    }

    /// Server notification path. Authoritative; delivered at least once,
    /// so every branch must tolerate re-delivery.
    pub async fn handle_notification(
        &self,
        notification: GatewayNotification,
    ) -> Result<(), NotifyRejection> {
        if !self.gateway.verify_notification(
            &notification.order_id,
            &notification.payhere_amount,
            &notification.payhere_currency,
            &notification.status_code,
            &notification.md5sig,
        ) {
            tracing::warn!(
                "Rejected gateway notification with bad signature (order {})",
                notification.order_id
            );
            return Err(NotifyRejection::InvalidSignature);
        }

        let intent = notification
            .intent
            .as_deref()
            .and_then(CheckoutIntent::from_str)
            .ok_or_else(|| {
                tracing::warn!(
                    "Notification for order {} carries no recognizable intent",
                    notification.order_id
                );
                NotifyRejection::BadPayload("unknown notification intent".to_string())
            })?;

        match intent {
            CheckoutIntent::TokenizeCard => self.apply_tokenization(&notification).await,
            CheckoutIntent::RentCheckout => self.apply_checkout_outcome(&notification).await,
            CheckoutIntent::RecurringCharge => self.apply_recurring_outcome(&notification).await,
        }
    }

    async fn apply_tokenization(
        &self,
        notification: &GatewayNotification,
    ) -> Result<(), NotifyRejection> {
        if classify_status(Some(notification.status_code.as_str())) != StatusClass::Success {
            tracing::info!(
                "Tokenization for order {} did not succeed (status_code {})",
                notification.order_id,
                notification.status_code
            );
            return Ok(());
        }

        let customer_id = parse_uuid(notification.custom_2.as_deref())
            .ok_or_else(|| NotifyRejection::BadPayload("missing customer reference".to_string()))?;
        let token = notification
            .payment_token
            .clone()
            .ok_or_else(|| NotifyRejection::BadPayload("missing payment_token".to_string()))?;

        self.db_client
            .upsert_stored_token(
                customer_id,
                token,
                notification.card_holder_name.clone(),
                notification.card_no.clone(),
            )
            .await
            .map_err(|e| NotifyRejection::Internal(e.to_string()))?;

        tracing::info!("Stored payment token for customer {}", customer_id);
        Ok(())
    }

    async fn apply_checkout_outcome(
        &self,
        notification: &GatewayNotification,
    ) -> Result<(), NotifyRejection> {
        match classify_status(Some(notification.status_code.as_str())) {
            StatusClass::Success => {
                // Fast path for re-delivery: the payment row already exists.
                if self
                    .db_client
                    .get_payment_by_gateway_id(&notification.payment_id)
                    .await
                    .map_err(|e| NotifyRejection::Internal(e.to_string()))?
                    .is_some()
                {
                    tracing::info!(
                        "Notification for payment {} already applied",
                        notification.payment_id
                    );
                    return Ok(());
                }

                let amount = parse_amount_cents(&notification.payhere_amount).ok_or_else(|| {
                    NotifyRejection::BadPayload("malformed payhere_amount".to_string())
                })?;

                let (property_id, customer_id) = self
                    .resolve_parties(
                        &notification.order_id,
                        notification.custom_1.as_deref(),
                        notification.custom_2.as_deref(),
                    )
                    .await
                    .map_err(NotifyRejection::BadPayload)?;

                let raw = serde_json::to_value(notification).ok();

                self.settle(
                    &notification.order_id,
                    &notification.payment_id,
                    amount,
                    property_id,
                    customer_id,
                    raw,
                )
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Settlement from notification failed for order {}: {}",
                        notification.order_id,
                        e
                    );
                    NotifyRejection::Internal(e.to_string())
                })?;

                Ok(())
            }
            StatusClass::Cancelled | StatusClass::Failed => {
                let _ = self
                    .db_client
                    .close_pending_booking(&notification.order_id, BookingStatus::Cancelled)
                    .await
                    .map_err(|e| NotifyRejection::Internal(e.to_string()))?;
                tracing::info!(
                    "Order {} closed after gateway status {}",
                    notification.order_id,
                    notification.status_code
                );
                Ok(())
            }
            StatusClass::Interrupted => Ok(()),
        }
    }

    async fn apply_recurring_outcome(
        &self,
        notification: &GatewayNotification,
    ) -> Result<(), NotifyRejection> {
        let status = match classify_status(Some(notification.status_code.as_str())) {
            StatusClass::Success => PaymentStatus::Successful,
            StatusClass::Cancelled => PaymentStatus::Pending,
            _ => PaymentStatus::Failed,
        };

        let raw = serde_json::to_value(notification).ok();

        // Keyed update: re-applying the same notification is a no-op for
        // the money columns.
        let updated = self
            .db_client
            .update_payment_status_by_gateway_id(&notification.payment_id, status, raw.clone())
            .await
            .map_err(|e| NotifyRejection::Internal(e.to_string()))?;

        if updated.is_some() {
            return Ok(());
        }

        // The notification can arrive before the billing job recorded its
        // outcome; insert the row from the notification itself.
        let (property_id, customer_id) = self
            .resolve_parties(
                &notification.order_id,
                notification.custom_1.as_deref(),
                notification.custom_2.as_deref(),
            )
            .await
            .map_err(NotifyRejection::BadPayload)?;

        let property = self
            .db_client
            .get_property_by_id(property_id)
            .await
            .map_err(|e| NotifyRejection::Internal(e.to_string()))?
            .ok_or_else(|| NotifyRejection::BadPayload("unknown property".to_string()))?;

        let amount = parse_amount_cents(&notification.payhere_amount)
            .ok_or_else(|| NotifyRejection::BadPayload("malformed payhere_amount".to_string()))?;
        let split = pricing::split_amount(amount, self.commission_rate_bp);

        self.db_client
            .insert_payment(
                None,
                property.id,
                customer_id,
                property.owner_id,
                amount,
                split.commission,
                split.owner_payout,
                PaymentType::Rent,
                status,
                notification.order_id.clone(),
                Some(notification.payment_id.clone()),
                raw,
            )
            .await
            .map_err(|e| NotifyRejection::Internal(e.to_string()))?;

        Ok(())
    }

    async fn settle(
        &self,
        order_id: &str,
        gateway_payment_id: &str,
        amount: i64,
        property_id: Uuid,
        customer_id: Uuid,
        raw_response: Option<serde_json::Value>,
    ) -> Result<SettlementOutcome, sqlx::Error> {
        let lease_start = Utc::now() + Duration::days(LEASE_START_OFFSET_DAYS);
        let lease_end = lease_start
            .checked_add_months(Months::new(LEASE_DURATION_MONTHS))
            .unwrap_or(lease_start + Duration::days(365));

        let outcome = self
            .db_client
            .settle_successful_payment(SettlementInput {
                order_id: order_id.to_string(),
                gateway_payment_id: gateway_payment_id.to_string(),
                property_id,
                customer_id,
                amount,
                commission_rate_bp: self.commission_rate_bp,
                lease_start,
                lease_end,
                raw_response,
            })
            .await?;

        if let SettlementOutcome::Settled { booking, payment, .. } = &outcome {
            tracing::info!(
                "Settled order {}: booking {}, payment {}, property {} rented",
                order_id,
                booking.id,
                payment.id,
                property_id
            );
            self.send_settlement_emails(booking.customer_id, booking.owner_id, payment.amount, payment.owner_payout, order_id)
                .await;
        }

        Ok(outcome)
    }

    // Receipts are best-effort; a mail failure never unwinds a settlement.
    async fn send_settlement_emails(
        &self,
        customer_id: Uuid,
        owner_id: Uuid,
        amount: i64,
        owner_payout: i64,
        reference: &str,
    ) {
        match self.db_client.get_user(Some(customer_id), None).await {
            Ok(Some(customer)) => {
                if let Err(e) =
                    send_payment_receipt_email(&customer.email, &customer.name, amount, reference)
                        .await
                {
                    tracing::error!("Failed to send receipt email: {}", e);
                }
            }
            other => tracing::warn!("Could not load customer {} for receipt: {:?}", customer_id, other.err()),
        }

        match self.db_client.get_user(Some(owner_id), None).await {
            Ok(Some(owner)) => {
                if let Err(e) =
                    send_owner_payout_email(&owner.email, &owner.name, owner_payout, reference).await
                {
                    tracing::error!("Failed to send payout email: {}", e);
                }
            }
            other => tracing::warn!("Could not load owner {} for payout mail: {:?}", owner_id, other.err()),
        }
    }

    /// Property/customer references come from the custom fields; when the
    /// redirect dropped them, fall back to the checkout-time booking row.
    async fn resolve_parties(
        &self,
        order_id: &str,
        custom_1: Option<&str>,
        custom_2: Option<&str>,
    ) -> Result<(Uuid, Uuid), String> {
        if let (Some(property_id), Some(customer_id)) =
            (parse_uuid(custom_1), parse_uuid(custom_2))
        {
            return Ok((property_id, customer_id));
        }

        let booking = self
            .db_client
            .get_booking_by_reference(order_id)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("no booking found for order {}", order_id))?;

        Ok((booking.property_id, booking.customer_id))
    }
}

fn parse_uuid(value: Option<&str>) -> Option<Uuid> {
    value.and_then(|v| Uuid::parse_str(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(Some("2")), StatusClass::Success);
        assert_eq!(classify_status(Some("0")), StatusClass::Cancelled);
        assert_eq!(classify_status(Some("-1")), StatusClass::Failed);
        assert_eq!(classify_status(Some("-2")), StatusClass::Failed);
        assert_eq!(classify_status(Some("garbage")), StatusClass::Failed);
        assert_eq!(classify_status(None), StatusClass::Interrupted);
    }

    #[test]
    fn test_parse_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(Some(&id.to_string())), Some(id));
        assert_eq!(parse_uuid(Some("not-a-uuid")), None);
        assert_eq!(parse_uuid(None), None);
    }
}
