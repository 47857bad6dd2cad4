use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::service::gateway::GatewayCheckout;

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequestDto {
    pub property_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutResponseDto {
    pub reference: String,
    pub checkout: GatewayCheckout,
}

/// Query string of the gateway's browser redirect back to us.
/// Everything is optional: an interrupted flow arrives with most fields
/// missing and must not mutate state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayReturnQuery {
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub payhere_amount: Option<String>,
    pub payhere_currency: Option<String>,
    pub status_code: Option<String>,
    pub md5sig: Option<String>,
    pub custom_1: Option<String>,
    pub custom_2: Option<String>,
}

/// Form body of the gateway's asynchronous server-to-server notification.
/// Delivered at least once; handlers must be idempotent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayNotification {
    pub merchant_id: String,
    pub order_id: String,
    pub payment_id: String,
    pub payhere_amount: String,
    pub payhere_currency: String,
    pub status_code: String,
    pub md5sig: String,
    // Explicit notification kind echoed from checkout metadata
    pub intent: Option<String>,
    pub custom_1: Option<String>,
    pub custom_2: Option<String>,
    pub status_message: Option<String>,
    // Present on tokenization events only
    pub payment_token: Option<String>,
    pub card_holder_name: Option<String>,
    pub card_no: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentHistoryItemDto {
    pub id: Uuid,
    pub property_title: String,
    pub amount: i64,
    pub commission_amount: i64,
    pub owner_payout: i64,
    pub payment_type: String,
    pub status: String,
    pub gateway_order_id: String,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
