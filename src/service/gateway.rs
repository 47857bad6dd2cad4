use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use thiserror::Error;
use uuid::Uuid;

use crate::{config::Config, models::paymentmodel::cents_to_rupees};

/// What a checkout (and the notification it later produces) is for.
/// Carried as an explicit `intent` form field instead of being parsed
/// out of an order-id prefix.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutIntent {
    RentCheckout,
    TokenizeCard,
    RecurringCharge,
}

impl CheckoutIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutIntent::RentCheckout => "rent_checkout",
            CheckoutIntent::TokenizeCard => "tokenize_card",
            CheckoutIntent::RecurringCharge => "recurring_charge",
        }
    }

    pub fn from_str(value: &str) -> Option<CheckoutIntent> {
        match value {
            "rent_checkout" => Some(CheckoutIntent::RentCheckout),
            "tokenize_card" => Some(CheckoutIntent::TokenizeCard),
            "recurring_charge" => Some(CheckoutIntent::RecurringCharge),
            _ => None,
        }
    }
}

/// Hosted-checkout payload: the browser submits `fields` as a form POST
/// to `action_url`.
#[derive(Debug, Serialize, Deserialize)]
pub struct GatewayCheckout {
    pub action_url: String,
    pub fields: Vec<(String, String)>,
}

/// Customer details the gateway requires on every checkout.
#[derive(Debug, Clone)]
pub struct CheckoutCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChargeRequest {
    pub order_id: String,
    pub token: String,
    pub amount: i64,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChargeOutcome {
    pub gateway_payment_id: String,
    pub status_code: String,
    pub raw: serde_json::Value,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("charge declined: {0}")]
    Declined(String),

    #[error("unexpected gateway response: {0}")]
    InvalidResponse(String),
}

/// Server-to-server charge of a stored card token. Behind a trait so the
/// recurring billing loop can run against a mock.
#[async_trait]
pub trait TokenCharger: Send + Sync {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, GatewayError>;
}

pub struct PaymentGateway {
    merchant_id: String,
    merchant_secret: String,
    app_token: String,
    checkout_url: String,
    preapprove_url: String,
    charge_url: String,
    currency: String,
    return_url: String,
    cancel_url: String,
    notify_url: String,
}

impl PaymentGateway {
    pub fn new(config: &Config) -> Self {
        Self {
            merchant_id: config.gateway_merchant_id.clone(),
            merchant_secret: config.gateway_merchant_secret.clone(),
            app_token: config.gateway_app_token.clone(),
            checkout_url: config.gateway_checkout_url.clone(),
            preapprove_url: config.gateway_preapprove_url.clone(),
            charge_url: config.gateway_charge_url.clone(),
            currency: config.currency.clone(),
            return_url: format!("{}/api/payments/return", config.app_url),
            cancel_url: format!("{}/payment/cancelled", config.app_url),
            notify_url: format!("{}/api/payments/notify", config.app_url),
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Outbound signature:
    /// UPPER(MD5(merchant_id + order_id + amount + currency + UPPER(MD5(secret))))
    pub fn checkout_hash(&self, order_id: &str, amount_cents: i64) -> String {
        let payload = format!(
            "{}{}{}{}{}",
            self.merchant_id,
            order_id,
            format_amount(amount_cents),
            self.currency,
            md5_upper(&self.merchant_secret),
        );
        md5_upper(&payload)
    }

    /// Inbound signature check. The status code is part of the signed
    /// payload, so a tampered outcome fails verification.
    pub fn verify_notification(
        &self,
        order_id: &str,
        amount: &str,
        currency: &str,
        status_code: &str,
        md5sig: &str,
    ) -> bool {
        let payload = format!(
            "{}{}{}{}{}{}",
            self.merchant_id,
            order_id,
            amount,
            currency,
            status_code,
            md5_upper(&self.merchant_secret),
        );
        let expected = md5_upper(&payload);

        // Constant-time compare to prevent timing attacks
        ConstantTimeEq::ct_eq(md5sig.as_bytes(), expected.as_bytes()).into()
    }

    /// One-time rent + deposit checkout.
    pub fn build_checkout(
        &self,
        order_id: &str,
        items: &str,
        amount_cents: i64,
        property_id: Uuid,
        customer_id: Uuid,
        customer: &CheckoutCustomer,
    ) -> GatewayCheckout {
        let mut fields = self.base_fields(order_id, items, amount_cents, property_id, customer_id, customer);
        fields.push(("intent".to_string(), CheckoutIntent::RentCheckout.as_str().to_string()));

        GatewayCheckout {
            action_url: self.checkout_url.clone(),
            fields,
        }
    }

    /// Card tokenization (preapproval) for unattended monthly charges.
    pub fn build_tokenization(
        &self,
        order_id: &str,
        items: &str,
        monthly_amount_cents: i64,
        property_id: Uuid,
        customer_id: Uuid,
        customer: &CheckoutCustomer,
    ) -> GatewayCheckout {
        let mut fields =
            self.base_fields(order_id, items, monthly_amount_cents, property_id, customer_id, customer);
        fields.push(("intent".to_string(), CheckoutIntent::TokenizeCard.as_str().to_string()));
        fields.push(("recurrence".to_string(), "1 Month".to_string()));
        fields.push(("duration".to_string(), "Forever".to_string()));

        GatewayCheckout {
            action_url: self.preapprove_url.clone(),
            fields,
        }
    }

    fn base_fields(
        &self,
        order_id: &str,
        items: &str,
        amount_cents: i64,
        property_id: Uuid,
        customer_id: Uuid,
        customer: &CheckoutCustomer,
    ) -> Vec<(String, String)> {
        vec![
            ("merchant_id".to_string(), self.merchant_id.clone()),
            ("return_url".to_string(), self.return_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
            ("notify_url".to_string(), self.notify_url.clone()),
            ("order_id".to_string(), order_id.to_string()),
            ("items".to_string(), items.to_string()),
            ("currency".to_string(), self.currency.clone()),
            ("amount".to_string(), format_amount(amount_cents)),
            ("hash".to_string(), self.checkout_hash(order_id, amount_cents)),
            ("first_name".to_string(), customer.first_name.clone()),
            ("last_name".to_string(), customer.last_name.clone()),
            ("email".to_string(), customer.email.clone()),
            ("phone".to_string(), customer.phone.clone()),
            ("address".to_string(), customer.address.clone()),
            ("city".to_string(), customer.city.clone()),
            ("custom_1".to_string(), property_id.to_string()),
            ("custom_2".to_string(), customer_id.to_string()),
        ]
    }

    async fn charge_stored_token(
        &self,
        request: &ChargeRequest,
    ) -> Result<ChargeOutcome, GatewayError> {
        let client = reqwest::Client::new();
        let payload = serde_json::json!({
            "type": "PAYMENT",
            "order_id": request.order_id,
            "items": request.description,
            "currency": self.currency,
            "amount": cents_to_rupees(request.amount),
            "customer_token": request.token,
        });

        let response = client
            .post(&self.charge_url)
            .header("Authorization", format!("Bearer {}", self.app_token))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let response_body: serde_json::Value = response.json().await?;

        let data = &response_body["data"];
        let status_code = data["status_code"]
            .as_i64()
            .map(|code| code.to_string())
            .or_else(|| data["status_code"].as_str().map(|code| code.to_string()))
            .ok_or_else(|| {
                GatewayError::InvalidResponse(response_body["msg"].as_str().unwrap_or("missing status_code").to_string())
            })?;

        let gateway_payment_id = data["payment_no"]
            .as_str()
            .map(|id| id.to_string())
            .or_else(|| data["payment_no"].as_i64().map(|id| id.to_string()))
            .ok_or_else(|| GatewayError::InvalidResponse("missing payment_no".to_string()))?;

        if status_code != "2" {
            return Err(GatewayError::Declined(
                data["status_message"].as_str().unwrap_or("charge was not accepted").to_string(),
            ));
        }

        Ok(ChargeOutcome {
            gateway_payment_id,
            status_code,
            raw: response_body,
        })
    }
}

#[async_trait]
impl TokenCharger for PaymentGateway {
    async fn charge(&self, request: &ChargeRequest) -> Result<ChargeOutcome, GatewayError> {
        self.charge_stored_token(request).await
    }
}

/// Amounts on the wire carry exactly two decimals.
pub fn format_amount(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// Parse a gateway amount string ("15000.00") back to cents.
pub fn parse_amount_cents(amount: &str) -> Option<i64> {
    let mut parts = amount.splitn(2, '.');
    let whole = parts.next()?.parse::<i64>().ok()?;
    if whole < 0 {
        return None;
    }

    let cents = match parts.next() {
        None | Some("") => 0,
        Some(frac) => {
            if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let frac = format!("{:0<2}", frac);
            frac.parse::<i64>().ok()?
        }
    };

    Some(whole * 100 + cents)
}

fn md5_upper(value: &str) -> String {
    let digest = md5::compute(value.as_bytes());
    hex::encode(digest.0).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_gateway() -> PaymentGateway {
        PaymentGateway {
            merchant_id: "1211149".to_string(),
            merchant_secret: "test-merchant-secret".to_string(),
            app_token: "app-token".to_string(),
            checkout_url: "https://sandbox.payhere.lk/pay/checkout".to_string(),
            preapprove_url: "https://sandbox.payhere.lk/pay/preapprove".to_string(),
            charge_url: "https://sandbox.payhere.lk/merchant/v1/payment/charge".to_string(),
            currency: "LKR".to_string(),
            return_url: "https://rentnest.test/api/payments/return".to_string(),
            cancel_url: "https://rentnest.test/payment/cancelled".to_string(),
            notify_url: "https://rentnest.test/api/payments/notify".to_string(),
        }
    }

    // Built from the documented formula, independent of verify_notification
    fn sign_notification(order_id: &str, amount: &str, status: &str) -> String {
        md5_upper(&format!(
            "1211149{}{}LKR{}{}",
            order_id,
            amount,
            status,
            md5_upper("test-merchant-secret"),
        ))
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1500000), "15000.00");
        assert_eq!(format_amount(50), "0.50");
        assert_eq!(format_amount(12345), "123.45");
    }

    #[test]
    fn test_parse_amount_cents() {
        assert_eq!(parse_amount_cents("15000.00"), Some(1500000));
        assert_eq!(parse_amount_cents("123.45"), Some(12345));
        assert_eq!(parse_amount_cents("123.5"), Some(12350));
        assert_eq!(parse_amount_cents("123"), Some(12300));
        assert_eq!(parse_amount_cents("-10.00"), None);
        assert_eq!(parse_amount_cents("abc"), None);
        assert_eq!(parse_amount_cents("1.234"), None);
    }

    #[test]
    fn test_amount_round_trip() {
        for cents in [0, 1, 99, 100, 12345, 1500000] {
            assert_eq!(parse_amount_cents(&format_amount(cents)), Some(cents));
        }
    }

    #[test]
    fn test_checkout_hash_follows_gateway_convention() {
        let gateway = test_gateway();
        let hash = gateway.checkout_hash("RNT_ABC123", 1500000);

        let expected = md5_upper(&format!(
            "1211149RNT_ABC12315000.00LKR{}",
            md5_upper("test-merchant-secret"),
        ));
        assert_eq!(hash, expected);
        // MD5 hex, uppercase
        assert_eq!(hash.len(), 32);
        assert!(hash.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_verify_notification_accepts_valid_signature() {
        let gateway = test_gateway();
        let sig = sign_notification("RNT_ABC123", "15000.00", "2");

        assert!(gateway.verify_notification("RNT_ABC123", "15000.00", "LKR", "2", &sig));
    }

    #[test]
    fn test_verify_notification_rejects_tampering() {
        let gateway = test_gateway();
        let sig = sign_notification("RNT_ABC123", "15000.00", "2");

        // tampered amount
        assert!(!gateway.verify_notification("RNT_ABC123", "1.00", "LKR", "2", &sig));
        // tampered status
        assert!(!gateway.verify_notification("RNT_ABC123", "15000.00", "LKR", "-1", &sig));
        // different order
        assert!(!gateway.verify_notification("RNT_OTHER", "15000.00", "LKR", "2", &sig));
        // garbage signature
        assert!(!gateway.verify_notification("RNT_ABC123", "15000.00", "LKR", "2", "DEADBEEF"));
    }

    #[test]
    fn test_build_checkout_fields() {
        let gateway = test_gateway();
        let property_id = Uuid::new_v4();
        let customer_id = Uuid::new_v4();
        let customer = CheckoutCustomer {
            first_name: "Nimal".to_string(),
            last_name: "Perera".to_string(),
            email: "nimal@example.com".to_string(),
            phone: "+94771234567".to_string(),
            address: "12 Galle Road".to_string(),
            city: "Colombo".to_string(),
        };

        let checkout = gateway.build_checkout(
            "RNT_ABC123",
            "Rent + deposit: 2BR Apartment",
            1500000,
            property_id,
            customer_id,
            &customer,
        );

        assert_eq!(checkout.action_url, "https://sandbox.payhere.lk/pay/checkout");

        let field = |name: &str| {
            checkout
                .fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };

        assert_eq!(field("amount").unwrap(), "15000.00");
        assert_eq!(field("currency").unwrap(), "LKR");
        assert_eq!(field("custom_1").unwrap(), property_id.to_string());
        assert_eq!(field("custom_2").unwrap(), customer_id.to_string());
        assert_eq!(field("intent").unwrap(), "rent_checkout");
        assert_eq!(
            field("hash").unwrap(),
            gateway.checkout_hash("RNT_ABC123", 1500000)
        );
        assert_eq!(
            field("notify_url").unwrap(),
            "https://rentnest.test/api/payments/notify"
        );
    }

    #[test]
    fn test_build_tokenization_adds_recurrence_fields() {
        let gateway = test_gateway();
        let customer = CheckoutCustomer {
            first_name: "Nimal".to_string(),
            last_name: "Perera".to_string(),
            email: "nimal@example.com".to_string(),
            phone: "+94771234567".to_string(),
            address: "12 Galle Road".to_string(),
            city: "Colombo".to_string(),
        };

        let checkout = gateway.build_tokenization(
            "RNT_TOK001",
            "Monthly rent authorization",
            80000,
            Uuid::new_v4(),
            Uuid::new_v4(),
            &customer,
        );

        assert_eq!(checkout.action_url, "https://sandbox.payhere.lk/pay/preapprove");

        let names: Vec<&str> = checkout.fields.iter().map(|(key, _)| key.as_str()).collect();
        assert!(names.contains(&"recurrence"));
        assert!(names.contains(&"duration"));

        let intent = checkout
            .fields
            .iter()
            .find(|(key, _)| key == "intent")
            .map(|(_, value)| value.as_str());
        assert_eq!(intent, Some("tokenize_card"));
    }

    #[test]
    fn test_checkout_fields_survive_form_encoding() {
        let gateway = test_gateway();
        let customer = CheckoutCustomer {
            first_name: "Nimal".to_string(),
            last_name: "Perera".to_string(),
            email: "nimal@example.com".to_string(),
            phone: "+94771234567".to_string(),
            address: "12 Galle Road".to_string(),
            city: "Colombo".to_string(),
        };

        let checkout = gateway.build_checkout(
            "RNT_ABC123",
            "Rent + deposit",
            1500000,
            Uuid::new_v4(),
            Uuid::new_v4(),
            &customer,
        );

        // The browser submits these fields form-encoded; the signed values
        // must survive the encode/decode boundary unchanged.
        let encoded = serde_urlencoded::to_string(&checkout.fields).unwrap();
        let decoded: Vec<(String, String)> = serde_urlencoded::from_str(&encoded).unwrap();
        assert_eq!(decoded, checkout.fields);
    }

    #[test]
    fn test_intent_round_trip() {
        for intent in [
            CheckoutIntent::RentCheckout,
            CheckoutIntent::TokenizeCard,
            CheckoutIntent::RecurringCharge,
        ] {
            assert_eq!(CheckoutIntent::from_str(intent.as_str()), Some(intent));
        }
        assert_eq!(CheckoutIntent::from_str("TOKEN_123"), None);
    }
}
