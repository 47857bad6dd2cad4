#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub app_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    // Payment gateway configuration
    pub gateway_merchant_id: String,
    pub gateway_merchant_secret: String,
    pub gateway_app_token: String,
    pub gateway_checkout_url: String,
    pub gateway_preapprove_url: String,
    pub gateway_charge_url: String,
    pub currency: String,
    // Platform cut of every payment, in basis points
    pub commission_rate_bp: i64,
    pub operator_email: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");
        let app_url = std::env::var("APP_URL").expect("APP_URL must be set");

        let gateway_merchant_id = std::env::var("GATEWAY_MERCHANT_ID")
            .expect("GATEWAY_MERCHANT_ID must be set");
        let gateway_merchant_secret = std::env::var("GATEWAY_MERCHANT_SECRET")
            .expect("GATEWAY_MERCHANT_SECRET must be set");
        let gateway_app_token = std::env::var("GATEWAY_APP_TOKEN")
            .unwrap_or_else(|_| "".to_string());
        let gateway_checkout_url = std::env::var("GATEWAY_CHECKOUT_URL")
            .unwrap_or_else(|_| "https://sandbox.payhere.lk/pay/checkout".to_string());
        let gateway_preapprove_url = std::env::var("GATEWAY_PREAPPROVE_URL")
            .unwrap_or_else(|_| "https://sandbox.payhere.lk/pay/preapprove".to_string());
        let gateway_charge_url = std::env::var("GATEWAY_CHARGE_URL")
            .unwrap_or_else(|_| "https://sandbox.payhere.lk/merchant/v1/payment/charge".to_string());
        let currency = std::env::var("CURRENCY").unwrap_or_else(|_| "LKR".to_string());
        let commission_rate_bp = std::env::var("COMMISSION_RATE_BP")
            .unwrap_or_else(|_| "1000".to_string());
        let operator_email = std::env::var("OPERATOR_EMAIL")
            .unwrap_or_else(|_| "ops@rentnest.app".to_string());

        Config {
            database_url,
            app_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().unwrap(),
            port: 8000,
            gateway_merchant_id,
            gateway_merchant_secret,
            gateway_app_token,
            gateway_checkout_url,
            gateway_preapprove_url,
            gateway_charge_url,
            currency,
            commission_rate_bp: commission_rate_bp.parse::<i64>().unwrap(),
            operator_email,
        }
    }
}
