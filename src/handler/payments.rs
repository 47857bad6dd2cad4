use std::sync::Arc;

use axum::{
    extract::Query,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Extension, Form, Json, Router,
};
use validator::Validate;

use crate::{
    db::{bookingdb::BookingExt, paymentdb::PaymentExt, propertydb::PropertyExt},
    dtos::{
        paymentdtos::{
            CheckoutRequestDto, CheckoutResponseDto, GatewayNotification, GatewayReturnQuery,
            PaymentHistoryItemDto,
        },
        ApiResponse,
    },
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::{
        bookingmodel::generate_booking_reference,
        propertymodel::PropertyStatus,
        usermodel::{User, UserRole},
    },
    service::{gateway::CheckoutCustomer, reconciliation::ReturnDisposition},
    AppState,
};

/// Routes that require a logged-in customer; auth is layered on in routes.rs.
pub fn payment_handler() -> Router {
    Router::new()
        .route(
            "/checkout",
            post(initiate_checkout).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Customer])
            })),
        )
        .route(
            "/tokenize",
            post(initiate_tokenization).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Customer])
            })),
        )
        .route("/history", get(payment_history))
}

/// Gateway-facing endpoints; no session, the signature is the credential.
pub fn public_payment_handler() -> Router {
    Router::new()
        .route("/return", get(gateway_return))
        .route("/notify", post(gateway_notify))
}

fn checkout_customer(user: &User, city: &str) -> CheckoutCustomer {
    let mut parts = user.name.split_whitespace();
    let first_name = parts.next().unwrap_or("Customer").to_string();
    let last_name = parts.collect::<Vec<_>>().join(" ");

    CheckoutCustomer {
        first_name,
        last_name,
        email: user.email.clone(),
        phone: user.phone.clone().unwrap_or_default(),
        address: String::new(),
        city: city.to_string(),
    }
}

pub async fn initiate_checkout(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CheckoutRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let property = app_state
        .db_client
        .get_property_by_id(body.property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Property not found"))?;

    if property.status != PropertyStatus::Approved || !property.is_available {
        return Err(HttpError::bad_request(
            "Property is not available for booking",
        ));
    }

    if property.owner_id == auth.user.id {
        return Err(HttpError::bad_request("You cannot book your own property"));
    }

    let reference = generate_booking_reference();
    let booking = app_state
        .db_client
        .create_pending_booking(
            reference.clone(),
            &property,
            auth.user.id,
            app_state.env.commission_rate_bp,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    let items = format!("Rent + security deposit: {}", property.title);
    let checkout = app_state.gateway.build_checkout(
        &reference,
        &items,
        booking.total_amount,
        property.id,
        auth.user.id,
        &checkout_customer(&auth.user, &property.city),
    );

    tracing::info!(
        "Checkout initiated for property {} by customer {} (order {})",
        property.id,
        auth.user.id,
        reference
    );

    Ok(Json(ApiResponse::success(
        "Checkout created",
        CheckoutResponseDto {
            reference,
            checkout,
        },
    )))
}

pub async fn initiate_tokenization(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let agreement = app_state
        .db_client
        .get_active_agreement_by_customer(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| {
            HttpError::bad_request("No active rental agreement to set up recurring rent for")
        })?;

    let property = app_state
        .db_client
        .get_property_by_id(agreement.property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Property not found"))?;

    let reference = generate_booking_reference();
    let items = format!("Monthly rent authorization: {}", property.title);
    let checkout = app_state.gateway.build_tokenization(
        &reference,
        &items,
        agreement.monthly_rent,
        property.id,
        auth.user.id,
        &checkout_customer(&auth.user, &property.city),
    );

    Ok(Json(ApiResponse::success(
        "Card authorization created",
        CheckoutResponseDto {
            reference,
            checkout,
        },
    )))
}

/// Browser return from the hosted gateway page. Redirects to the frontend;
/// the async notification remains the source of truth.
pub async fn gateway_return(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<GatewayReturnQuery>,
) -> impl IntoResponse {
    let app_url = app_state.env.app_url.clone();

    match app_state.reconciliation.handle_return(query).await {
        Ok(ReturnDisposition::Settled { reference })
        | Ok(ReturnDisposition::AlreadyProcessed { reference }) => Redirect::to(&format!(
            "{}/payment/success?order_id={}",
            app_url, reference
        )),
        Ok(ReturnDisposition::Cancelled { reference }) => Redirect::to(&format!(
            "{}/payment/cancelled?order_id={}",
            app_url, reference
        )),
        Ok(ReturnDisposition::Failed { reference }) => Redirect::to(&format!(
            "{}/payment/failed?order_id={}",
            app_url, reference
        )),
        // Interrupted flow: nothing was charged that we know of, offer a retry.
        Ok(ReturnDisposition::Interrupted) => {
            Redirect::to(&format!("{}/payment/retry", app_url))
        }
        Err(e) => Redirect::to(&format!(
            "{}/payment/failed?error={}",
            app_url,
            urlencoding::encode(&e.message)
        )),
    }
}

/// Asynchronous server notification (IPN). Must answer 200 "OK" only after
/// the event is durably applied; the gateway retries on anything else.
pub async fn gateway_notify(
    Extension(app_state): Extension<Arc<AppState>>,
    Form(notification): Form<GatewayNotification>,
) -> impl IntoResponse {
    use crate::service::reconciliation::NotifyRejection;

    match app_state.reconciliation.handle_notification(notification).await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(NotifyRejection::InvalidSignature) => (StatusCode::UNAUTHORIZED, "signature mismatch"),
        Err(NotifyRejection::BadPayload(_)) => (StatusCode::BAD_REQUEST, "malformed notification"),
        Err(NotifyRejection::Internal(_)) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "processing failed")
        }
    }
}

pub async fn payment_history(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let rows = match auth.user.role {
        UserRole::Admin => app_state.db_client.get_all_payments().await,
        UserRole::Owner => app_state.db_client.get_payments_by_owner(auth.user.id).await,
        UserRole::Customer => {
            app_state
                .db_client
                .get_payments_by_customer(auth.user.id)
                .await
        }
    }
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let response: Vec<PaymentHistoryItemDto> = rows
        .into_iter()
        .map(|row| PaymentHistoryItemDto {
            id: row.id,
            property_title: row.property_title,
            amount: row.amount,
            commission_amount: row.commission_amount,
            owner_payout: row.owner_payout,
            payment_type: row.payment_type.to_str().to_string(),
            status: row.status.to_str().to_string(),
            gateway_order_id: row.gateway_order_id,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse::data(response)))
}
