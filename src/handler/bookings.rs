use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    db::bookingdb::BookingExt,
    dtos::{bookingdtos::BookingResponseDto, ApiResponse},
    error::HttpError,
    middleware::JWTAuthMiddeware,
    models::{bookingmodel::BookingStatus, usermodel::UserRole},
    AppState,
};

pub fn booking_handler() -> Router {
    Router::new()
        .route("/", get(list_bookings))
        .route("/:booking_id", get(get_booking))
        .route("/:booking_id/cancel", put(cancel_booking))
}

/// Customers see their bookings; owners see bookings on their properties.
pub async fn list_bookings(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let bookings = match auth.user.role {
        UserRole::Owner => app_state
            .db_client
            .get_bookings_by_owner(auth.user.id)
            .await,
        _ => app_state
            .db_client
            .get_bookings_by_customer(auth.user.id)
            .await,
    }
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let response: Vec<BookingResponseDto> = bookings.into_iter().map(|b| b.into()).collect();
    Ok(Json(ApiResponse::data(response)))
}

pub async fn get_booking(
    Path(booking_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let booking = app_state
        .db_client
        .get_booking_by_id(booking_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Booking not found"))?;

    let allowed = booking.customer_id == auth.user.id
        || booking.owner_id == auth.user.id
        || auth.user.role == UserRole::Admin;
    if !allowed {
        return Err(HttpError::unauthorized("Not authorized to view this booking"));
    }

    let response: BookingResponseDto = booking.into();
    Ok(Json(ApiResponse::data(response)))
}

pub async fn cancel_booking(
    Path(booking_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let booking = app_state
        .db_client
        .get_booking_by_id(booking_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Booking not found"))?;

    if booking.customer_id != auth.user.id {
        return Err(HttpError::unauthorized("Not authorized to cancel this booking"));
    }

    let closed = app_state
        .db_client
        .close_pending_booking(&booking.reference, BookingStatus::Cancelled)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    if !closed {
        return Err(HttpError::bad_request(
            "Only pending bookings can be cancelled",
        ));
    }

    Ok(Json(ApiResponse::<()>::message("Booking cancelled")))
}
