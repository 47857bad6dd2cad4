use std::sync::Arc;

use axum::{
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::{
    db::{propertydb::PropertyExt, wishlistdb::WishlistExt},
    dtos::{
        visitdtos::{WishlistStateDto, WishlistToggleDto},
        ApiResponse,
    },
    error::HttpError,
    middleware::JWTAuthMiddeware,
    AppState,
};

pub fn wishlist_handler() -> Router {
    Router::new()
        .route("/", get(list_wishlist))
        .route("/toggle", post(toggle_wishlist))
        .route("/count", get(wishlist_count))
}

pub async fn toggle_wishlist(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<WishlistToggleDto>,
) -> Result<impl IntoResponse, HttpError> {
    // Only real properties can be wishlisted
    let _ = app_state
        .db_client
        .get_property_by_id(body.property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Property not found"))?;

    let (in_wishlist, count) = app_state
        .db_client
        .toggle_wishlist(auth.user.id, body.property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::data(WishlistStateDto {
        in_wishlist,
        count,
    })))
}

pub async fn list_wishlist(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let properties = app_state
        .db_client
        .get_wishlist_properties(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::data(properties)))
}

pub async fn wishlist_count(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let count = app_state
        .db_client
        .wishlist_count(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::data(count)))
}
