use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::propertydb::{PropertyExt, PropertySearchFilters},
    dtos::{
        propertydtos::{
            CreatePropertyDto, PropertyFilterDto, PropertyStatusUpdateDto, UpdatePropertyDto,
        },
        ApiResponse,
    },
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::{propertymodel::PropertyStatus, usermodel::UserRole},
    AppState,
};

/// Routes that require a logged-in user; auth is layered on in routes.rs.
pub fn property_handler() -> Router {
    Router::new()
        .route(
            "/create",
            post(create_property).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Owner])
            })),
        )
        .route(
            "/my-properties",
            get(get_my_properties).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Owner])
            })),
        )
        .route(
            "/:property_id",
            put(update_property).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Owner])
            })),
        )
        .route(
            "/pending",
            get(get_pending_properties).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Admin])
            })),
        )
        .route(
            "/:property_id/status",
            put(review_property).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Admin])
            })),
        )
}

/// Public browse/search surface.
pub fn public_property_handler() -> Router {
    Router::new()
        .route("/search", get(search_properties))
        .route("/:property_id", get(get_property_by_id))
}

pub async fn create_property(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreatePropertyDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let property = app_state
        .db_client
        .create_property(auth.user.id, body)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        "Property submitted for review",
        property,
    )))
}

pub async fn get_my_properties(
    Query(params): Query<PropertyFilterDto>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    params
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = params.page.unwrap_or(1) as u32;
    let limit = params.limit.unwrap_or(20);

    let properties = app_state
        .db_client
        .get_properties_by_owner(auth.user.id, page, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::data(properties)))
}

pub async fn update_property(
    Path(property_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<UpdatePropertyDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let property = app_state
        .db_client
        .update_property(property_id, auth.user.id, body)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Property not found"))?;

    Ok(Json(ApiResponse::success(
        "Property updated successfully",
        property,
    )))
}

pub async fn get_pending_properties(
    Query(params): Query<PropertyFilterDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let page = params.page.unwrap_or(1) as u32;
    let limit = params.limit.unwrap_or(20);

    let properties = app_state
        .db_client
        .get_pending_properties(page, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::data(properties)))
}

pub async fn review_property(
    Path(property_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Json(body): Json<PropertyStatusUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    // Admins only approve or reject; 'rented' is reserved for settlement.
    if body.status != PropertyStatus::Approved && body.status != PropertyStatus::Rejected {
        return Err(HttpError::bad_request(
            "Status must be 'approved' or 'rejected'",
        ));
    }

    let existing = app_state
        .db_client
        .get_property_by_id(property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Property not found"))?;

    if existing.status != PropertyStatus::Pending {
        return Err(HttpError::bad_request(
            "Only pending properties can be reviewed",
        ));
    }

    let property = app_state
        .db_client
        .update_property_status(property_id, body.status)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success(
        "Property review recorded",
        property,
    )))
}

pub async fn search_properties(
    Query(params): Query<PropertyFilterDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    params
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let page = params.page.unwrap_or(1) as u32;
    let limit = params.limit.unwrap_or(20);

    let filters = PropertySearchFilters {
        city: params.city.map(|c| format!("%{}%", c)),
        property_type: params.property_type,
        min_rent: params.min_rent,
        max_rent: params.max_rent,
        bedrooms: params.bedrooms,
    };

    let properties = app_state
        .db_client
        .search_approved_properties(filters, page, limit)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::data(properties)))
}

pub async fn get_property_by_id(
    Path(property_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let property = app_state
        .db_client
        .get_property_by_id(property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Property not found"))?;

    Ok(Json(ApiResponse::data(property)))
}
