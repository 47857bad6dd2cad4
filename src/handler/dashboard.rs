use std::sync::Arc;

use axum::{middleware, response::IntoResponse, routing::get, Extension, Json, Router};

use crate::{
    db::dashboarddb::DashboardExt,
    dtos::ApiResponse,
    error::HttpError,
    middleware::{role_check, JWTAuthMiddeware},
    models::usermodel::UserRole,
    AppState,
};

pub fn dashboard_handler() -> Router {
    Router::new()
        .route(
            "/admin",
            get(admin_dashboard).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Admin])
            })),
        )
        .route(
            "/owner",
            get(owner_dashboard).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Owner])
            })),
        )
        .route(
            "/customer",
            get(customer_dashboard).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Customer])
            })),
        )
}

pub async fn admin_dashboard(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let stats = app_state
        .db_client
        .admin_stats()
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::data(stats)))
}

pub async fn owner_dashboard(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let stats = app_state
        .db_client
        .owner_stats(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::data(stats)))
}

pub async fn customer_dashboard(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let stats = app_state
        .db_client
        .customer_stats(auth.user.id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::data(stats)))
}
