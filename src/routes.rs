use std::sync::Arc;

use axum::{middleware, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{
        auth::auth_handler,
        bookings::booking_handler,
        dashboard::dashboard_handler,
        payments::{payment_handler, public_payment_handler},
        properties::{property_handler, public_property_handler},
        users::users_handler,
        visits::visit_handler,
        wishlist::wishlist_handler,
    },
    middleware::auth,
    AppState,
};

// Health check handler
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let property_routes = Router::new()
        .merge(property_handler().layer(middleware::from_fn(auth)))
        .merge(public_property_handler());

    // The gateway return/notify endpoints carry no session; the signature
    // is their credential.
    let payment_routes = Router::new()
        .merge(payment_handler().layer(middleware::from_fn(auth)))
        .merge(public_payment_handler());

    let api_route = Router::new()
        .nest("/auth", auth_handler())
        .nest("/users", users_handler().layer(middleware::from_fn(auth)))
        .nest("/properties", property_routes)
        .nest("/bookings", booking_handler().layer(middleware::from_fn(auth)))
        .nest("/visits", visit_handler().layer(middleware::from_fn(auth)))
        .nest("/wishlist", wishlist_handler().layer(middleware::from_fn(auth)))
        .nest("/payments", payment_routes)
        .nest("/dashboard", dashboard_handler().layer(middleware::from_fn(auth)))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}
