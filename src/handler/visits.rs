use std::sync::Arc;

use axum::{
    extract::Path,
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{propertydb::PropertyExt, userdb::UserExt, visitdb::VisitExt},
    dtos::{visitdtos::CreateVisitDto, ApiResponse},
    error::HttpError,
    mail::mails::send_visit_status_email,
    middleware::{role_check, JWTAuthMiddeware},
    models::{usermodel::UserRole, visitmodel::VisitStatus},
    AppState,
};

pub fn visit_handler() -> Router {
    Router::new()
        .route(
            "/",
            post(request_visit).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Customer])
            })),
        )
        .route("/", get(list_visits))
        .route(
            "/:visit_id/approve",
            put(approve_visit).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Owner])
            })),
        )
        .route(
            "/:visit_id/reject",
            put(reject_visit).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Owner])
            })),
        )
        .route(
            "/:visit_id/complete",
            put(complete_visit).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Owner])
            })),
        )
        .route(
            "/:visit_id/cancel",
            put(cancel_visit).layer(middleware::from_fn(|req, next| {
                role_check(req, next, vec![UserRole::Customer])
            })),
        )
}

pub async fn request_visit(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
    Json(body): Json<CreateVisitDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;
    body.ensure_future(Utc::now())
        .map_err(HttpError::bad_request)?;

    let property = app_state
        .db_client
        .get_property_by_id(body.property_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Property not found"))?;

    let visit = app_state
        .db_client
        .create_visit(
            property.id,
            auth.user.id,
            property.owner_id,
            body.requested_at,
            body.note,
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Visit requested", visit)))
}

pub async fn list_visits(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let visits = match auth.user.role {
        UserRole::Owner => app_state.db_client.get_visits_by_owner(auth.user.id).await,
        _ => {
            app_state
                .db_client
                .get_visits_by_customer(auth.user.id)
                .await
        }
    }
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::data(visits)))
}

pub async fn approve_visit(
    Path(visit_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    decide_visit(app_state, auth, visit_id, VisitStatus::Approved).await
}

pub async fn reject_visit(
    Path(visit_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    decide_visit(app_state, auth, visit_id, VisitStatus::Rejected).await
}

pub async fn complete_visit(
    Path(visit_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let visit = load_owned_visit(&app_state, &auth, visit_id).await?;

    if visit.status != VisitStatus::Approved {
        return Err(HttpError::bad_request(
            "Only approved visits can be completed",
        ));
    }

    let visit = app_state
        .db_client
        .update_visit_status(visit_id, VisitStatus::Completed)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Visit completed", visit)))
}

pub async fn cancel_visit(
    Path(visit_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddeware>,
) -> Result<impl IntoResponse, HttpError> {
    let visit = app_state
        .db_client
        .get_visit_by_id(visit_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Visit not found"))?;

    if visit.customer_id != auth.user.id {
        return Err(HttpError::unauthorized("Not authorized to cancel this visit"));
    }

    if visit.status != VisitStatus::Pending && visit.status != VisitStatus::Approved {
        return Err(HttpError::bad_request("This visit can no longer be cancelled"));
    }

    let visit = app_state
        .db_client
        .update_visit_status(visit_id, VisitStatus::Cancelled)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    Ok(Json(ApiResponse::success("Visit cancelled", visit)))
}

async fn decide_visit(
    app_state: Arc<AppState>,
    auth: JWTAuthMiddeware,
    visit_id: Uuid,
    decision: VisitStatus,
) -> Result<Json<ApiResponse<crate::models::visitmodel::PropertyVisit>>, HttpError> {
    let visit = load_owned_visit(&app_state, &auth, visit_id).await?;

    if visit.status != VisitStatus::Pending {
        return Err(HttpError::bad_request("Only pending visits can be reviewed"));
    }

    let visit = app_state
        .db_client
        .update_visit_status(visit_id, decision)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    notify_visit_customer(&app_state, &visit).await;

    Ok(Json(ApiResponse::success("Visit updated", visit)))
}

async fn load_owned_visit(
    app_state: &Arc<AppState>,
    auth: &JWTAuthMiddeware,
    visit_id: Uuid,
) -> Result<crate::models::visitmodel::PropertyVisit, HttpError> {
    let visit = app_state
        .db_client
        .get_visit_by_id(visit_id)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?
        .ok_or_else(|| HttpError::not_found("Visit not found"))?;

    if visit.owner_id != auth.user.id {
        return Err(HttpError::unauthorized(
            "Not authorized to manage this visit",
        ));
    }

    Ok(visit)
}

async fn notify_visit_customer(
    app_state: &Arc<AppState>,
    visit: &crate::models::visitmodel::PropertyVisit,
) {
    let customer = match app_state.db_client.get_user(Some(visit.customer_id), None).await {
        Ok(Some(customer)) => customer,
        _ => return,
    };
    let property = match app_state.db_client.get_property_by_id(visit.property_id).await {
        Ok(Some(property)) => property,
        _ => return,
    };

    if let Err(e) =
        send_visit_status_email(&customer.email, &customer.name, &property.title, &visit.status)
            .await
    {
        tracing::error!("Failed to send visit status email: {}", e);
    }
}
