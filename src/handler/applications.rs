use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    dtos::ApiResponse,
    error::HttpError,
    middleware::AuthSession,
    AppState,
};

pub fn applications_handler() -> Router {
    Router::new()
        .route("/mine", get(my_applications))
        .route("/:id/reject", put(reject_application))
}

pub async fn my_applications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<impl IntoResponse, HttpError> {
    let applications = app_state
        .application_service
        .my_applications(session.profile.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Applications retrieved successfully",
        applications,
    )))
}

pub async fn reject_application(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let application = app_state
        .application_service
        .reject(application_id, session.profile.id)
        .await?;

    Ok(Json(ApiResponse::success("Application rejected", application)))
}
