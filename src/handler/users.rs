use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{profiledtos::*, ApiResponse},
    error::HttpError,
    handler::{json_body, UPLOAD_BODY_LIMIT},
    middleware::AuthSession,
    models::profilemodel::{MediaKind, Profile},
    AppState,
};

pub fn users_handler() -> Router {
    Router::new()
        .route("/me", get(get_me).put(update_me))
        .route("/me/dashboard", get(get_dashboard))
        .route(
            "/me/avatar",
            post(upload_avatar).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route(
            "/me/resume",
            post(upload_resume).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/:id", get(get_profile))
}

pub async fn get_me(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = app_state
        .profile_service
        .get_profile(session.profile.id)
        .await?;

    Ok(Json(ApiResponse::success("Profile retrieved successfully", profile)))
}

pub async fn get_profile(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let profile = app_state.profile_service.get_profile(profile_id).await?;

    Ok(Json(ApiResponse::success("Profile retrieved successfully", profile)))
}

pub async fn update_me(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    payload: Result<Json<UpdateProfileDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(payload)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let profile = app_state
        .profile_service
        .update_profile(session.profile.id, body)
        .await?;

    Ok(Json(ApiResponse::success("Profile updated successfully", profile)))
}

pub async fn get_dashboard(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<impl IntoResponse, HttpError> {
    let dashboard = app_state
        .profile_service
        .dashboard(session.profile.id)
        .await?;

    Ok(Json(ApiResponse::success("Dashboard retrieved successfully", dashboard)))
}

pub async fn upload_avatar(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    payload: Result<Json<UploadFileDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    upload_media(app_state, session, MediaKind::Avatar, payload).await
}

pub async fn upload_resume(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    payload: Result<Json<UploadFileDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    upload_media(app_state, session, MediaKind::Resume, payload).await
}

async fn upload_media(
    app_state: Arc<AppState>,
    session: AuthSession,
    kind: MediaKind,
    payload: Result<Json<UploadFileDto>, JsonRejection>,
) -> Result<Json<ApiResponse<Profile>>, HttpError> {
    let body = json_body(payload)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let url = app_state
        .storage_service
        .store_media(session.profile.id, kind, &body.data)
        .await?;

    let profile = app_state
        .profile_service
        .set_media(session.profile.id, kind, &url)
        .await?;

    Ok(Json(ApiResponse::success("File uploaded successfully", profile)))
}
