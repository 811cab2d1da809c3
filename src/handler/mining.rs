use std::sync::Arc;

use axum::{
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::{dtos::ApiResponse, error::HttpError, middleware::AuthSession, AppState};

pub fn mining_handler() -> Router {
    Router::new()
        .route("/start", post(start_mining))
        .route("/status", get(mining_status))
        .route("/stop", post(stop_mining))
        .route("/claim", post(claim_reward))
}

pub async fn start_mining(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<impl IntoResponse, HttpError> {
    let status = app_state.mining_service.start(session.profile.id).await?;

    Ok(Json(ApiResponse::success("Mining started", status)))
}

pub async fn mining_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<impl IntoResponse, HttpError> {
    let status = app_state.mining_service.status(session.profile.id).await;

    Ok(Json(ApiResponse::success("Mining status", status)))
}

pub async fn stop_mining(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<impl IntoResponse, HttpError> {
    let status = app_state.mining_service.stop(session.profile.id).await?;

    Ok(Json(ApiResponse::success("Mining stopped", status)))
}

pub async fn claim_reward(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<impl IntoResponse, HttpError> {
    let claimed = app_state.mining_service.claim(session.profile.id).await?;

    Ok(Json(ApiResponse::success("Mining reward claimed", claimed)))
}
