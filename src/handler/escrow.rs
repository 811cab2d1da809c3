use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{gigdtos::*, ApiResponse},
    error::HttpError,
    handler::json_body,
    middleware::AuthSession,
    AppState,
};

pub fn escrow_handler() -> Router {
    Router::new()
        .route("/", post(create_escrow))
        .route("/mine", get(my_escrows))
        .route("/:id/release", put(release_escrow))
}

pub async fn create_escrow(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    payload: Result<Json<CreateEscrowDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(payload)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let escrow = app_state
        .escrow_service
        .create_escrow(session.profile.id, body)
        .await?;

    Ok(Json(ApiResponse::success("Escrow created successfully", escrow)))
}

pub async fn my_escrows(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<impl IntoResponse, HttpError> {
    let escrows = app_state
        .escrow_service
        .list_my_escrows(session.profile.id)
        .await?;

    Ok(Json(ApiResponse::success(
        "Escrows retrieved successfully",
        EscrowListResponseDto {
            results: escrows.len(),
            escrows,
        },
    )))
}

pub async fn release_escrow(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
    Path(escrow_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let escrow = app_state
        .escrow_service
        .release_escrow(escrow_id, session.profile.id)
        .await?;

    Ok(Json(ApiResponse::success("Escrow released", escrow)))
}
