use std::sync::Arc;

use axum::{response::IntoResponse, routing::get, Extension, Json, Router};

use crate::{dtos::ApiResponse, error::HttpError, middleware::AuthSession, AppState};

pub fn wallet_handler() -> Router {
    Router::new().route("/balance", get(get_balance))
}

pub async fn get_balance(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(session): Extension<AuthSession>,
) -> Result<impl IntoResponse, HttpError> {
    let address = session
        .profile
        .address
        .as_deref()
        .ok_or_else(|| HttpError::bad_request("No wallet is linked to this profile"))?;

    let balance = app_state.wallet_service.balance(address).await?;

    Ok(Json(ApiResponse::success("Balance retrieved successfully", balance)))
}
