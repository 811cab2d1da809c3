use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    http::{header, HeaderMap},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::Cookie;
use validator::Validate;

use crate::{
    dtos::{walletdtos::*, ApiResponse, Response},
    error::HttpError,
    handler::{json_body, query_params},
    utils::token,
    AppState,
};

pub fn auth_handler() -> Router {
    Router::new()
        .route("/nonce", get(get_nonce))
        .route("/wallet", post(wallet_login))
        .route("/logout", post(logout))
}

pub async fn get_nonce(
    Extension(app_state): Extension<Arc<AppState>>,
    params: Result<Query<NonceQueryDto>, QueryRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let nonce_query = query_params(params)?;
    nonce_query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let nonce = app_state
        .wallet_service
        .issue_nonce(&nonce_query.address)
        .await?;

    Ok(Json(ApiResponse::success("Sign this message with your wallet", nonce)))
}

pub async fn wallet_login(
    Extension(app_state): Extension<Arc<AppState>>,
    payload: Result<Json<WalletLoginDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let body = json_body(payload)?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let profile = app_state
        .wallet_service
        .verify_login(&body.address, &body.signature)
        .await?;

    let token = token::create_token(
        &profile.id.to_string(),
        app_state.env.jwt_secret.as_bytes(),
        app_state.env.jwt_maxage,
    )
    .map_err(|e| HttpError::server_error(e.to_string()))?;

    let cookie_duration = time::Duration::minutes(app_state.env.jwt_maxage);
    let cookie = Cookie::build(("token", token.clone()))
        .path("/")
        .max_age(cookie_duration)
        .http_only(true)
        .build();

    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        cookie
            .to_string()
            .parse()
            .map_err(|_| HttpError::server_error("Failed to build session cookie"))?,
    );

    let mut response = Json(WalletLoginResponseDto {
        status: "success".to_string(),
        token,
        profile,
    })
    .into_response();
    response.headers_mut().extend(headers);

    Ok(response)
}

pub async fn logout() -> Result<impl IntoResponse, HttpError> {
    let cookie = Cookie::build(("token", ""))
        .path("/")
        .max_age(time::Duration::minutes(-1))
        .http_only(true)
        .build();

    let mut headers = HeaderMap::new();
    headers.append(
        header::SET_COOKIE,
        cookie
            .to_string()
            .parse()
            .map_err(|_| HttpError::server_error("Failed to clear session cookie"))?,
    );

    let mut response = Json(Response {
        status: "success",
        message: "Logged out".to_string(),
    })
    .into_response();
    response.headers_mut().extend(headers);

    Ok(response)
}
