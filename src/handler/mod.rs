pub mod applications;
pub mod auth;
pub mod escrow;
pub mod gigs;
pub mod mining;
pub mod users;
pub mod wallet;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    Json,
};

use crate::error::HttpError;

/// Raised body limit for the base64 upload routes.
pub const UPLOAD_BODY_LIMIT: usize = 8 * 1024 * 1024;

/// Unwraps a JSON body, reporting malformed input as 400 like other
/// validation failures.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, HttpError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| HttpError::bad_request(rejection.body_text()))
}

/// Same as `json_body` for query strings.
pub fn query_params<T>(params: Result<Query<T>, QueryRejection>) -> Result<T, HttpError> {
    params
        .map(|Query(params)| params)
        .map_err(|rejection| HttpError::bad_request(rejection.body_text()))
}
