use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    error::HttpError,
    models::gigmodel::{ApplicationStatus, GigStatus},
};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Profile {0} not found")]
    ProfileNotFound(Uuid),

    #[error("Gig {0} not found")]
    GigNotFound(Uuid),

    #[error("Application {0} not found")]
    ApplicationNotFound(Uuid),

    #[error("Escrow {0} not found")]
    EscrowNotFound(Uuid),

    #[error("User {0} is not authorized to perform this action on gig {1}")]
    UnauthorizedGigAccess(Uuid, Uuid),

    #[error("Gig {0} is {status}, not open", status = .1.to_str())]
    InvalidGigStatus(Uuid, GigStatus),

    #[error("Gig {0} has already been assigned")]
    GigAlreadyAssigned(Uuid),

    #[error("Application {0} is {status}, not pending", status = .1.to_str())]
    InvalidApplicationStatus(Uuid, ApplicationStatus),

    #[error("You have already applied to gig {0}")]
    DuplicateApplication(Uuid),

    #[error("Invalid escrow state transition: {0}")]
    InvalidEscrowTransition(String),

    #[error("Mining session error: {0}")]
    MiningSession(String),

    #[error("No mining session running for user {0}")]
    MiningSessionNotFound(Uuid),

    #[error("Authentication failed: {0}")]
    Unauthenticated(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Wallet RPC error: {0}")]
    Wallet(String),

    #[error("Wallet service unavailable: {0}")]
    WalletUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        match error {
            // Do not leak driver details to clients
            ServiceError::Database(_) | ServiceError::Storage(_) | ServiceError::Other(_) => {
                HttpError::new(
                    crate::error::ErrorMessage::ServerError.to_string(),
                    status,
                )
            }
            _ => HttpError::new(error.to_string(), status),
        }
    }
}

impl From<String> for ServiceError {
    fn from(err: String) -> Self {
        ServiceError::Other(err)
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::ProfileNotFound(_)
            | ServiceError::GigNotFound(_)
            | ServiceError::ApplicationNotFound(_)
            | ServiceError::EscrowNotFound(_)
            | ServiceError::MiningSessionNotFound(_) => StatusCode::NOT_FOUND,

            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,

            ServiceError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,

            ServiceError::UnauthorizedGigAccess(_, _) => StatusCode::FORBIDDEN,

            ServiceError::InvalidGigStatus(_, _)
            | ServiceError::GigAlreadyAssigned(_)
            | ServiceError::InvalidApplicationStatus(_, _)
            | ServiceError::DuplicateApplication(_)
            | ServiceError::InvalidEscrowTransition(_)
            | ServiceError::MiningSession(_) => StatusCode::CONFLICT,

            ServiceError::Wallet(_) => StatusCode::BAD_GATEWAY,

            ServiceError::WalletUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,

            ServiceError::Storage(_) | ServiceError::Database(_) | ServiceError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
