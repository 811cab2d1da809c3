use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{models::profilemodel::Profile, utils::wallet::validate_ethereum_address};

fn validate_address(address: &str) -> Result<(), ValidationError> {
    validate_ethereum_address(address).map_err(|_| {
        let mut err = ValidationError::new("invalid_address");
        err.message = Some("Invalid Ethereum address".into());
        err
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NonceQueryDto {
    #[validate(custom = "validate_address")]
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NonceResponseDto {
    pub address: String,
    pub nonce: String,
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WalletLoginDto {
    #[validate(custom = "validate_address")]
    pub address: String,

    #[validate(length(min = 130, max = 132, message = "Signature must be 65 hex-encoded bytes"))]
    pub signature: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WalletLoginResponseDto {
    pub status: String,
    pub token: String,
    pub profile: Profile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceDto {
    pub address: String,
    pub wei: String,
    pub eth: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningStatusDto {
    pub active: bool,
    pub started_at: Option<DateTime<Utc>>,
    /// 0 to 100.
    pub progress: u8,
    pub complete: bool,
    pub estimated_eth: f64,
    pub reward_credits: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiningClaimDto {
    pub credits_awarded: i32,
    pub credits: i32,
    pub estimated_eth: f64,
}
