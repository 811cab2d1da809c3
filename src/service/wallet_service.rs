// service/wallet_service.rs
use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use crate::{
    dtos::walletdtos::{BalanceDto, NonceResponseDto},
    error::ErrorMessage,
    models::profilemodel::Profile,
    service::{error::ServiceError, profile_service::ProfileService},
    utils::wallet::{normalize_address, validate_ethereum_address, verify_signature},
};

pub const NONCE_TTL_MINUTES: i64 = 5;
const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

#[derive(Debug, Clone)]
struct PendingNonce {
    message: String,
    expires_at: DateTime<Utc>,
}

pub fn sign_in_message(address: &str, nonce: &str) -> String {
    format!("Sign in to Gigmine\nAddress: {}\nNonce: {}", address, nonce)
}

/// Parses a JSON-RPC hex quantity such as `0x1bc16d674ec80000`.
pub fn parse_hex_quantity(value: &str) -> Result<u128, String> {
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| format!("Quantity {} is not 0x-prefixed", value))?;
    if digits.is_empty() {
        return Err("Empty quantity".to_string());
    }
    u128::from_str_radix(digits, 16).map_err(|e| format!("Invalid quantity {}: {}", value, e))
}

/// Wei to ETH with four fractional digits, rounded half up.
pub fn format_wei_as_eth(wei: u128) -> String {
    const UNIT: u128 = WEI_PER_ETH / 10_000;
    let units = wei / UNIT + u128::from(wei % UNIT >= UNIT / 2);
    format!("{}.{:04}", units / 10_000, units % 10_000)
}

/// Wallet sign-in and on-chain balance lookups.
#[derive(Debug, Clone)]
pub struct WalletService {
    profile_service: Arc<ProfileService>,
    rpc_url: Option<String>,
    http: reqwest::Client,
    nonces: Arc<tokio::sync::RwLock<HashMap<String, PendingNonce>>>,
}

impl WalletService {
    pub fn new(profile_service: Arc<ProfileService>, rpc_url: Option<String>) -> Self {
        Self {
            profile_service,
            rpc_url,
            http: reqwest::Client::new(),
            nonces: Arc::new(tokio::sync::RwLock::new(HashMap::new())),
        }
    }

    /// Creates the message the wallet has to sign. A newer nonce replaces an
    /// older one for the same address.
    pub async fn issue_nonce(&self, address: &str) -> Result<NonceResponseDto, ServiceError> {
        validate_ethereum_address(address).map_err(ServiceError::Validation)?;
        let address = normalize_address(address);

        let nonce = hex::encode(rand::random::<[u8; 16]>());
        let message = sign_in_message(&address, &nonce);
        let expires_at = Utc::now() + Duration::minutes(NONCE_TTL_MINUTES);

        let mut nonces = self.nonces.write().await;
        nonces.retain(|_, pending| pending.expires_at > Utc::now());
        nonces.insert(
            address.clone(),
            PendingNonce {
                message: message.clone(),
                expires_at,
            },
        );

        Ok(NonceResponseDto {
            address,
            nonce,
            message,
            expires_at,
        })
    }

    /// Checks the signature over the outstanding nonce and returns the
    /// wallet's profile, creating it on first sign-in. The nonce is consumed
    /// whatever the outcome.
    pub async fn verify_login(&self, address: &str, signature: &str) -> Result<Profile, ServiceError> {
        validate_ethereum_address(address).map_err(ServiceError::Validation)?;
        let address = normalize_address(address);

        let pending = self
            .nonces
            .write()
            .await
            .remove(&address)
            .filter(|pending| pending.expires_at > Utc::now())
            .ok_or_else(|| ServiceError::Unauthenticated(ErrorMessage::NonceExpired.to_string()))?;

        let matches = verify_signature(signature, &pending.message, &address)
            .map_err(ServiceError::Validation)?;

        if !matches {
            tracing::warn!("signature for {} did not match", address);
            return Err(ServiceError::Unauthenticated(
                ErrorMessage::InvalidSignature.to_string(),
            ));
        }

        let profile = self.profile_service.find_or_create_by_address(&address).await?;
        tracing::info!("wallet {} signed in as profile {}", address, profile.id);
        Ok(profile)
    }

    pub async fn balance(&self, address: &str) -> Result<BalanceDto, ServiceError> {
        let rpc_url = self.rpc_url.as_ref().ok_or_else(|| {
            ServiceError::WalletUnavailable("ETH_RPC_URL is not configured".to_string())
        })?;

        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_getBalance",
            "params": [address, "latest"],
        });

        let response = self
            .http
            .post(rpc_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("eth_getBalance request failed: {}", e);
                ServiceError::Wallet(e.to_string())
            })?;

        let response_body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ServiceError::Wallet(e.to_string()))?;

        if let Some(error) = response_body.get("error") {
            return Err(ServiceError::Wallet(error.to_string()));
        }

        let quantity = response_body
            .get("result")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ServiceError::Wallet("Missing result in RPC response".to_string()))?;
        let wei = parse_hex_quantity(quantity).map_err(ServiceError::Wallet)?;

        Ok(BalanceDto {
            address: address.to_string(),
            wei: wei.to_string(),
            eth: format_wei_as_eth(wei),
        })
    }
}
