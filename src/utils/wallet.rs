//! Ethereum personal-message signatures (EIP-191) and address checks.
use tiny_keccak::{Hasher, Keccak};
use web3::signing::recover;

/// Recovers the signer of `message` and returns it as a lower-case `0x` address.
pub fn recover_signer(signature: &str, message: &str) -> Result<String, String> {
    let signature_clean = signature.strip_prefix("0x").unwrap_or(signature);

    let signature_bytes = hex::decode(signature_clean)
        .map_err(|e| format!("Invalid signature format: {}", e))?;

    if signature_bytes.len() != 65 {
        return Err("Signature must be 65 bytes long".to_string());
    }

    let recovery_id = match signature_bytes[64] {
        27 => 0,
        28 => 1,
        v @ 0 | v @ 1 => v as i32,
        _ => return Err("Invalid recovery id".to_string()),
    };

    let mut sig = [0u8; 64];
    sig.copy_from_slice(&signature_bytes[0..64]);

    let message_hash = hash_message(message);

    let recovered = recover(&message_hash, &sig, recovery_id)
        .map_err(|e| format!("Recovery failed: {}", e))?;

    Ok(format!("0x{}", hex::encode(recovered.as_bytes())))
}

/// True when `signature` over `message` was produced by `expected_address`.
pub fn verify_signature(
    signature: &str,
    message: &str,
    expected_address: &str,
) -> Result<bool, String> {
    let recovered = recover_signer(signature, message)?;
    Ok(recovered.eq_ignore_ascii_case(&normalize_address(expected_address)))
}

pub fn hash_message(message: &str) -> [u8; 32] {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", message.len());
    let mut eth_message = Vec::new();
    eth_message.extend_from_slice(prefix.as_bytes());
    eth_message.extend_from_slice(message.as_bytes());

    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(&eth_message);
    hasher.finalize(&mut output);
    output
}

pub fn validate_ethereum_address(address: &str) -> Result<(), String> {
    let address_clean = address.strip_prefix("0x").unwrap_or(address);

    if address_clean.len() != 40 {
        return Err("Invalid Ethereum address length".to_string());
    }

    if !address_clean.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("Invalid Ethereum address format".to_string());
    }

    Ok(())
}

/// `0x`-prefixed and lower-cased.
pub fn normalize_address(address: &str) -> String {
    let address_clean = address.strip_prefix("0x").unwrap_or(address);
    format!("0x{}", address_clean.to_lowercase())
}
