//! Client-side encryption of secret values
//!
//! GitHub only accepts secret values sealed with the repository's (or
//! organization's) Curve25519 public key using a libsodium sealed box.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use crypto_box::PublicKey;
use crypto_box::aead::OsRng;

use crate::error::ApiError;

/// Length of a Curve25519 public key in bytes.
const KEY_LEN: usize = 32;

/// Seal `plaintext` for the base64-encoded `public_key` and return it base64-encoded.
pub fn seal(public_key: &str, plaintext: &str) -> Result<String, ApiError> {
    let key_bytes = STANDARD
        .decode(public_key)
        .map_err(|e| ApiError::Encryption(format!("public key is not valid base64: {}", e)))?;

    let key_bytes: [u8; KEY_LEN] = key_bytes.try_into().map_err(|bytes: Vec<u8>| {
        ApiError::Encryption(format!(
            "public key must be {} bytes, got {}",
            KEY_LEN,
            bytes.len()
        ))
    })?;

    let sealed = PublicKey::from(key_bytes)
        .seal(&mut OsRng, plaintext.as_bytes())
        .map_err(|e| ApiError::Encryption(e.to_string()))?;

    Ok(STANDARD.encode(sealed))
}
