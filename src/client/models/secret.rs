//! Actions secret models

use serde::{Deserialize, Serialize};

/// Secret metadata (values are never returned by the API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Secret {
    pub name: String,
}

/// One page of a secrets listing
#[derive(Debug, Clone, Deserialize)]
pub struct SecretList {
    #[serde(default)]
    pub total_count: usize,
    #[serde(default)]
    pub secrets: Vec<Secret>,
}

/// Public key used to seal secret values before upload
#[derive(Debug, Clone, Deserialize)]
pub struct PublicKey {
    pub key_id: String,
    /// Base64-encoded Curve25519 key
    pub key: String,
}
