//! API key secret store

use std::collections::HashMap;

/// One API secret, kept both as the configured hex string and as decoded bytes
///
/// The Bearer scheme compares against the hex form; the HMAC scheme needs
/// the raw bytes as key material. No `Debug` impl: secrets stay out of logs.
#[derive(Clone)]
pub struct Secret {
    hex: String,
    bytes: Vec<u8>,
}

/// Immutable key id -> secret map, built once at startup and shared by
/// reference with every authenticator
pub struct KeyStore {
    secrets: HashMap<String, Secret>,
}

impl KeyStore {
    /// Build the store from configured `key id -> hex secret` pairs
    ///
    /// Values are trimmed before decoding. Construction is all-or-nothing:
    /// an empty or non-hex secret fails, naming the offending key id.
    pub fn from_hex_map(keys: &HashMap<String, String>) -> Result<Self, KeyStoreError> {
        let mut secrets = HashMap::with_capacity(keys.len());
        for (key_id, raw) in keys {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Err(KeyStoreError::EmptySecret {
                    key_id: key_id.clone(),
                });
            }
            let bytes = hex::decode(trimmed).map_err(|source| KeyStoreError::InvalidHex {
                key_id: key_id.clone(),
                source,
            })?;
            secrets.insert(
                key_id.clone(),
                Secret {
                    hex: trimmed.to_string(),
                    bytes,
                },
            );
        }
        tracing::debug!(keys = secrets.len(), "api key store built");
        Ok(Self { secrets })
    }

    /// Decoded secret bytes for a key id (HMAC key material)
    pub fn secret_bytes(&self, key_id: &str) -> Option<&[u8]> {
        self.secrets.get(key_id).map(|secret| secret.bytes.as_slice())
    }

    /// Configured hex form of the secret for a key id
    pub fn secret_hex(&self, key_id: &str) -> Option<&str> {
        self.secrets.get(key_id).map(|secret| secret.hex.as_str())
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum KeyStoreError {
    #[error("Empty secret for key {key_id}")]
    EmptySecret { key_id: String },
    #[error("Invalid hex secret for key {key_id}")]
    InvalidHex {
        key_id: String,
        #[source]
        source: hex::FromHexError,
    },
}
