//! Application configuration

use std::collections::HashMap;
use std::env;

use crate::auth::multi::{SCHEME_BEARER, SCHEME_HMAC};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub authenticator: AuthenticatorConfig,
    pub hasher: HasherConfig,
}

/// Settings for the request authentication layer
#[derive(Debug, Clone)]
pub struct AuthenticatorConfig {
    pub enabled_schemes: Vec<String>,
    pub window_seconds: i64,
    /// Access keys as key id to hex-encoded secret
    pub access_keys: HashMap<String, String>,
    pub max_body_bytes: usize,
}

/// Settings for password hashing defaults
#[derive(Debug, Clone)]
pub struct HasherConfig {
    pub default_algorithm: String,
    pub default_rounds: u32,
    pub default_salt_length: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            authenticator: AuthenticatorConfig::from_env()?,
            hasher: HasherConfig::from_env()?,
        })
    }
}

impl AuthenticatorConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            enabled_schemes: parse_schemes(
                &env::var("FSGATE_AUTH_SCHEMES").unwrap_or_else(|_| "hmac,bearer".to_string()),
            )?,
            window_seconds: env::var("FSGATE_AUTH_WINDOW_SECONDS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .map_err(|_| {
                    ConfigError::Invalid(
                        "FSGATE_AUTH_WINDOW_SECONDS",
                        "expected an integer number of seconds",
                    )
                })?,
            access_keys: parse_access_keys(
                &env::var("FSGATE_ACCESS_KEYS")
                    .map_err(|_| ConfigError::Missing("FSGATE_ACCESS_KEYS"))?,
            )?,
            max_body_bytes: env::var("FSGATE_MAX_BODY_BYTES")
                .unwrap_or_else(|_| "1048576".to_string()) // 1MB default
                .parse()
                .map_err(|_| {
                    ConfigError::Invalid("FSGATE_MAX_BODY_BYTES", "expected a byte count")
                })?,
        })
    }
}

impl HasherConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Validated against the supported algorithms when the hasher
            // is built
            default_algorithm: env::var("FSGATE_HASH_ALGORITHM")
                .unwrap_or_else(|_| "crypt-sha256".to_string()),
            default_rounds: env::var("FSGATE_HASH_ROUNDS")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|_| {
                    ConfigError::Invalid("FSGATE_HASH_ROUNDS", "expected an integer round count")
                })?,
            default_salt_length: env::var("FSGATE_HASH_SALT_LENGTH")
                .unwrap_or_else(|_| "16".to_string())
                .parse()
                .map_err(|_| {
                    ConfigError::Invalid("FSGATE_HASH_SALT_LENGTH", "expected a character count")
                })?,
        })
    }
}

/// Parse `key_id:hex_secret` pairs separated by commas
fn parse_access_keys(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut keys = HashMap::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let Some((key_id, secret_hex)) = entry.split_once(':') else {
            return Err(ConfigError::Invalid(
                "FSGATE_ACCESS_KEYS",
                "expected comma-separated key_id:hex_secret pairs",
            ));
        };
        let key_id = key_id.trim();
        if key_id.is_empty() {
            return Err(ConfigError::Invalid(
                "FSGATE_ACCESS_KEYS",
                "key id must not be empty",
            ));
        }
        keys.insert(key_id.to_string(), secret_hex.trim().to_string());
    }
    if keys.is_empty() {
        return Err(ConfigError::Invalid(
            "FSGATE_ACCESS_KEYS",
            "at least one key_id:hex_secret pair is required",
        ));
    }
    Ok(keys)
}

fn parse_schemes(raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut schemes = Vec::new();
    for entry in raw.split(',') {
        let scheme = entry.trim().to_ascii_lowercase();
        if scheme.is_empty() {
            continue;
        }
        if scheme != SCHEME_HMAC && scheme != SCHEME_BEARER {
            return Err(ConfigError::UnknownScheme(scheme));
        }
        schemes.push(scheme);
    }
    if schemes.is_empty() {
        return Err(ConfigError::Invalid(
            "FSGATE_AUTH_SCHEMES",
            "at least one scheme is required",
        ));
    }
    Ok(schemes)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
    #[error("Unknown authenticator scheme: {0}")]
    UnknownScheme(String),
}
