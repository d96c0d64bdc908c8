//! Bearer secret authentication
//!
//! A simpler scheme for trusted internal callers: the client sends the
//! shared secret itself, hex encoded, as `Bearer <hex>`. The presented
//! value must match the configured hex string exactly, including case.

use std::sync::Arc;

use axum::http::request::Parts;

use super::keystore::KeyStore;
use super::{
    header_str, AuthError, Authenticator, API_KEY_HEADER, AUTHORIZATION_HEADER,
    BEARER_SCHEME_PREFIX,
};

/// Verifies the shared secret presented directly in the `Authorization` header
pub struct BearerAuthenticator {
    keys: Arc<KeyStore>,
}

impl BearerAuthenticator {
    pub fn new(keys: Arc<KeyStore>) -> Self {
        Self { keys }
    }
}

impl Authenticator for BearerAuthenticator {
    fn supports(&self, parts: &Parts) -> bool {
        header_str(parts, AUTHORIZATION_HEADER)
            .is_some_and(|value| value.starts_with(BEARER_SCHEME_PREFIX))
    }

    fn verify(&self, parts: &Parts, _body: &[u8]) -> Result<(), AuthError> {
        let api_key = header_str(parts, API_KEY_HEADER);
        let authorization = header_str(parts, AUTHORIZATION_HEADER);
        let (Some(api_key), Some(authorization)) = (api_key, authorization) else {
            return Err(AuthError::MissingHeaders);
        };

        let secret_hex = self
            .keys
            .secret_hex(api_key)
            .ok_or(AuthError::UnknownKey)?;

        let presented = authorization
            .strip_prefix(BEARER_SCHEME_PREFIX)
            .ok_or(AuthError::UnsupportedScheme)?;

        if presented != secret_hex {
            return Err(AuthError::SecretMismatch);
        }
        Ok(())
    }
}
