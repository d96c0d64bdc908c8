//! Scheme dispatch across configured authenticators
//!
//! Inspects the `Authorization` header and hands the request to the first
//! authenticator that recognizes the scheme. A missing header and an
//! unrecognized scheme are reported as distinct failures.

use std::sync::Arc;

use axum::http::request::Parts;

use crate::config::AuthenticatorConfig;

use super::bearer::BearerAuthenticator;
use super::hmac::HmacAuthenticator;
use super::keystore::{KeyStore, KeyStoreError};
use super::{header_str, AuthError, Authenticator, AUTHORIZATION_HEADER};

pub const SCHEME_HMAC: &str = "hmac";
pub const SCHEME_BEARER: &str = "bearer";

/// Dispatches verification to the first authenticator claiming the request
pub struct MultiAuthenticator {
    authenticators: Vec<Box<dyn Authenticator>>,
}

impl MultiAuthenticator {
    /// Build the configured authenticators over a single shared key store
    ///
    /// Duplicate scheme names collapse to one authenticator; unknown names
    /// are skipped with a warning.
    pub fn from_config(config: &AuthenticatorConfig) -> Result<Self, KeyStoreError> {
        let keys = Arc::new(KeyStore::from_hex_map(&config.access_keys)?);
        let mut authenticators: Vec<Box<dyn Authenticator>> = Vec::new();
        let mut seen: Vec<&str> = Vec::new();
        for scheme in &config.enabled_schemes {
            let scheme = scheme.as_str();
            if seen.contains(&scheme) {
                continue;
            }
            match scheme {
                SCHEME_HMAC => authenticators.push(Box::new(HmacAuthenticator::new(
                    config.window_seconds,
                    Arc::clone(&keys),
                ))),
                SCHEME_BEARER => {
                    authenticators.push(Box::new(BearerAuthenticator::new(Arc::clone(&keys))))
                }
                other => {
                    tracing::warn!(scheme = other, "unknown authenticator scheme ignored");
                    continue;
                }
            }
            seen.push(scheme);
        }
        tracing::debug!(
            schemes = authenticators.len(),
            keys = keys.len(),
            "authenticator dispatch built"
        );
        Ok(Self { authenticators })
    }
}

impl Authenticator for MultiAuthenticator {
    fn supports(&self, parts: &Parts) -> bool {
        self.authenticators.iter().any(|a| a.supports(parts))
    }

    fn verify(&self, parts: &Parts, body: &[u8]) -> Result<(), AuthError> {
        if header_str(parts, AUTHORIZATION_HEADER).is_none() {
            return Err(AuthError::MissingAuthorization);
        }
        for authenticator in &self.authenticators {
            if authenticator.supports(parts) {
                return authenticator.verify(parts, body);
            }
        }
        Err(AuthError::UnsupportedScheme)
    }
}
