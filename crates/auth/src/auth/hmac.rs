//! HMAC-signed request authentication
//!
//! Clients sign a canonical string (method, path with query, timestamp and
//! body digest) with a shared secret and send the signature in the
//! `Authorization` header as `HMAC <hex>`. Verification recomputes the
//! signature locally and compares in constant time.

use std::sync::Arc;

use axum::http::request::Parts;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

use super::keystore::KeyStore;
use super::{
    constant_time_eq, header_str, AuthError, Authenticator, API_KEY_HEADER, AUTHORIZATION_HEADER,
    CONTENT_SHA256_HEADER, HMAC_SCHEME_PREFIX, TIMESTAMP_HEADER,
};

type HmacSha256 = Hmac<Sha256>;

/// Replay window applied when the configured value is not positive
const DEFAULT_WINDOW: Duration = Duration::minutes(5);

/// Verifies detached HMAC-SHA256 signatures over a canonical request string
pub struct HmacAuthenticator {
    keys: Arc<KeyStore>,
    window: Duration,
}

impl HmacAuthenticator {
    /// Create an authenticator with a replay window in seconds
    ///
    /// A non-positive window falls back to five minutes.
    pub fn new(window_seconds: i64, keys: Arc<KeyStore>) -> Self {
        let window = if window_seconds <= 0 {
            DEFAULT_WINDOW
        } else {
            Duration::seconds(window_seconds)
        };
        Self { keys, window }
    }

    /// The string clients sign: method, path (query appended only when
    /// non-empty), timestamp as received, and the body digest, joined by `\n`
    fn canonical_string(parts: &Parts, timestamp: &str, body_hash: &str) -> String {
        // A bare trailing `?` parses as `Some("")`; it is not signed material
        let path_and_query = match parts.uri.query().filter(|query| !query.is_empty()) {
            Some(query) => format!("{}?{}", parts.uri.path(), query),
            None => parts.uri.path().to_string(),
        };
        format!(
            "{}\n{}\n{}\n{}",
            parts.method, path_and_query, timestamp, body_hash
        )
    }
}

impl Authenticator for HmacAuthenticator {
    fn supports(&self, parts: &Parts) -> bool {
        header_str(parts, AUTHORIZATION_HEADER)
            .is_some_and(|value| value.starts_with(HMAC_SCHEME_PREFIX))
    }

    fn verify(&self, parts: &Parts, body: &[u8]) -> Result<(), AuthError> {
        let api_key = header_str(parts, API_KEY_HEADER);
        let authorization = header_str(parts, AUTHORIZATION_HEADER);
        let timestamp = header_str(parts, TIMESTAMP_HEADER);
        let claimed_hash = header_str(parts, CONTENT_SHA256_HEADER);
        let (Some(api_key), Some(authorization), Some(timestamp), Some(claimed_hash)) =
            (api_key, authorization, timestamp, claimed_hash)
        else {
            return Err(AuthError::MissingHeaders);
        };

        let secret = self
            .keys
            .secret_bytes(api_key)
            .ok_or(AuthError::UnknownKey)?;

        let signature_hex = authorization
            .strip_prefix(HMAC_SCHEME_PREFIX)
            .ok_or(AuthError::UnsupportedScheme)?;

        let sent_at = OffsetDateTime::parse(timestamp, &Rfc3339)
            .map_err(|_| AuthError::MalformedTimestamp)?;
        // Symmetric and inclusive: skew exactly at the window is accepted
        let skew = OffsetDateTime::now_utc() - sent_at;
        if skew > self.window || skew < -self.window {
            return Err(AuthError::WindowExceeded);
        }

        let body_hash = hex::encode(Sha256::digest(body));
        if !claimed_hash.eq_ignore_ascii_case(&body_hash) {
            return Err(AuthError::BodyHashMismatch);
        }

        // Sign over the locally computed digest, never the claimed header value
        let canonical = Self::canonical_string(parts, timestamp, &body_hash);
        // HMAC-SHA256 accepts keys of any length; this cannot fail for a
        // store-validated secret
        let mut mac =
            HmacSha256::new_from_slice(secret).map_err(|_| AuthError::SignatureMismatch)?;
        mac.update(canonical.as_bytes());
        let expected = mac.finalize().into_bytes();

        let provided =
            hex::decode(signature_hex).map_err(|_| AuthError::MalformedSignature)?;
        if !constant_time_eq(&provided, &expected) {
            return Err(AuthError::SignatureMismatch);
        }
        Ok(())
    }
}
