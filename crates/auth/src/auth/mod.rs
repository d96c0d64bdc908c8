//! Authentication module for fsgate

pub mod bearer;
pub mod hmac;
pub mod keystore;
pub mod middleware;
pub mod multi;

pub use self::bearer::BearerAuthenticator;
pub use self::hmac::HmacAuthenticator;
pub use self::keystore::{KeyStore, KeyStoreError};
pub use self::middleware::{require_auth, AuthState};
pub use self::multi::MultiAuthenticator;

use axum::http::request::Parts;
use subtle::ConstantTimeEq;

/// Header carrying the API key id (`X-Api-Key` on the wire)
pub const API_KEY_HEADER: &str = "x-api-key";
/// Header carrying the scheme and credential (`Authorization`)
pub const AUTHORIZATION_HEADER: &str = "authorization";
/// Header carrying the request timestamp, RFC 3339 (`X-Timestamp`)
pub const TIMESTAMP_HEADER: &str = "x-timestamp";
/// Header carrying the client's hex SHA-256 of the body (`X-Content-Sha256`)
pub const CONTENT_SHA256_HEADER: &str = "x-content-sha256";

/// Authorization value prefix for the HMAC scheme
pub const HMAC_SCHEME_PREFIX: &str = "HMAC ";
/// Authorization value prefix for the Bearer scheme
pub const BEARER_SCHEME_PREFIX: &str = "Bearer ";

/// A single authentication scheme over buffered request parts
///
/// Verification is synchronous and touches no I/O; implementations are
/// immutable after construction and freely shared across tasks.
pub trait Authenticator: Send + Sync {
    /// Whether this authenticator recognizes the request's Authorization scheme
    fn supports(&self, parts: &Parts) -> bool;

    /// Verify the request against the scheme's rules
    fn verify(&self, parts: &Parts, body: &[u8]) -> Result<(), AuthError>;
}

/// Why a request failed authentication
///
/// The HTTP boundary collapses every kind into the same 401 response; the
/// kinds exist for logs and tests only.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing auth headers")]
    MissingHeaders,
    #[error("Missing Authorization header")]
    MissingAuthorization,
    #[error("Unknown api key")]
    UnknownKey,
    #[error("Authorization scheme not supported")]
    UnsupportedScheme,
    #[error("Malformed timestamp")]
    MalformedTimestamp,
    #[error("Timestamp outside allowed window")]
    WindowExceeded,
    #[error("Body hash mismatch")]
    BodyHashMismatch,
    #[error("Malformed signature encoding")]
    MalformedSignature,
    #[error("Signature mismatch")]
    SignatureMismatch,
    #[error("Secret mismatch")]
    SecretMismatch,
    #[error("Failed to read request body: {0}")]
    BodyRead(String),
}

/// Fetch a header as a str, treating empty values as absent
pub(crate) fn header_str<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

/// Constant-time comparison to prevent timing attacks
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    // Even when lengths differ, do constant-time work to avoid leaking length
    if a.len() != b.len() {
        let dummy = vec![0u8; a.len()];
        let _ = a.ct_eq(&dummy);
        return false;
    }

    a.ct_eq(b).into()
}
