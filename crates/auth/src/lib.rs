//! fsgate Admin API Security Core
//!
//! This crate contains the authentication and credential components for
//! fsgate: signed-request verification, the password hasher and the admin
//! credential checker.

pub mod auth;
pub mod authz;
pub mod config;
pub mod hasher;

pub use auth::{
    require_auth, AuthError, AuthState, Authenticator, BearerAuthenticator, HmacAuthenticator,
    KeyStore, KeyStoreError, MultiAuthenticator,
};
pub use authz::CredentialChecker;
pub use config::{AuthenticatorConfig, Config, ConfigError, HasherConfig};
pub use hasher::{generate_secret, Hasher, HasherError};
