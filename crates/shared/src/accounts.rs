//! Account-storage boundary types
//!
//! Storage backends implement [`AccountStore`]; the security core only ever
//! sees the minimal credential view it needs for an authorization check.

use serde::{Deserialize, Serialize};

use crate::error::GateError;

/// Credential material for one account, as held by storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountCredential {
    pub username: String,
    /// Stored password hash in any supported format
    #[serde(skip_serializing)]
    pub stored_hash: String,
    /// Locked accounts refuse authorization regardless of the password
    pub locked: bool,
}

/// Read-side port implemented by account storage backends
pub trait AccountStore: Send + Sync {
    /// Look up credential material by username
    ///
    /// Returns `Ok(None)` when the account does not exist; errors are
    /// reserved for storage failures.
    fn secret_for_authz_check(
        &self,
        username: &str,
    ) -> Result<Option<AccountCredential>, GateError>;
}
