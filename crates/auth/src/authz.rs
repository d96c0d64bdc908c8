//! Admin account credential checks
//!
//! Glues the account store to the hasher: looks up the stored credential,
//! enforces the lock flag and verifies the password. Callers get the same
//! `InvalidCredentials` for unknown accounts and wrong passwords.

use std::sync::Arc;

use fsgate_shared::{AccountStore, GateError};

use crate::hasher::Hasher;

pub struct CredentialChecker {
    accounts: Arc<dyn AccountStore>,
    hasher: Arc<Hasher>,
}

impl CredentialChecker {
    pub fn new(accounts: Arc<dyn AccountStore>, hasher: Arc<Hasher>) -> Self {
        Self { accounts, hasher }
    }

    /// Check a username/password pair against stored credentials
    pub fn check(&self, username: &str, password: &str) -> Result<(), GateError> {
        if username.is_empty() || password.is_empty() {
            return Err(GateError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let Some(credential) = self.accounts.secret_for_authz_check(username)? else {
            tracing::warn!(username, "credential check for unknown account");
            return Err(GateError::InvalidCredentials);
        };

        // Locked accounts are refused before any hash work
        if credential.locked {
            tracing::warn!(username, "credential check for locked account");
            return Err(GateError::AccountLocked);
        }

        let (ok, algorithm) = self
            .hasher
            .verify(password, &credential.stored_hash)
            .map_err(|e| GateError::Internal(e.to_string()))?;
        if !ok {
            tracing::warn!(username, %algorithm, "credential check failed");
            return Err(GateError::InvalidCredentials);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsgate_shared::AccountCredential;
    use std::collections::HashMap;

    struct FakeAccounts(HashMap<String, AccountCredential>);

    impl AccountStore for FakeAccounts {
        fn secret_for_authz_check(
            &self,
            username: &str,
        ) -> Result<Option<AccountCredential>, GateError> {
            if username == "broken" {
                return Err(GateError::Storage("connection reset".to_string()));
            }
            Ok(self.0.get(username).cloned())
        }
    }

    fn account(username: &str, stored_hash: &str, locked: bool) -> AccountCredential {
        AccountCredential {
            username: username.to_string(),
            stored_hash: stored_hash.to_string(),
            locked,
        }
    }

    fn checker() -> CredentialChecker {
        let hasher = Hasher::new();
        let current = hasher.default_hash("Secret123!").expect("hashing succeeds");

        let mut accounts = HashMap::new();
        accounts.insert("alice".to_string(), account("alice", &current, false));
        accounts.insert("mallory".to_string(), account("mallory", &current, true));
        // Legacy raw MD5 digest of "password"
        accounts.insert(
            "bob".to_string(),
            account("bob", "5f4dcc3b5aa765d61d8327deb882cf99", false),
        );
        accounts.insert(
            "carol".to_string(),
            account("carol", "$2a$10$N9qo8uLOickgx2ZMRZoMye", false),
        );

        CredentialChecker::new(Arc::new(FakeAccounts(accounts)), Arc::new(hasher))
    }

    #[test]
    fn test_accepts_valid_credentials() {
        checker()
            .check("alice", "Secret123!")
            .expect("valid credentials pass");
    }

    #[test]
    fn test_accepts_legacy_raw_hash() {
        checker()
            .check("bob", "password")
            .expect("legacy digest still verifies");
    }

    #[test]
    fn test_wrong_password_and_unknown_account_look_alike() {
        let checker = checker();
        let wrong = checker.check("alice", "nope").unwrap_err();
        let unknown = checker.check("eve", "nope").unwrap_err();
        assert!(matches!(wrong, GateError::InvalidCredentials));
        assert!(matches!(unknown, GateError::InvalidCredentials));
    }

    #[test]
    fn test_locked_account_refused_with_correct_password() {
        let err = checker().check("mallory", "Secret123!").unwrap_err();
        assert!(matches!(err, GateError::AccountLocked));
    }

    #[test]
    fn test_empty_inputs_are_validation_errors() {
        let checker = checker();
        assert!(matches!(
            checker.check("", "Secret123!").unwrap_err(),
            GateError::Validation(_)
        ));
        assert!(matches!(
            checker.check("alice", "").unwrap_err(),
            GateError::Validation(_)
        ));
    }

    #[test]
    fn test_storage_errors_propagate() {
        let err = checker().check("broken", "Secret123!").unwrap_err();
        assert!(matches!(err, GateError::Storage(_)));
    }

    #[test]
    fn test_unrecognized_stored_hash_is_internal() {
        let err = checker().check("carol", "Secret123!").unwrap_err();
        assert!(matches!(err, GateError::Internal(_)));
    }
}
