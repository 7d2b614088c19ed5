//! Authentication manager implementation.

use std::sync::Arc;
use tokio::sync::OnceCell;

use super::{
    errors::{AuthError, AuthResult},
    models::Account,
    password::PasswordHasher,
    store::CredentialStore,
};

/// Authentication manager
///
/// Composes a [`CredentialStore`] and a [`PasswordHasher`] into the signup
/// and login flows. Session handling is left to the caller.
///
/// Logins for unknown usernames verify against a throwaway hash, so they
/// cost the same Argon2 work as a wrong password.
#[derive(Clone)]
pub struct AuthManager {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    dummy_hash: Arc<OnceCell<String>>,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `store` - Credential storage backend
    /// * `hasher` - Password hasher
    pub fn new(store: Arc<dyn CredentialStore>, hasher: PasswordHasher) -> Self {
        Self {
            store,
            hasher,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Register a new account
    ///
    /// # Errors
    ///
    /// * `AuthError::EmptyCredentials` - Username or password is empty
    /// * `AuthError::UsernameTaken` - Username already exists, including a
    ///   concurrent signup that won the insert
    /// * `AuthError::HashingFailed` - Password could not be hashed
    /// * `AuthError::Database` - Storage failure
    pub async fn signup(&self, username: &str, password: &str) -> AuthResult<()> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::EmptyCredentials);
        }

        if self.store.exists(username).await? {
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = self.hasher.hash_blocking(password.to_string()).await?;

        // The store rejects duplicates on its own; the exists() check above
        // only avoids hashing for names that are obviously taken.
        self.store.create(username, &password_hash).await?;

        log::info!("Account created for {username}");
        Ok(())
    }

    /// Check a username and password
    ///
    /// # Returns
    ///
    /// * `AuthResult<Account>` - The matching account
    ///
    /// # Errors
    ///
    /// * `AuthError::EmptyCredentials` - Username or password is empty
    /// * `AuthError::UserNotFound` - No such account
    /// * `AuthError::InvalidPassword` - Password does not match
    /// * `AuthError::MalformedHash` - Stored hash is unreadable
    pub async fn login(&self, username: &str, password: &str) -> AuthResult<Account> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::EmptyCredentials);
        }

        let account = match self.store.find_by_username(username).await {
            Ok(account) => account,
            Err(AuthError::UserNotFound) => {
                self.verify_dummy(password).await?;
                return Err(AuthError::UserNotFound);
            }
            Err(e) => return Err(e),
        };

        let matches = self
            .hasher
            .verify_blocking(account.password_hash().to_string(), password.to_string())
            .await?;

        if !matches {
            return Err(AuthError::InvalidPassword);
        }

        Ok(account)
    }

    async fn verify_dummy(&self, password: &str) -> AuthResult<()> {
        let dummy = self
            .dummy_hash
            .get_or_try_init(|| self.hasher.hash_blocking("textcal-dummy-password".to_string()))
            .await?;

        self.hasher
            .verify_blocking(dummy.clone(), password.to_string())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{password::test_hasher, store::MemoryCredentialStore};
    use async_trait::async_trait;
    use proptest::prelude::*;

    fn manager() -> (AuthManager, Arc<MemoryCredentialStore>) {
        let store = Arc::new(MemoryCredentialStore::new());
        (AuthManager::new(store.clone(), test_hasher()), store)
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let (auth, _) = manager();

        auth.signup("alice", "pw1").await.unwrap();
        let account = auth.login("alice", "pw1").await.unwrap();

        assert_eq!(account.username, "alice");
    }

    #[tokio::test]
    async fn test_duplicate_signup_does_not_replace_hash() {
        let (auth, store) = manager();
        auth.signup("alice", "pw1").await.unwrap();
        let before = store.find_by_username("alice").await.unwrap();

        let result = auth.signup("alice", "pw2").await;
        assert!(matches!(result, Err(AuthError::UsernameTaken)));

        let after = store.find_by_username("alice").await.unwrap();
        assert_eq!(before.password_hash(), after.password_hash());
        assert!(auth.login("alice", "pw1").await.is_ok());
        assert!(matches!(
            auth.login("alice", "pw2").await,
            Err(AuthError::InvalidPassword)
        ));
    }

    #[tokio::test]
    async fn test_login_failures() {
        let (auth, _) = manager();
        auth.signup("alice", "pw1").await.unwrap();

        assert!(matches!(
            auth.login("alice", "wrong").await,
            Err(AuthError::InvalidPassword)
        ));
        assert!(matches!(
            auth.login("bob", "pw1").await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_unknown_user_still_runs_argon2() {
        let (auth, _) = manager();
        assert!(!auth.dummy_hash.initialized());

        for _ in 0..2 {
            assert!(matches!(
                auth.login("ghost", "pw1").await,
                Err(AuthError::UserNotFound)
            ));
        }

        let dummy = auth.dummy_hash.get().expect("dummy hash computed");
        assert!(dummy.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn test_login_with_corrupt_stored_hash() {
        let (auth, store) = manager();
        store.create("alice", "garbage").await.unwrap();

        assert!(matches!(
            auth.login("alice", "pw1").await,
            Err(AuthError::MalformedHash)
        ));
    }

    /// Store whose `exists` always says no, as if a concurrent signup
    /// landed between the check and the insert.
    struct RacingStore(MemoryCredentialStore);

    #[async_trait]
    impl CredentialStore for RacingStore {
        async fn exists(&self, _username: &str) -> AuthResult<bool> {
            Ok(false)
        }

        async fn create(&self, username: &str, password_hash: &str) -> AuthResult<()> {
            self.0.create(username, password_hash).await
        }

        async fn find_by_username(&self, username: &str) -> AuthResult<Account> {
            self.0.find_by_username(username).await
        }
    }

    #[tokio::test]
    async fn test_signup_race_is_caught_by_store() {
        let inner = MemoryCredentialStore::new();
        inner.create("alice", "existing").await.unwrap();
        let auth = AuthManager::new(Arc::new(RacingStore(inner)), test_hasher());

        let result = auth.signup("alice", "pw2").await;
        assert!(matches!(result, Err(AuthError::UsernameTaken)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_empty_field_is_rejected(other in ".*", empty_username in any::<bool>()) {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let (auth, store) = manager();

            let (username, password) = if empty_username {
                (String::new(), other.clone())
            } else {
                (other.clone(), String::new())
            };

            rt.block_on(async {
                prop_assert!(matches!(
                    auth.signup(&username, &password).await,
                    Err(AuthError::EmptyCredentials)
                ));
                prop_assert!(matches!(
                    auth.login(&username, &password).await,
                    Err(AuthError::EmptyCredentials)
                ));
                prop_assert!(store.is_empty().await);
                Ok(())
            })?;
        }
    }
}
