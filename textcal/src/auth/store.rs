//! Credential storage.
//!
//! Expected PostgreSQL table:
//!
//! ```sql
//! CREATE TABLE users (
//!     username      TEXT PRIMARY KEY,
//!     password_hash TEXT NOT NULL
//! );
//! ```

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tokio::sync::RwLock;

use super::{
    errors::{AuthError, AuthResult},
    models::Account,
};

/// Persistent mapping from username to password hash.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Whether an account with this username exists
    async fn exists(&self, username: &str) -> AuthResult<bool>;

    /// Create an account.
    ///
    /// Must reject duplicates atomically with `AuthError::UsernameTaken`,
    /// independent of any earlier `exists` check.
    async fn create(&self, username: &str, password_hash: &str) -> AuthResult<()>;

    /// Find account by username, `AuthError::UserNotFound` if absent
    async fn find_by_username(&self, username: &str) -> AuthResult<Account>;
}

/// PostgreSQL implementation of `CredentialStore`
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn exists(&self, username: &str) -> AuthResult<bool> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1) AS present")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.get("present"))
    }

    async fn create(&self, username: &str, password_hash: &str) -> AuthResult<()> {
        let result = sqlx::query("INSERT INTO users (username, password_hash) VALUES ($1, $2)")
            .bind(username)
            .bind(password_hash)
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AuthError::UsernameTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Account> {
        let row = sqlx::query("SELECT username, password_hash FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(Account::new(
            row.get::<String, _>("username"),
            row.get::<String, _>("password_hash"),
        ))
    }
}

/// In-memory implementation of `CredentialStore`.
///
/// Uniqueness is enforced under the write lock, so concurrent creates of the
/// same username resolve to exactly one winner.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: RwLock<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn exists(&self, username: &str) -> AuthResult<bool> {
        Ok(self.users.read().await.contains_key(username))
    }

    async fn create(&self, username: &str, password_hash: &str) -> AuthResult<()> {
        match self.users.write().await.entry(username.to_string()) {
            Entry::Occupied(_) => Err(AuthError::UsernameTaken),
            Entry::Vacant(slot) => {
                slot.insert(password_hash.to_string());
                Ok(())
            }
        }
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Account> {
        self.users
            .read()
            .await
            .get(username)
            .map(|hash| Account::new(username, hash.clone()))
            .ok_or(AuthError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_memory_create_and_find() {
        let store = MemoryCredentialStore::new();

        assert!(!store.exists("alice").await.unwrap());
        store.create("alice", "hash1").await.unwrap();
        assert!(store.exists("alice").await.unwrap());

        let account = store.find_by_username("alice").await.unwrap();
        assert_eq!(account.username, "alice");
        assert_eq!(account.password_hash(), "hash1");
    }

    #[tokio::test]
    async fn test_memory_duplicate_keeps_original_hash() {
        let store = MemoryCredentialStore::new();
        store.create("alice", "hash1").await.unwrap();

        let result = store.create("alice", "hash2").await;
        assert!(matches!(result, Err(AuthError::UsernameTaken)));

        let account = store.find_by_username("alice").await.unwrap();
        assert_eq!(account.password_hash(), "hash1");
    }

    #[tokio::test]
    async fn test_memory_find_missing() {
        let store = MemoryCredentialStore::new();
        let result = store.find_by_username("ghost").await;
        assert!(matches!(result, Err(AuthError::UserNotFound)));
    }

    #[tokio::test]
    async fn test_memory_concurrent_creates_have_one_winner() {
        let store = Arc::new(MemoryCredentialStore::new());

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create("racer", &format!("hash{i}")).await
            }));
        }

        let mut wins = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => wins += 1,
                Err(AuthError::UsernameTaken) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(store.len().await, 1);
    }
}
