//! Authentication data models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A registered account.
///
/// The password hash stays inside the auth module: it is skipped when
/// serializing and redacted from `Debug` output.
#[derive(Clone, Serialize)]
pub struct Account {
    pub username: String,
    #[serde(skip)]
    password_hash: String,
}

impl Account {
    /// Build an account from a stored row.
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }

    pub(crate) fn password_hash(&self) -> &str {
        &self.password_hash
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .finish()
    }
}

/// Username and password as submitted to signup and login.
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}
