//! # textcal
//!
//! Account, session and event primitives for a small calendar backend.
//!
//! The crate is split into storage-agnostic services and their backends:
//!
//! - [`auth`]: credential store, Argon2id password hasher and the
//!   [`AuthManager`](auth::AuthManager) that composes them for signup and login
//! - [`session`]: opaque-token session store with typed attribute access
//! - [`events`]: calendar events whose dates come from a [`DateExtractor`](events::DateExtractor)
//! - [`db`]: PostgreSQL pool and configuration shared by the Postgres backends
//!
//! Every store is an `async_trait` with a PostgreSQL implementation and an
//! in-memory one. The in-memory stores back the test suites and the
//! server's `--memory` mode.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use textcal::auth::{AuthManager, MemoryCredentialStore, PasswordHasher};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), textcal::auth::AuthError> {
//! let auth = AuthManager::new(
//!     Arc::new(MemoryCredentialStore::new()),
//!     PasswordHasher::new("pepper_for_docs_only"),
//! );
//!
//! auth.signup("alice", "pw1").await?;
//! let account = auth.login("alice", "pw1").await?;
//! assert_eq!(account.username, "alice");
//! # Ok(())
//! # }
//! ```

/// Accounts, password hashing and the signup/login flows.
pub mod auth;

/// PostgreSQL connection pool and configuration.
pub mod db;

/// Calendar events and the date extraction boundary.
pub mod events;

/// Session tokens, attributes and stores.
pub mod session;

pub use auth::{Account, AuthError, AuthManager, AuthResult, PasswordHasher};
pub use session::{SessionAttributes, SessionError, SessionStore, SessionToken};
