//! Authentication module providing account storage, password hashing and
//! the signup/login flows.
//!
//! - Argon2id password hashing with server-side pepper, run on the blocking pool
//! - Username uniqueness enforced by the credential store itself
//! - Unknown users and wrong passwords are distinct errors internally but
//!   share one client-facing message
//!
//! ## Example
//!
//! ```no_run
//! use textcal::auth::{AuthManager, PasswordHasher, PgCredentialStore};
//! use textcal::db::{Database, DatabaseConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::from_env()).await?;
//!     let auth = AuthManager::new(
//!         Arc::new(PgCredentialStore::new(db.pool().clone())),
//!         PasswordHasher::new("secret_pepper"),
//!     );
//!
//!     auth.signup("alice", "pw1").await?;
//!     let account = auth.login("alice", "pw1").await?;
//!     println!("Logged in as {}", account.username);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;
pub mod password;
pub mod store;

pub use errors::{AuthError, AuthResult};
pub use manager::AuthManager;
pub use models::{Account, Credentials};
pub use password::{DEFAULT_ITERATIONS, DEFAULT_MEMORY_KIB, DEFAULT_PARALLELISM, PasswordHasher};
pub use store::{CredentialStore, MemoryCredentialStore, PgCredentialStore};
