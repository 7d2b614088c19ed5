//! Session module: opaque tokens mapped to typed attribute sets.
//!
//! The token is the only thing a client holds. Everything else, including
//! the authenticated username, stays server-side in a [`SessionStore`].

pub mod errors;
pub mod models;
pub mod store;

pub use errors::{SessionError, SessionResult};
pub use models::{SessionAttributes, SessionToken, USERNAME_KEY};
pub use store::{DEFAULT_SESSION_TTL_SECS, MemorySessionStore, PgSessionStore, SessionStore};
