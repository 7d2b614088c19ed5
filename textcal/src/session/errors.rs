//! Session error types.

use thiserror::Error;

/// Session store errors.
///
/// "No session" is not an error: lookups return `Ok(None)` for missing or
/// expired tokens. Everything here is a failure of the store itself or of
/// the data it holds.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Attribute (de)serialization failed
    #[error("Session serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored attribute has an unexpected type
    #[error("Malformed session attribute `{key}`")]
    MalformedSession { key: String },

    /// `save` was called for a token that is unknown or expired
    #[error("Session not found")]
    NotFound,

    /// Other backend failure
    #[error("Session backend error: {0}")]
    Backend(String),
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;
