//! Authentication error types.

use thiserror::Error;

use crate::session::SessionError;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Stored password hash could not be parsed
    #[error("Malformed password hash")]
    MalformedHash,

    /// Password verification failed
    #[error("Invalid password")]
    InvalidPassword,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Username already exists
    #[error("Username already exists")]
    UsernameTaken,

    /// Username or password was empty
    #[error("Username or password is empty")]
    EmptyCredentials,

    /// Session store failure while establishing a session
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}

impl AuthError {
    /// Whether this error comes from a failing subsystem rather than from
    /// the client's input.
    ///
    /// Infrastructure errors must be logged and answered with a generic
    /// server error.
    pub fn is_infrastructure(&self) -> bool {
        match self {
            AuthError::Database(_)
            | AuthError::HashingFailed(_)
            | AuthError::MalformedHash
            | AuthError::Session(_) => true,
            AuthError::InvalidPassword
            | AuthError::UserNotFound
            | AuthError::UsernameTaken
            | AuthError::EmptyCredentials => false,
        }
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Infrastructure errors are collapsed into one message. Unknown users and
    /// wrong passwords share a message so responses cannot be used to
    /// enumerate usernames.
    pub fn client_message(&self) -> String {
        match self {
            _ if self.is_infrastructure() => "Internal server error".to_string(),
            AuthError::InvalidPassword | AuthError::UserNotFound => {
                "Invalid username or password".to_string()
            }
            AuthError::UsernameTaken => "Username is already used".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
