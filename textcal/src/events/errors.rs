//! Event and date extraction error types.

use std::time::Duration;
use thiserror::Error;

/// Failures of a [`DateExtractor`](super::DateExtractor).
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The text contains no recognizable date
    #[error("No date found: {0}")]
    NoDate(String),

    /// The extractor process could not be started
    #[error("Failed to start date extractor: {0}")]
    Spawn(#[from] std::io::Error),

    /// The extractor process exited unsuccessfully
    #[error("Date extractor exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    /// The extractor did not finish in time
    #[error("Date extractor timed out after {0:?}")]
    Timeout(Duration),

    /// The extractor printed something other than the expected JSON
    #[error("Malformed date extractor output: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Event errors
#[derive(Debug, Error)]
pub enum EventError {
    /// Event text was empty
    #[error("Event text is empty")]
    EmptyText,

    /// Event text cannot be handed to the extractor
    #[error("Event text must not contain NUL characters")]
    InvalidText,

    /// The extractor found no date in the text
    #[error("No date found in event text")]
    NoDateFound(String),

    /// The extractor itself failed
    #[error("Date extraction failed: {0}")]
    Extraction(ExtractionError),

    /// No matching event to remove
    #[error("Event not found")]
    NotFound,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ExtractionError> for EventError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::NoDate(reason) => EventError::NoDateFound(reason),
            other => EventError::Extraction(other),
        }
    }
}

impl EventError {
    /// Whether this error comes from a failing subsystem rather than from
    /// the client's input.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, EventError::Extraction(_) | EventError::Database(_))
    }

    /// Client-safe error message
    pub fn client_message(&self) -> String {
        if self.is_infrastructure() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

/// Result type for event operations
pub type EventResult<T> = Result<T, EventError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_date_is_a_client_error() {
        let err: EventError = ExtractionError::NoDate("no date info".to_string()).into();
        assert!(matches!(err, EventError::NoDateFound(_)));
        assert!(!err.is_infrastructure());
    }

    #[test]
    fn test_process_failures_are_sanitized() {
        let err: EventError = ExtractionError::Failed {
            status: "exit status: 1".to_string(),
            stderr: "Traceback (most recent call last)".to_string(),
        }
        .into();

        assert!(err.is_infrastructure());
        assert_eq!(err.client_message(), "Internal server error");
    }
}
