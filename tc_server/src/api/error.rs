//! Mapping of library errors onto HTTP responses.
//!
//! | Error                                | Status |
//! |--------------------------------------|--------|
//! | empty or NUL-bearing input, bad body | 400    |
//! | missing session, bad credentials     | 401    |
//! | unknown event                        | 404    |
//! | duplicate username                   | 409    |
//! | no date in event text                | 422    |
//! | storage, session, hashing failures   | 500    |
//!
//! 500 responses carry a fixed message. The detail is logged here, before
//! the response is built.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use textcal::{AuthError, SessionError, events::EventError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned by handlers and middleware.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    Conflict(String),
    Unprocessable(String),
    /// Infrastructure failure; the detail is logged, never sent
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                "Internal server error".to_string()
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Unprocessable(msg) => msg,
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.is_infrastructure() {
            return ApiError::Internal(err.to_string());
        }

        let message = err.client_message();
        match err {
            AuthError::EmptyCredentials => ApiError::BadRequest(message),
            AuthError::UsernameTaken => ApiError::Conflict(message),
            AuthError::UserNotFound | AuthError::InvalidPassword => {
                ApiError::Unauthorized(message)
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<EventError> for ApiError {
    fn from(err: EventError) -> Self {
        if err.is_infrastructure() {
            return ApiError::Internal(err.to_string());
        }

        let message = err.client_message();
        match err {
            EventError::EmptyText | EventError::InvalidText => ApiError::BadRequest(message),
            EventError::NoDateFound(_) => ApiError::Unprocessable(message),
            EventError::NotFound => ApiError::NotFound(message),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use textcal::events::ExtractionError;

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(
            ApiError::from(AuthError::EmptyCredentials).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(AuthError::UsernameTaken).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(AuthError::UserNotFound).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AuthError::MalformedHash).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unknown_user_and_wrong_password_are_identical() {
        let a = ApiError::from(AuthError::UserNotFound);
        let b = ApiError::from(AuthError::InvalidPassword);
        match (a, b) {
            (ApiError::Unauthorized(x), ApiError::Unauthorized(y)) => assert_eq!(x, y),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_event_error_statuses() {
        assert_eq!(
            ApiError::from(EventError::from(ExtractionError::NoDate("x".into()))).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(EventError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(EventError::from(ExtractionError::Timeout(
                std::time::Duration::from_secs(1)
            )))
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_session_errors_are_internal() {
        let err = ApiError::from(SessionError::MalformedSession {
            key: "username".to_string(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
