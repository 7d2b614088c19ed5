//! Account API handlers.
//!
//! - Signup with username and password, starting a session
//! - Login with username and password, starting a session
//! - Current identity of a logged-in user
//! - Logout, ending the session
//!
//! Sessions travel in a cookie; see [`CookieSettings`](super::cookies::CookieSettings).
//!
//! # Examples
//!
//! Sign up:
//! ```bash
//! curl -i -X POST http://localhost:8080/signup \
//!   -H "Content-Type: application/json" \
//!   -d '{"username": "alice", "password": "pw1"}'
//! ```
//!
//! Who am I:
//! ```bash
//! curl -b "tc_session=<token>" http://localhost:8080/me
//! ```

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use textcal::{SessionAttributes, SessionError, SessionToken, auth::Credentials};

use super::{AppState, error::ApiError, middleware::AuthenticatedUser};
use crate::{logging, metrics};

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
}

/// Unwrap a JSON body, mapping any rejection to 400.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected request body");
        ApiError::BadRequest("bad request body".to_string())
    })
}

/// Start or refresh the session for `username` and return the cookie to set.
///
/// A live session of the same user keeps its token and is saved with a
/// fresh expiry. Any other session is replaced by a new token so that a
/// token never changes hands between identities.
async fn establish_session(
    state: &AppState,
    headers: &HeaderMap,
    username: &str,
) -> Result<HeaderValue, ApiError> {
    let previous = match state.cookies.session_token(headers) {
        Some(token) => state
            .sessions
            .get(&token)
            .await?
            .map(|attributes| (token, attributes)),
        None => None,
    };

    let token = match previous {
        Some((token, mut attributes))
            if matches!(attributes.username(), Ok(Some(name)) if name == username) =>
        {
            attributes.set_username(username);
            match state.sessions.save(&token, &attributes).await {
                Ok(()) => token,
                // Expired between get and save.
                Err(SessionError::NotFound) => {
                    state
                        .sessions
                        .create(&SessionAttributes::for_user(username))
                        .await?
                }
                Err(e) => return Err(e.into()),
            }
        }
        Some((old, _)) => {
            let token = state
                .sessions
                .create(&SessionAttributes::for_user(username))
                .await?;
            state.sessions.destroy(&old).await?;
            token
        }
        None => {
            state
                .sessions
                .create(&SessionAttributes::for_user(username))
                .await?
        }
    };

    state
        .cookies
        .set_cookie(&token)
        .map_err(|e| ApiError::Internal(format!("Invalid session cookie: {e}")))
}

/// Register a new account and log it in.
///
/// # Request Body
///
/// ```json
/// { "username": "alice", "password": "pw1" }
/// ```
///
/// # Response
///
/// `201 Created` with an empty body and a `Set-Cookie` header.
///
/// # Errors
///
/// - `400 Bad Request`: Username or password is empty, or the body is not JSON
/// - `409 Conflict`: Username already exists
/// - `500 Internal Server Error`: Storage, hashing or session failure
pub async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, ApiError> {
    let credentials = json_body(payload)?;

    if let Err(e) = state
        .auth_manager
        .signup(&credentials.username, &credentials.password)
        .await
    {
        metrics::signups_total("rejected");
        return Err(e.into());
    }
    metrics::signups_total("created");

    let cookie = establish_session(&state, &headers, &credentials.username).await?;
    Ok((StatusCode::CREATED, [(SET_COOKIE, cookie)]).into_response())
}

/// Log in with username and password.
///
/// # Response
///
/// `200 OK` with an empty body and a `Set-Cookie` header.
///
/// # Errors
///
/// - `400 Bad Request`: Username or password is empty, or the body is not JSON
/// - `401 Unauthorized`: Unknown user or wrong password, with the same body
///   in both cases
/// - `500 Internal Server Error`: Storage, hash or session failure
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Response, ApiError> {
    let credentials = json_body(payload)?;

    let account = match state
        .auth_manager
        .login(&credentials.username, &credentials.password)
        .await
    {
        Ok(account) => account,
        Err(e) => {
            metrics::login_attempts_total(false);
            if !e.is_infrastructure() {
                logging::log_security_event(
                    "failed_login",
                    Some(&credentials.username),
                    &e.to_string(),
                );
            }
            return Err(e.into());
        }
    };
    metrics::login_attempts_total(true);

    let cookie = establish_session(&state, &headers, &account.username).await?;
    Ok((StatusCode::OK, [(SET_COOKIE, cookie)]).into_response())
}

/// Identity of the logged-in caller.
///
/// # Response
///
/// ```json
/// { "username": "alice" }
/// ```
pub async fn me(user: AuthenticatedUser) -> Json<MeResponse> {
    Json(MeResponse {
        username: user.username,
    })
}

/// End the caller's session.
///
/// Responds `204 No Content` and clears the cookie.
pub async fn logout(
    State(state): State<AppState>,
    Extension(token): Extension<SessionToken>,
    user: AuthenticatedUser,
) -> Result<Response, ApiError> {
    state.sessions.destroy(&token).await?;
    tracing::info!(username = %user.username, "Logged out");

    let cookie = state
        .cookies
        .clear_cookie()
        .map_err(|e| ApiError::Internal(format!("Invalid session cookie: {e}")))?;
    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]).into_response())
}
