//! Authentication gate for protected endpoints.
//!
//! The gate resolves the session cookie through the [`SessionStore`](textcal::SessionStore)
//! and injects the caller's identity into request extensions for downstream
//! handlers.
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum::{Router, routing::get, middleware};
//! # use tc_server::api::middleware::{auth_middleware, AuthenticatedUser};
//! # use tc_server::api::AppState;
//! # let state: AppState = unimplemented!();
//!
//! async fn whoami(user: AuthenticatedUser) -> String {
//!     user.username
//! }
//!
//! let protected: Router<AppState> = Router::new()
//!     .route("/whoami", get(whoami))
//!     .layer(middleware::from_fn_with_state(state, auth_middleware));
//! # let _ = protected;
//! ```

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use super::{AppState, error::ApiError};
use crate::{logging, metrics};

/// Prompt returned with 401 responses from the gate.
pub const LOGIN_PROMPT: &str = "please login";

/// Identity of the caller, attached by [`auth_middleware`].
///
/// Lives only in the extensions of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub username: String,
}

/// Axum extractor for the authenticated user.
///
/// Rejects with 401 when the gate did not run for this route.
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized(LOGIN_PROMPT.to_string()))
    }
}

fn reject(reason: &'static str) -> ApiError {
    metrics::auth_gate_rejections_total(reason);
    logging::log_security_event("auth_gate_rejected", None, reason);
    ApiError::Unauthorized(LOGIN_PROMPT.to_string())
}

/// Session gate.
///
/// # Behavior
///
/// - **No cookie / unknown or expired session / no username**: `401 Unauthorized`
/// - **Session store failure or malformed session**: `500 Internal Server Error`
/// - **Success**: injects [`AuthenticatedUser`] and the session token into
///   request extensions and returns the wrapped handler's response unchanged
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = state
        .cookies
        .session_token(request.headers())
        .ok_or_else(|| reject("missing_cookie"))?;

    let attributes = state
        .sessions
        .get(&token)
        .await?
        .ok_or_else(|| reject("unknown_session"))?;

    let username = attributes
        .username()?
        .ok_or_else(|| reject("anonymous_session"))?
        .to_string();

    tracing::debug!(username = %username, "Session resolved");

    request
        .extensions_mut()
        .insert(AuthenticatedUser { username });
    request.extensions_mut().insert(token);

    Ok(next.run(request).await)
}
