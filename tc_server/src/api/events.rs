//! Calendar event handlers.
//!
//! Every route here sits behind the session gate; the owner of an event is
//! always the logged-in caller.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use textcal::events::{DateRange, Event, EventError};

use super::{AppState, auth::json_body, error::ApiError, middleware::AuthenticatedUser};
use crate::metrics;

/// Body of event register and remove requests.
#[derive(Debug, Deserialize)]
pub struct EventPayload {
    #[serde(default, alias = "data")]
    pub text: String,
}

fn record(op: &'static str, result: &Result<impl Sized, EventError>) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(EventError::EmptyText) => "empty",
        Err(EventError::InvalidText) => "invalid",
        Err(EventError::NoDateFound(_)) => "no_date",
        Err(EventError::NotFound) => "not_found",
        Err(_) => "error",
    };
    metrics::events_total(op, outcome);
}

/// Register an event from free text.
///
/// # Request Body
///
/// ```json
/// { "text": "dentist on 2024-05-01" }
/// ```
///
/// # Response
///
/// `201 Created`:
/// ```json
/// { "id": 1, "title": "dentist on 2024-05-01", "start": "2024-05-01", "end": "2024-05-01" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Empty text, text with a NUL character, or malformed body
/// - `422 Unprocessable Entity`: No date in the text
/// - `500 Internal Server Error`: Extractor or storage failure
pub async fn register_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<EventPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let payload = json_body(payload)?;

    let result = state
        .event_manager
        .register(&user.username, &payload.text)
        .await;
    record("register", &result);

    Ok((StatusCode::CREATED, Json(result?)))
}

/// Remove one event matching the text.
///
/// Responds with the dates of the removed event.
///
/// # Errors
///
/// - `400 Bad Request`: Empty text, text with a NUL character, or malformed body
/// - `404 Not Found`: The caller has no matching event
/// - `422 Unprocessable Entity`: No date in the text
/// - `500 Internal Server Error`: Extractor or storage failure
pub async fn remove_event(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<EventPayload>, JsonRejection>,
) -> Result<Json<DateRange>, ApiError> {
    let payload = json_body(payload)?;

    let result = state
        .event_manager
        .remove(&user.username, &payload.text)
        .await;
    record("remove", &result);

    Ok(Json(result?))
}

/// The caller's events, ordered by start date.
pub async fn list_events(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state.event_manager.list(&user.username).await?;
    Ok(Json(events))
}
