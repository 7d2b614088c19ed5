//! HTTP API for the calendar server.
//!
//! # Modules
//!
//! - [`auth`]: signup, login, identity and logout
//! - [`events`]: register, remove and list the caller's events
//! - [`middleware`]: session gate for protected endpoints
//! - [`cookies`]: session cookie parsing and rendering
//! - [`request_id`]: request correlation
//! - [`error`]: error to HTTP response mapping
//!
//! # Endpoints Overview
//!
//! ## Public
//! - `POST /signup` - Create account and start a session
//! - `POST /login` - Start a session
//! - `GET /health` - Server health status
//!
//! ## Behind the session gate
//! - `GET /me` - Caller identity
//! - `POST /logout` - End the session
//! - `POST /events` - Register an event from free text
//! - `DELETE /events` - Remove a matching event
//! - `GET /events` - List the caller's events
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tc_server::api::{AppState, cookies::CookieSettings, create_router};
//! use textcal::{
//!     AuthManager, PasswordHasher,
//!     auth::MemoryCredentialStore,
//!     events::{EventManager, MemoryEventStore, ProcessDateExtractor, DEFAULT_EXTRACTOR_TIMEOUT},
//!     session::MemorySessionStore,
//! };
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let state = AppState {
//!     auth_manager: Arc::new(AuthManager::new(
//!         Arc::new(MemoryCredentialStore::new()),
//!         PasswordHasher::new("a_long_server_side_pepper"),
//!     )),
//!     sessions: Arc::new(MemorySessionStore::default()),
//!     event_manager: Arc::new(EventManager::new(
//!         Arc::new(ProcessDateExtractor::new(
//!             "python3",
//!             vec!["./main.py".to_string()],
//!             DEFAULT_EXTRACTOR_TIMEOUT,
//!         )),
//!         Arc::new(MemoryEventStore::new()),
//!     )),
//!     cookies: CookieSettings::default(),
//!     database: None,
//! };
//!
//! let app = create_router(state);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # CORS
//!
//! CORS is configured permissively. Restrict origins before exposing the
//! server beyond a trusted network.

pub mod auth;
pub mod cookies;
pub mod error;
pub mod events;
pub mod middleware;
pub mod request_id;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use textcal::{AuthManager, SessionStore, db::Database, events::EventManager};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use cookies::CookieSettings;

/// Application state shared by all handlers.
///
/// Cloned per request; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub auth_manager: Arc<AuthManager>,
    pub sessions: Arc<dyn SessionStore>,
    pub event_manager: Arc<EventManager>,
    pub cookies: CookieSettings,
    /// `None` when running on in-memory stores
    pub database: Option<Database>,
}

/// Build the router with every endpoint and middleware.
///
/// ```text
/// POST   /signup   - Register user (public)
/// POST   /login    - Login (public)
/// GET    /health   - Health check (public)
/// GET    /me       - Caller identity (session required)
/// POST   /logout   - Logout (session required)
/// POST   /events   - Register event (session required)
/// DELETE /events   - Remove event (session required)
/// GET    /events   - List events (session required)
/// ```
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/health", get(health_check));

    let protected_routes = Router::new()
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
        .route(
            "/events",
            get(events::list_events)
                .post(events::register_event)
                .delete(events::remove_event),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id::request_id_middleware))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when storage is reachable, `503 Service Unavailable`
/// otherwise. In-memory mode is always healthy.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","version":"0.1.0","storage":"postgres","database":true,"timestamp":"..."}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (storage, db_healthy) = match &state.database {
        Some(database) => ("postgres", database.health_check().await.is_ok()),
        None => ("memory", true),
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "storage": storage,
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
