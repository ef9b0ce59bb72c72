//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{delete, get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{credits, events, fields, health, sessions, users};
use crate::state::AppState;

/// Maximum concurrent requests for event-logging endpoints.
/// Live match logging is the high-volume path.
const EVENTS_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Users & credits
/// - `POST /v1/users` - Register a profile
/// - `GET /v1/users/:user_id/balance` - Balance plus transaction history
/// - `POST /v1/credits/add` - Admin credit grant
///
/// ## Sessions
/// - `POST /v1/sessions` - Start (or adopt) a metered session
/// - `POST /v1/sessions/:session_id/stop` - Stop and charge
///
/// ## Fields, players, events
/// - `POST /v1/fields`, `GET /v1/fields` - Register and search fields
/// - `POST /v1/fields/:field_id/players` - Add a player
/// - `POST /v1/players/:player_id/toggle` - Flip player activation
/// - `POST /v1/events` - Log an in-game event (requires open session)
/// - `GET /v1/fields/:field_id/stats` - Ranked stat lines
///
/// ## Admin (trusted gateway)
/// - `GET /v1/admin/users` - All profiles
/// - `GET /v1/admin/sessions/open` - Open sessions with elapsed time
/// - `DELETE /v1/admin/sessions/:session_id` - Remove a stuck session
/// - `DELETE /v1/admin/players/:player_id`, `DELETE /v1/admin/fields/:field_id`
/// - `POST /v1/admin/events/undo` - Remove a field's most recent event
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    // Event logging gets its own, higher concurrency limit: a busy match
    // produces a burst per goal while the rest of the API stays quiet.
    let event_routes = Router::new()
        .route("/", post(events::record_event))
        .layer(ConcurrencyLimitLayer::new(EVENTS_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        // Users
        .route("/users", post(users::create_user))
        .route("/users/:user_id/balance", get(credits::get_balance))
        // Credits
        .route("/credits/add", post(credits::add_credits))
        // Sessions
        .route("/sessions", post(sessions::start_session))
        .route("/sessions/:session_id/stop", post(sessions::stop_session))
        // Fields & players
        .route("/fields", post(fields::create_field).get(fields::find_fields))
        .route("/fields/:field_id/players", post(fields::add_player).get(fields::list_players))
        .route("/fields/:field_id/stats", get(fields::field_stats))
        .route("/players/:player_id/toggle", post(fields::toggle_player))
        // Admin
        .route("/admin/users", get(users::list_users))
        .route("/admin/sessions/open", get(sessions::list_open_sessions))
        .route(
            "/admin/sessions/:session_id",
            delete(sessions::delete_session),
        )
        .route("/admin/players/:player_id", delete(fields::delete_player))
        .route("/admin/fields/:field_id", delete(fields::delete_field))
        .route("/admin/events/undo", post(events::undo_last_event))
        // Event routes (with their own concurrency limit)
        .nest("/events", event_routes)
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        // API v1 routes (rate limited)
        .nest("/v1", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
