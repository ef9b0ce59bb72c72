//! Session lifecycle handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use goalpost_core::SessionId;

use crate::error::ApiError;
use crate::handlers::credits::parse_user_id;
use crate::state::AppState;

/// Session start request.
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// The user starting the session.
    pub user_id: String,
}

/// Session start response.
#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    /// Always true on success.
    pub success: bool,
    /// The open session's ID, fresh or adopted.
    pub session_id: String,
    /// True when an already-open session was returned instead of a new one.
    pub adopted: bool,
    /// Session start time, RFC 3339.
    pub started_at: String,
}

/// Session stop response.
#[derive(Debug, Serialize)]
pub struct StopSessionResponse {
    /// Always true on success.
    pub success: bool,
    /// Whole minutes billed for the session.
    pub minutes_used: i64,
    /// Credits actually charged (clamped to the balance).
    pub credits_charged: i64,
    /// Balance after the charge.
    pub new_balance: i64,
}

/// A row in the open-sessions listing.
#[derive(Debug, Serialize)]
pub struct OpenSessionResponse {
    /// Session ID.
    pub session_id: String,
    /// Owning user.
    pub user_id: String,
    /// Owner's display name.
    pub username: String,
    /// Owner's email.
    pub email: String,
    /// Start time, RFC 3339.
    pub started_at: String,
    /// Whole minutes elapsed so far.
    pub elapsed_minutes: i64,
}

/// Generic success response.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    /// Always true.
    pub success: bool,
}

/// Start a session, adopting the user's existing open one if present.
pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<StartSessionRequest>,
) -> Result<Json<StartSessionResponse>, ApiError> {
    let user_id = parse_user_id(&body.user_id)?;

    let outcome = state.sessions.start(&user_id, Utc::now())?;
    let session = outcome.session();

    Ok(Json(StartSessionResponse {
        success: true,
        session_id: session.id.to_string(),
        adopted: outcome.adopted(),
        started_at: session.started_at.to_rfc3339(),
    }))
}

/// Stop a session and charge elapsed minutes.
pub async fn stop_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<StopSessionResponse>, ApiError> {
    let session_id = parse_session_id(&session_id)?;

    let receipt = state.sessions.stop(&session_id, Utc::now())?;

    Ok(Json(StopSessionResponse {
        success: true,
        minutes_used: receipt.minutes_used,
        credits_charged: receipt.credits_charged,
        new_balance: receipt.new_balance_minutes,
    }))
}

/// All open sessions with owner details (admin).
pub async fn list_open_sessions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<OpenSessionResponse>>, ApiError> {
    let rows = state.sessions.open_sessions(Utc::now())?;

    Ok(Json(
        rows.into_iter()
            .map(|row| OpenSessionResponse {
                session_id: row.session.id.to_string(),
                user_id: row.session.user_id.to_string(),
                username: row.username,
                email: row.email,
                started_at: row.session.started_at.to_rfc3339(),
                elapsed_minutes: row.elapsed_minutes,
            })
            .collect(),
    ))
}

/// Remove a stuck session without charging (admin).
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    state.sessions.admin_delete(&session_id)?;
    Ok(Json(SuccessResponse { success: true }))
}

fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("Invalid session ID".into()))
}
