//! In-game event handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use goalpost_core::EventKind;

use crate::error::ApiError;
use crate::handlers::credits::parse_user_id;
use crate::handlers::fields::{parse_field_id, parse_player_id};
use crate::state::AppState;

/// Event logging request.
#[derive(Debug, Deserialize)]
pub struct RecordEventRequest {
    /// The logged-in user doing the recording; must hold an open session.
    pub user_id: String,
    /// The player the event is attributed to.
    pub player_id: String,
    /// What happened.
    pub kind: EventKind,
    /// When it happened (default: now). Allows short backfills.
    pub timestamp: Option<DateTime<Utc>>,
}

/// Event logging response.
#[derive(Debug, Serialize)]
pub struct RecordEventResponse {
    /// Always true on success.
    pub success: bool,
    /// The recorded event's ID (ULID).
    pub event_id: String,
}

/// Undo request.
#[derive(Debug, Deserialize)]
pub struct UndoRequest {
    /// The field whose most recent event should be removed.
    pub field_id: String,
}

/// Undo response.
#[derive(Debug, Serialize)]
pub struct UndoResponse {
    /// Always true on success.
    pub success: bool,
    /// The removed event's ID.
    pub event_id: String,
    /// The player the removed event belonged to.
    pub player_id: String,
}

/// Record an in-game event. Requires the user to hold an open session.
pub async fn record_event(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RecordEventRequest>,
) -> Result<Json<RecordEventResponse>, ApiError> {
    let user_id = parse_user_id(&body.user_id)?;
    let player_id = parse_player_id(&body.player_id)?;
    let timestamp = body.timestamp.unwrap_or_else(Utc::now);

    let event = state.events.record(&user_id, &player_id, body.kind, timestamp)?;

    Ok(Json(RecordEventResponse {
        success: true,
        event_id: event.id.to_string(),
    }))
}

/// Remove a field's most recently recorded event (admin).
pub async fn undo_last_event(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UndoRequest>,
) -> Result<Json<UndoResponse>, ApiError> {
    let field_id = parse_field_id(&body.field_id)?;

    let event = state.events.undo_last(&field_id)?;

    Ok(Json(UndoResponse {
        success: true,
        event_id: event.id.to_string(),
        player_id: event.player_id.to_string(),
    }))
}
