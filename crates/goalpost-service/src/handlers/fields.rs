//! Field, player, and stats handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use goalpost_core::{
    Field, FieldId, Player, PlayerId, PlayerRole, SortOrder, StatLine, StatMetric, StatWindow,
};

use crate::error::ApiError;
use crate::handlers::sessions::SuccessResponse;
use crate::state::AppState;

/// Default field search page size.
const DEFAULT_FIELD_LIMIT: usize = 20;

/// Field registration request.
#[derive(Debug, Deserialize)]
pub struct CreateFieldRequest {
    /// Short lookup code; normalized to uppercase.
    pub code: String,
    /// Free-form description.
    pub description: String,
}

/// Field in responses.
#[derive(Debug, Serialize)]
pub struct FieldResponse {
    /// Field ID.
    pub field_id: String,
    /// Uppercase lookup code.
    pub code: String,
    /// Description.
    pub description: String,
}

impl From<Field> for FieldResponse {
    fn from(field: Field) -> Self {
        Self {
            field_id: field.id.to_string(),
            code: field.code,
            description: field.description,
        }
    }
}

/// Field search parameters.
#[derive(Debug, Deserialize)]
pub struct FindFieldsParams {
    /// Exact code or description substring.
    pub query: String,
    /// Maximum results.
    pub limit: Option<usize>,
}

/// Player registration request.
#[derive(Debug, Deserialize)]
pub struct AddPlayerRequest {
    /// Display name.
    pub name: String,
    /// Roles; defaults to outfield when absent.
    #[serde(default)]
    pub roles: Vec<PlayerRole>,
}

/// Player in responses.
#[derive(Debug, Serialize)]
pub struct PlayerResponse {
    /// Player ID.
    pub player_id: String,
    /// Owning field.
    pub field_id: String,
    /// Display name.
    pub name: String,
    /// Roles.
    pub roles: Vec<PlayerRole>,
    /// Whether the player is available for live logging.
    pub active: bool,
}

impl From<Player> for PlayerResponse {
    fn from(player: Player) -> Self {
        Self {
            player_id: player.id.to_string(),
            field_id: player.field_id.to_string(),
            name: player.name,
            roles: player.roles,
            active: player.active,
        }
    }
}

/// Stats query parameters.
#[derive(Debug, Deserialize)]
pub struct StatsParams {
    /// Calendar window: day, month, or year (default: day).
    pub period: Option<String>,
    /// Reference instant for the window (default: now).
    pub at: Option<DateTime<Utc>>,
    /// Metric to rank by (default: goals).
    pub sort: Option<String>,
    /// asc or desc (default: desc).
    pub order: Option<String>,
}

/// A ranked stat line in responses.
#[derive(Debug, Serialize)]
pub struct StatLineResponse {
    /// The player.
    pub player_id: String,
    /// Goals in the window.
    pub goals: u64,
    /// Assists in the window.
    pub assists: u64,
    /// Saves in the window.
    pub saves: u64,
    /// Fouls in the window.
    pub fouls: u64,
}

impl From<StatLine> for StatLineResponse {
    fn from(line: StatLine) -> Self {
        Self {
            player_id: line.player_id.to_string(),
            goals: u64::from(line.goals),
            assists: u64::from(line.assists),
            saves: u64::from(line.saves),
            fouls: u64::from(line.fouls),
        }
    }
}

/// Register a new field.
pub async fn create_field(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateFieldRequest>,
) -> Result<Json<FieldResponse>, ApiError> {
    if body.code.trim().is_empty() {
        return Err(ApiError::BadRequest("field code must not be empty".into()));
    }

    let field = state.roster.create_field(&body.code, body.description)?;
    Ok(Json(field.into()))
}

/// Search fields by code or description.
pub async fn find_fields(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FindFieldsParams>,
) -> Result<Json<Vec<FieldResponse>>, ApiError> {
    let fields = state
        .roster
        .find_fields(&params.query, params.limit.unwrap_or(DEFAULT_FIELD_LIMIT))?;
    Ok(Json(fields.into_iter().map(Into::into).collect()))
}

/// Delete a field and everything registered under it (admin).
pub async fn delete_field(
    State(state): State<Arc<AppState>>,
    Path(field_id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let field_id = parse_field_id(&field_id)?;
    state.roster.delete_field(&field_id)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Add a player to a field.
pub async fn add_player(
    State(state): State<Arc<AppState>>,
    Path(field_id): Path<String>,
    Json(body): Json<AddPlayerRequest>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let field_id = parse_field_id(&field_id)?;

    let roles = if body.roles.is_empty() {
        vec![PlayerRole::Outfield]
    } else {
        body.roles
    };
    let player = state.roster.add_player(&field_id, body.name, roles)?;
    Ok(Json(player.into()))
}

/// A field's players in registration order.
pub async fn list_players(
    State(state): State<Arc<AppState>>,
    Path(field_id): Path<String>,
) -> Result<Json<Vec<PlayerResponse>>, ApiError> {
    let field_id = parse_field_id(&field_id)?;
    let players = state.roster.players(&field_id)?;
    Ok(Json(players.into_iter().map(Into::into).collect()))
}

/// Flip a player's activation, keeping history.
pub async fn toggle_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let player_id = parse_player_id(&player_id)?;

    let player = state.roster.get_player(&player_id)?;
    let player = state.roster.set_player_active(&player_id, !player.active)?;
    Ok(Json(player.into()))
}

/// Delete a player and their events (admin).
pub async fn delete_player(
    State(state): State<Arc<AppState>>,
    Path(player_id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let player_id = parse_player_id(&player_id)?;
    state.roster.delete_player(&player_id)?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Ranked stat lines for a field.
pub async fn field_stats(
    State(state): State<Arc<AppState>>,
    Path(field_id): Path<String>,
    Query(params): Query<StatsParams>,
) -> Result<Json<Vec<StatLineResponse>>, ApiError> {
    let field_id = parse_field_id(&field_id)?;

    let at = params.at.unwrap_or_else(Utc::now);
    let window = match params.period.as_deref().unwrap_or("day") {
        "day" => StatWindow::day_of(at),
        "month" => StatWindow::month_of(at),
        "year" => StatWindow::year_of(at),
        other => {
            return Err(ApiError::BadRequest(format!(
                "unknown period: {other} (expected day, month, or year)"
            )))
        }
    };

    let metric = match params.sort.as_deref().unwrap_or("goals") {
        "goals" => StatMetric::Goals,
        "assists" => StatMetric::Assists,
        "saves" => StatMetric::Saves,
        "fouls" => StatMetric::Fouls,
        other => return Err(ApiError::BadRequest(format!("unknown sort metric: {other}"))),
    };

    let order = match params.order.as_deref().unwrap_or("desc") {
        "asc" => SortOrder::Ascending,
        "desc" => SortOrder::Descending,
        other => return Err(ApiError::BadRequest(format!("unknown order: {other}"))),
    };

    let lines = state.roster.field_stats(&field_id, window, metric, order)?;
    Ok(Json(lines.into_iter().map(Into::into).collect()))
}

pub(crate) fn parse_field_id(raw: &str) -> Result<FieldId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("Invalid field ID".into()))
}

pub(crate) fn parse_player_id(raw: &str) -> Result<PlayerId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::BadRequest("Invalid player ID".into()))
}
