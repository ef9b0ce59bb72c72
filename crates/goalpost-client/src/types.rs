//! Wire types for the goalpost API.
//!
//! These mirror the service's snake_case JSON bodies one-to-one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use goalpost_core::{EventKind, PlayerRole};

/// Error envelope returned by the API.
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    /// The error payload.
    pub error: ApiErrorBody,
}

/// Error payload.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    /// Machine-readable code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Structured details for some codes.
    pub details: Option<serde_json::Value>,
}

/// Profile registration request.
#[derive(Debug, Serialize)]
pub struct CreateUserRequest {
    /// Display name.
    pub username: String,
    /// Contact email.
    pub email: String,
}

/// A user profile.
#[derive(Debug, Clone, Deserialize)]
pub struct UserResponse {
    /// User ID.
    pub user_id: String,
    /// Display name.
    pub username: String,
    /// Contact email.
    pub email: String,
    /// Credit balance in minutes.
    pub balance_minutes: i64,
}

/// Balance with transaction history.
#[derive(Debug, Deserialize)]
pub struct BalanceResponse {
    /// Current balance in minutes.
    pub balance_minutes: i64,
    /// Ledger entries, newest first.
    pub transactions: Vec<TransactionResponse>,
}

/// A ledger entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub transaction_id: String,
    /// Signed amount: positive grants, negative consumption.
    pub amount_minutes: i64,
    /// Balance after this entry.
    pub balance_after_minutes: i64,
    /// Description.
    pub description: String,
    /// Optional external reference.
    #[serde(default)]
    pub reference: Option<String>,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

/// Admin credit grant request.
#[derive(Debug, Serialize)]
pub struct AddCreditsRequest {
    /// User to credit.
    pub user_id: String,
    /// Minutes to grant.
    pub amount_minutes: i64,
    /// Optional description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional external reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// Admin credit grant response.
#[derive(Debug, Deserialize)]
pub struct AddCreditsResponse {
    /// Always true on success.
    pub success: bool,
    /// Balance after the grant.
    pub new_balance: i64,
    /// The ledger entry created.
    pub transaction_id: String,
}

/// Session start response.
#[derive(Debug, Clone, Deserialize)]
pub struct StartSessionResponse {
    /// Always true on success.
    pub success: bool,
    /// The open session's ID.
    pub session_id: String,
    /// True when an already-open session was returned.
    pub adopted: bool,
    /// Session start time.
    pub started_at: DateTime<Utc>,
}

/// Session stop response.
#[derive(Debug, Clone, Deserialize)]
pub struct StopSessionResponse {
    /// Always true on success.
    pub success: bool,
    /// Whole minutes billed.
    pub minutes_used: i64,
    /// Credits actually charged.
    pub credits_charged: i64,
    /// Balance after the charge.
    pub new_balance: i64,
}

/// A row in the open-sessions listing.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenSessionResponse {
    /// Session ID.
    pub session_id: String,
    /// Owning user.
    pub user_id: String,
    /// Owner's display name.
    pub username: String,
    /// Owner's email.
    pub email: String,
    /// Session start time.
    pub started_at: DateTime<Utc>,
    /// Whole minutes elapsed.
    pub elapsed_minutes: i64,
}

/// A field.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldResponse {
    /// Field ID.
    pub field_id: String,
    /// Uppercase lookup code.
    pub code: String,
    /// Description.
    pub description: String,
}

/// A player.
#[derive(Debug, Clone, Deserialize)]
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

/// Event logging request.
#[derive(Debug, Serialize)]
pub struct RecordEventRequest {
    /// The recording user; must hold an open session.
    pub user_id: String,
    /// The player the event is attributed to.
    pub player_id: String,
    /// What happened.
    pub kind: EventKind,
    /// Optional timestamp; server uses now when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Event logging response.
#[derive(Debug, Deserialize)]
pub struct RecordEventResponse {
    /// Always true on success.
    pub success: bool,
    /// The recorded event's ID.
    pub event_id: String,
}

/// A ranked stat line.
#[derive(Debug, Clone, Deserialize)]
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

/// Generic success response.
#[derive(Debug, Deserialize)]
pub struct SuccessResponse {
    /// Always true.
    pub success: bool,
}
