//! Engine error types.

use goalpost_core::{FieldId, UserId};
use goalpost_store::StoreError;

/// Result alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by domain operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A ledger mutation was requested with a non-positive amount.
    #[error("amount must be positive, got {amount}")]
    InvalidAmount {
        /// The rejected amount.
        amount: i64,
    },

    /// An operation required an open session but the user has none.
    #[error("user {user_id} has no open session")]
    NoOpenSession {
        /// The user without an open session.
        user_id: UserId,
    },

    /// Undo was requested but the field has no logged events.
    #[error("field {field_id} has no events to undo")]
    NothingToUndo {
        /// The field with an empty event log.
        field_id: FieldId,
    },

    /// An event was attributed to a deactivated player.
    #[error("player is inactive")]
    PlayerInactive,

    /// Underlying storage error.
    #[error(transparent)]
    Store(#[from] StoreError),
}
