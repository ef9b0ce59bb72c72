//! Error types for goalpost storage.

use goalpost_core::SessionId;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// What kind of record was missing.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// Balance too low for a consumption. Nothing was written.
    #[error("insufficient balance: balance={balance}, required={required}")]
    InsufficientBalance {
        /// Current balance in minutes.
        balance: i64,
        /// Required amount in minutes.
        required: i64,
    },

    /// A start was refused because the user already has an open session.
    /// Carries the surviving session's ID so callers can adopt it.
    #[error("session already open: {session_id}")]
    AlreadyOpen {
        /// The open session that won.
        session_id: SessionId,
    },

    /// A stop was refused because the session is already closed. No ledger
    /// mutation was performed.
    #[error("session already closed: {session_id}")]
    AlreadyClosed {
        /// The closed session.
        session_id: SessionId,
    },
}
