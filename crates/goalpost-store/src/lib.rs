//! `RocksDB` storage layer for goalpost.
//!
//! This crate is the system's atomic-procedure surface: everything the
//! lifecycle manager and credit ledger need to be race-free lives here as a
//! compound operation that commits a single `WriteBatch`. Check-then-act
//! sequences (balance checks, open-session exclusivity) are serialized
//! through a store-wide write lock, so two concurrent consumptions that are
//! each valid against a stale balance read cannot both commit.
//!
//! # Column families
//!
//! - `profiles`: user profiles with cached balances, keyed by `user_id`
//! - `transactions` / `transactions_by_user`: the append-only ledger
//! - `sessions`: usage sessions, keyed by `session_id`
//! - `open_sessions`: exclusivity index, at most one entry per user
//! - `fields` / `players` / `players_by_field`: venue roster
//! - `events` / `events_by_player`: the game-event log

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use goalpost_core::{
    CreditTransaction, EventId, Field, FieldId, GameEvent, OpenSessionRow, Player, PlayerId,
    SessionId, StopReceipt, TransactionId, UsageSession, UserId, UserProfile,
};

/// Result of an atomic ledger mutation: the appended transaction plus the
/// balance it produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerReceipt {
    /// The transaction that was appended.
    pub transaction: CreditTransaction,

    /// The balance after the mutation.
    pub new_balance_minutes: i64,
}

/// The storage trait defining all database operations.
///
/// Object-safe so the engine can hold `Arc<dyn Store>` and tests can swap
/// implementations. Every compound operation is all-or-nothing: on error
/// nothing was written.
pub trait Store: Send + Sync {
    // =========================================================================
    // Profiles
    // =========================================================================

    /// Insert or update a user profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_profile(&self, profile: &UserProfile) -> Result<()>;

    /// Get a profile by user ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>>;

    /// List all profiles (admin view), ordered by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_profiles(&self) -> Result<Vec<UserProfile>>;

    // =========================================================================
    // Ledger
    // =========================================================================

    /// Get a transaction by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<CreditTransaction>>;

    /// List a user's transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CreditTransaction>>;

    /// Append a purchase transaction and increment the balance, atomically.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the profile doesn't exist.
    fn add_credits(
        &self,
        user_id: &UserId,
        amount_minutes: i64,
        description: &str,
        reference: Option<String>,
    ) -> Result<LedgerReceipt>;

    /// Append a consumption transaction and decrement the balance,
    /// atomically. Refuses, writing nothing, when the balance is too low.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the profile doesn't exist.
    /// - `StoreError::InsufficientBalance` if `amount_minutes` exceeds the
    ///   balance.
    fn consume_credits(
        &self,
        user_id: &UserId,
        amount_minutes: i64,
        description: &str,
        reference: Option<String>,
    ) -> Result<LedgerReceipt>;

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Get a session by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_session(&self, session_id: &SessionId) -> Result<Option<UsageSession>>;

    /// Get a user's currently open session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn open_session_for(&self, user_id: &UserId) -> Result<Option<UsageSession>>;

    /// Open a new session for a user, atomically enforcing exclusivity.
    /// Exactly one of N racing starts creates a row; the rest observe the
    /// winner's ID in the `AlreadyOpen` error.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the profile doesn't exist.
    /// - `StoreError::AlreadyOpen` if the user already has an open session.
    /// - `StoreError::InsufficientBalance` if the balance is below the
    ///   minimum needed to start.
    fn start_session(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<UsageSession>;

    /// Close a session and charge for elapsed time as one atomic unit:
    /// the terminal session fields, the consumption transaction, and the
    /// balance decrement commit together or not at all. The charge is
    /// clamped to the available balance.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the session or its profile doesn't exist.
    /// - `StoreError::AlreadyClosed` if the session was already stopped; no
    ///   further ledger mutation is performed.
    fn stop_session(&self, session_id: &SessionId, now: DateTime<Utc>) -> Result<StopReceipt>;

    /// Admin escape hatch: delete a session without charging. Never touches
    /// the ledger. Used to recover stuck or abandoned sessions.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the session doesn't exist.
    fn delete_session(&self, session_id: &SessionId) -> Result<()>;

    /// All currently open sessions across all users with owner details,
    /// sorted by start time.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_open_sessions(&self, now: DateTime<Utc>) -> Result<Vec<OpenSessionRow>>;

    // =========================================================================
    // Fields & players
    // =========================================================================

    /// Insert a field.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_field(&self, field: &Field) -> Result<()>;

    /// Get a field by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_field(&self, field_id: &FieldId) -> Result<Option<Field>>;

    /// Find fields by exact code or description substring (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_fields(&self, query: &str, limit: usize) -> Result<Vec<Field>>;

    /// Delete a field record. Callers are responsible for deleting children
    /// first (player and event rows are not cascaded here).
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the field doesn't exist.
    fn delete_field(&self, field_id: &FieldId) -> Result<()>;

    /// Insert a player and its field index entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_player(&self, player: &Player) -> Result<()>;

    /// Get a player by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_player(&self, player_id: &PlayerId) -> Result<Option<Player>>;

    /// List a field's players, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_players_by_field(&self, field_id: &FieldId) -> Result<Vec<Player>>;

    /// Flip a player's active flag, returning the updated record.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the player doesn't exist.
    fn set_player_active(&self, player_id: &PlayerId, active: bool) -> Result<Player>;

    /// Delete a player record and its index entry.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the player doesn't exist.
    fn delete_player(&self, player_id: &PlayerId) -> Result<()>;

    // =========================================================================
    // Game events
    // =========================================================================

    /// Insert a game event and its player index entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_event(&self, event: &GameEvent) -> Result<()>;

    /// List a player's events, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_events_by_player(&self, player_id: &PlayerId) -> Result<Vec<GameEvent>>;

    /// Delete a single event.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the event doesn't exist.
    fn delete_event(&self, event_id: &EventId) -> Result<()>;

    /// Delete all of a player's events, returning how many were removed.
    /// A count of zero is a valid outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn delete_events_by_player(&self, player_id: &PlayerId) -> Result<usize>;
}
