//! Database schema definitions and column families.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// User profiles with cached balances, keyed by `user_id`.
    pub const PROFILES: &str = "profiles";

    /// Credit transactions, keyed by `transaction_id` (ULID).
    pub const TRANSACTIONS: &str = "transactions";

    /// Index: transactions by user, keyed by `user_id || transaction_id`.
    /// Value is empty (index only).
    pub const TRANSACTIONS_BY_USER: &str = "transactions_by_user";

    /// Usage sessions, keyed by `session_id`.
    pub const SESSIONS: &str = "sessions";

    /// Exclusivity index: at most one entry per user, keyed by `user_id`,
    /// value = the open session's ID. Presence of an entry is what makes a
    /// concurrent start lose.
    pub const OPEN_SESSIONS: &str = "open_sessions";

    /// Fields (venues), keyed by `field_id`.
    pub const FIELDS: &str = "fields";

    /// Players, keyed by `player_id`.
    pub const PLAYERS: &str = "players";

    /// Index: players by field, keyed by `field_id || player_id`.
    pub const PLAYERS_BY_FIELD: &str = "players_by_field";

    /// Game events, keyed by `event_id` (ULID).
    pub const EVENTS: &str = "events";

    /// Index: events by player, keyed by `player_id || event_id`.
    pub const EVENTS_BY_PLAYER: &str = "events_by_player";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::PROFILES,
        cf::TRANSACTIONS,
        cf::TRANSACTIONS_BY_USER,
        cf::SESSIONS,
        cf::OPEN_SESSIONS,
        cf::FIELDS,
        cf::PLAYERS,
        cf::PLAYERS_BY_FIELD,
        cf::EVENTS,
        cf::EVENTS_BY_PLAYER,
    ]
}
