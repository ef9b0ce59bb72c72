//! Game entities: fields, players, and in-game events.
//!
//! These are simple owned records: a `Field` (venue) owns `Player`s, and a
//! `Player` accumulates `GameEvent`s. Event logging is gated by the session
//! lifecycle (no open session means logging is refused), but the types
//! themselves carry no session state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EventId, FieldId, PlayerId};

/// A registered venue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    /// Unique field ID.
    pub id: FieldId,

    /// Short lookup code, stored uppercase.
    pub code: String,

    /// Free-form description.
    pub description: String,

    /// When the field was registered.
    pub created_at: DateTime<Utc>,
}

impl Field {
    /// Register a new field. The code is normalized to uppercase.
    #[must_use]
    pub fn new(code: &str, description: String) -> Self {
        Self {
            id: FieldId::generate(),
            code: code.to_uppercase(),
            description,
            created_at: Utc::now(),
        }
    }
}

/// A player's role on the pitch. Goalkeepers additionally accumulate saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerRole {
    /// Goalkeeper.
    Goalkeeper,

    /// Outfield player.
    Outfield,
}

/// A player registered to a field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Unique player ID.
    pub id: PlayerId,

    /// The field this player belongs to.
    pub field_id: FieldId,

    /// Display name.
    pub name: String,

    /// Roles; a player can be both a goalkeeper and an outfield player.
    pub roles: Vec<PlayerRole>,

    /// Inactive players are kept for history but hidden from live logging.
    pub active: bool,

    /// When the player was registered.
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Register a new active player on a field.
    #[must_use]
    pub fn new(field_id: FieldId, name: String, roles: Vec<PlayerRole>) -> Self {
        Self {
            id: PlayerId::generate(),
            field_id,
            name,
            roles,
            active: true,
            created_at: Utc::now(),
        }
    }

    /// Whether this player plays in goal.
    #[must_use]
    pub fn is_goalkeeper(&self) -> bool {
        self.roles.contains(&PlayerRole::Goalkeeper)
    }
}

/// Kind of in-game event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A goal scored.
    Goal,

    /// An assist.
    Assist,

    /// A goalkeeper save.
    Save,

    /// A foul committed.
    Foul,
}

/// A single logged in-game event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameEvent {
    /// Unique event ID (ULID, time-ordered).
    pub id: EventId,

    /// The player the event is attributed to.
    pub player_id: PlayerId,

    /// What happened.
    pub kind: EventKind,

    /// When it happened.
    pub timestamp: DateTime<Utc>,
}

impl GameEvent {
    /// Record a new event at `timestamp`.
    #[must_use]
    pub fn new(player_id: PlayerId, kind: EventKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: EventId::generate(),
            player_id,
            kind,
            timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_code_uppercased() {
        let field = Field::new("abc1", "North pitch".into());
        assert_eq!(field.code, "ABC1");
    }

    #[test]
    fn goalkeeper_detection() {
        let field_id = FieldId::generate();
        let gk = Player::new(field_id, "Sam".into(), vec![PlayerRole::Goalkeeper]);
        let out = Player::new(field_id, "Alex".into(), vec![PlayerRole::Outfield]);
        let both = Player::new(
            field_id,
            "Robin".into(),
            vec![PlayerRole::Goalkeeper, PlayerRole::Outfield],
        );

        assert!(gk.is_goalkeeper());
        assert!(!out.is_goalkeeper());
        assert!(both.is_goalkeeper());
    }

    #[test]
    fn new_player_is_active() {
        let player = Player::new(FieldId::generate(), "Sam".into(), vec![PlayerRole::Outfield]);
        assert!(player.active);
    }
}
