//! In-game event logging, gated by an open session.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use goalpost_core::{EventKind, FieldId, GameEvent, PlayerId, UserId};
use goalpost_store::{Store, StoreError};

use crate::error::{EngineError, Result};

/// Records and removes in-game events.
///
/// Logging is metered: recording requires the calling user to hold an open
/// session. Reading and undo are not gated.
pub struct EventLog {
    store: Arc<dyn Store>,
}

impl EventLog {
    /// Create an event log over the shared store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Record an event for a player on behalf of `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoOpenSession`] if the user has no open
    /// session, [`EngineError::PlayerInactive`] for deactivated players, and
    /// [`StoreError::NotFound`] for unknown players.
    pub fn record(
        &self,
        user_id: &UserId,
        player_id: &PlayerId,
        kind: EventKind,
        now: DateTime<Utc>,
    ) -> Result<GameEvent> {
        self.store
            .open_session_for(user_id)?
            .ok_or(EngineError::NoOpenSession { user_id: *user_id })?;

        let player = self
            .store
            .get_player(player_id)?
            .ok_or(StoreError::NotFound {
                entity: "player",
                id: player_id.to_string(),
            })?;
        if !player.active {
            return Err(EngineError::PlayerInactive);
        }

        let event = GameEvent::new(*player_id, kind, now);
        self.store.put_event(&event)?;

        tracing::debug!(player_id = %player_id, kind = ?kind, "event recorded");
        Ok(event)
    }

    /// A player's events, oldest first.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub fn for_player(&self, player_id: &PlayerId) -> Result<Vec<GameEvent>> {
        Ok(self.store.list_events_by_player(player_id)?)
    }

    /// Remove the most recently recorded event on the field.
    ///
    /// "Most recent" is by recording order (event IDs are time-ordered), not
    /// by the event's own timestamp, so a corrected backfill undoes cleanly.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NothingToUndo`] when no events exist for any
    /// of the field's players.
    pub fn undo_last(&self, field_id: &FieldId) -> Result<GameEvent> {
        let mut latest: Option<GameEvent> = None;
        for player in self.store.list_players_by_field(field_id)? {
            if let Some(event) = self.store.list_events_by_player(&player.id)?.pop() {
                match &latest {
                    Some(current) if current.id >= event.id => {}
                    _ => latest = Some(event),
                }
            }
        }

        let event = latest.ok_or(EngineError::NothingToUndo {
            field_id: *field_id,
        })?;
        self.store.delete_event(&event.id)?;

        tracing::info!(field_id = %field_id, event_id = %event.id, "last event undone");
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goalpost_core::{Field, Player, PlayerRole, UserProfile};
    use goalpost_store::RocksStore;
    use tempfile::TempDir;

    struct Fixture {
        log: EventLog,
        store: Arc<RocksStore>,
        user_id: UserId,
        field_id: FieldId,
        player_id: PlayerId,
        _dir: TempDir,
    }

    fn fixture() -> Fixture {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RocksStore::open(dir.path()).unwrap());

        let user_id = UserId::generate();
        let mut profile = UserProfile::new(user_id, "coach".into(), "c@example.com".into());
        profile.balance_minutes = 30;
        store.put_profile(&profile).unwrap();

        let field = Field::new("fld1", "Test pitch".into());
        store.put_field(&field).unwrap();
        let player = Player::new(field.id, "Sam".into(), vec![PlayerRole::Outfield]);
        store.put_player(&player).unwrap();

        Fixture {
            log: EventLog::new(store.clone()),
            store,
            user_id,
            field_id: field.id,
            player_id: player.id,
            _dir: dir,
        }
    }

    #[test]
    fn recording_requires_open_session() {
        let fx = fixture();
        let result = fx
            .log
            .record(&fx.user_id, &fx.player_id, EventKind::Goal, Utc::now());
        assert!(matches!(result, Err(EngineError::NoOpenSession { .. })));
    }

    #[test]
    fn recording_with_open_session() {
        let fx = fixture();
        fx.store.start_session(&fx.user_id, Utc::now()).unwrap();

        let event = fx
            .log
            .record(&fx.user_id, &fx.player_id, EventKind::Goal, Utc::now())
            .unwrap();
        assert_eq!(event.kind, EventKind::Goal);
        assert_eq!(fx.log.for_player(&fx.player_id).unwrap().len(), 1);
    }

    #[test]
    fn recording_against_inactive_player() {
        let fx = fixture();
        fx.store.start_session(&fx.user_id, Utc::now()).unwrap();
        fx.store.set_player_active(&fx.player_id, false).unwrap();

        let result = fx
            .log
            .record(&fx.user_id, &fx.player_id, EventKind::Save, Utc::now());
        assert!(matches!(result, Err(EngineError::PlayerInactive)));
    }

    #[test]
    fn undo_removes_most_recent_event_on_field() {
        let fx = fixture();
        fx.store.start_session(&fx.user_id, Utc::now()).unwrap();

        let second_player = Player::new(fx.field_id, "Alex".into(), vec![PlayerRole::Outfield]);
        fx.store.put_player(&second_player).unwrap();

        fx.log
            .record(&fx.user_id, &fx.player_id, EventKind::Goal, Utc::now())
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let last = fx
            .log
            .record(&fx.user_id, &second_player.id, EventKind::Foul, Utc::now())
            .unwrap();

        let undone = fx.log.undo_last(&fx.field_id).unwrap();
        assert_eq!(undone.id, last.id);
        assert!(fx.log.for_player(&second_player.id).unwrap().is_empty());
        assert_eq!(fx.log.for_player(&fx.player_id).unwrap().len(), 1);
    }

    #[test]
    fn undo_on_empty_field() {
        let fx = fixture();
        let result = fx.log.undo_last(&fx.field_id);
        assert!(matches!(result, Err(EngineError::NothingToUndo { .. })));
    }
}
