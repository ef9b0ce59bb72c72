//! Field and player management, plus per-field stat queries.

use std::sync::Arc;

use goalpost_core::{
    rank, Field, FieldId, GameEvent, Player, PlayerId, PlayerRole, SortOrder, StatLine,
    StatMetric, StatWindow,
};
use goalpost_store::{Store, StoreError};

use crate::error::Result;

/// Manages fields and their player rosters.
pub struct Roster {
    store: Arc<dyn Store>,
}

impl Roster {
    /// Create a roster over the shared store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Register a new field. The code is normalized to uppercase.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub fn create_field(&self, code: &str, description: String) -> Result<Field> {
        let field = Field::new(code, description);
        self.store.put_field(&field)?;
        tracing::info!(field_id = %field.id, code = %field.code, "field created");
        Ok(field)
    }

    /// Look up a field by ID.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown fields.
    pub fn get_field(&self, field_id: &FieldId) -> Result<Field> {
        self.store
            .get_field(field_id)?
            .ok_or_else(|| not_found("field", field_id.to_string()))
    }

    /// Search fields by exact code or description substring.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub fn find_fields(&self, query: &str, limit: usize) -> Result<Vec<Field>> {
        Ok(self.store.find_fields(query, limit)?)
    }

    /// Delete a field and everything under it, children first: each
    /// player's events, then the players, then the field itself.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown fields.
    pub fn delete_field(&self, field_id: &FieldId) -> Result<()> {
        // Existence check up front so a bad ID fails before any child delete.
        self.get_field(field_id)?;

        for player in self.store.list_players_by_field(field_id)? {
            self.store.delete_events_by_player(&player.id)?;
            self.store.delete_player(&player.id)?;
        }
        self.store.delete_field(field_id)?;

        tracing::info!(field_id = %field_id, "field deleted with roster and events");
        Ok(())
    }

    /// Register a new player on a field.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown fields.
    pub fn add_player(
        &self,
        field_id: &FieldId,
        name: String,
        roles: Vec<PlayerRole>,
    ) -> Result<Player> {
        self.get_field(field_id)?;

        let player = Player::new(*field_id, name, roles);
        self.store.put_player(&player)?;
        tracing::info!(player_id = %player.id, field_id = %field_id, "player added");
        Ok(player)
    }

    /// Look up a player by ID.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown players.
    pub fn get_player(&self, player_id: &PlayerId) -> Result<Player> {
        self.store
            .get_player(player_id)?
            .ok_or_else(|| not_found("player", player_id.to_string()))
    }

    /// A field's players, in registration order.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub fn players(&self, field_id: &FieldId) -> Result<Vec<Player>> {
        Ok(self.store.list_players_by_field(field_id)?)
    }

    /// Activate or deactivate a player, keeping their history.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown players.
    pub fn set_player_active(&self, player_id: &PlayerId, active: bool) -> Result<Player> {
        let player = self.store.set_player_active(player_id, active)?;
        tracing::info!(player_id = %player_id, active, "player activation changed");
        Ok(player)
    }

    /// Delete a player, events first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown players.
    pub fn delete_player(&self, player_id: &PlayerId) -> Result<()> {
        let removed = self.store.delete_events_by_player(player_id)?;
        self.store.delete_player(player_id)?;
        tracing::info!(player_id = %player_id, events_removed = removed, "player deleted");
        Ok(())
    }

    /// Ranked stat lines for a field's players within a window.
    ///
    /// Ties keep first-appearance order, so the output is stable across
    /// repeated calls.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown fields.
    pub fn field_stats(
        &self,
        field_id: &FieldId,
        window: StatWindow,
        metric: StatMetric,
        order: SortOrder,
    ) -> Result<Vec<StatLine>> {
        self.get_field(field_id)?;

        let mut events: Vec<GameEvent> = Vec::new();
        for player in self.store.list_players_by_field(field_id)? {
            events.extend(self.store.list_events_by_player(&player.id)?);
        }

        Ok(rank(&events, window, metric, order))
    }
}

fn not_found(entity: &'static str, id: String) -> crate::EngineError {
    StoreError::NotFound { entity, id }.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use goalpost_core::{EventKind, UserId, UserProfile};
    use goalpost_store::RocksStore;
    use tempfile::TempDir;

    fn create_roster() -> (Roster, Arc<RocksStore>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(RocksStore::open(dir.path()).unwrap());
        (Roster::new(store.clone()), store, dir)
    }

    #[test]
    fn add_player_requires_field() {
        let (roster, _store, _dir) = create_roster();
        let result = roster.add_player(
            &FieldId::generate(),
            "Sam".into(),
            vec![PlayerRole::Outfield],
        );
        assert!(matches!(result, Err(crate::EngineError::Store(_))));
    }

    #[test]
    fn field_delete_cascades_children_first() {
        let (roster, store, _dir) = create_roster();

        let user_id = UserId::generate();
        let mut profile = UserProfile::new(user_id, "coach".into(), "c@example.com".into());
        profile.balance_minutes = 10;
        store.put_profile(&profile).unwrap();
        store.start_session(&user_id, Utc::now()).unwrap();

        let field = roster.create_field("ab1", "Pitch".into()).unwrap();
        let player = roster
            .add_player(&field.id, "Sam".into(), vec![PlayerRole::Goalkeeper])
            .unwrap();
        let log = crate::EventLog::new(store.clone());
        log.record(&user_id, &player.id, EventKind::Save, Utc::now())
            .unwrap();

        roster.delete_field(&field.id).unwrap();

        assert!(matches!(roster.get_field(&field.id), Err(_)));
        assert!(store.get_player(&player.id).unwrap().is_none());
        assert!(store.list_events_by_player(&player.id).unwrap().is_empty());
    }

    #[test]
    fn field_stats_rank_by_metric() {
        let (roster, store, _dir) = create_roster();

        let field = roster.create_field("fs1", "Stats pitch".into()).unwrap();
        let p1 = roster
            .add_player(&field.id, "Sam".into(), vec![PlayerRole::Outfield])
            .unwrap();
        let p2 = roster
            .add_player(&field.id, "Alex".into(), vec![PlayerRole::Outfield])
            .unwrap();

        let t0 = Utc::now();
        for _ in 0..2 {
            store
                .put_event(&GameEvent::new(p1.id, EventKind::Goal, t0))
                .unwrap();
        }
        store
            .put_event(&GameEvent::new(p2.id, EventKind::Goal, t0))
            .unwrap();

        let window = StatWindow::new(t0 - Duration::hours(1), t0 + Duration::hours(1));
        let lines = roster
            .field_stats(&field.id, window, StatMetric::Goals, SortOrder::Descending)
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].player_id, p1.id);
        assert_eq!(lines[0].goals, 2);
        assert_eq!(lines[1].goals, 1);
    }
}
