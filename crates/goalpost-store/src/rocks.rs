//! `RocksDB` storage implementation.
//!
//! Compound operations commit a single `WriteBatch` so partially-applied
//! state is impossible, and every check-then-act sequence runs under the
//! store-wide write lock so stale reads cannot race a commit. Plain reads
//! never take the lock.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options, WriteBatch,
};

use goalpost_core::{
    billable_minutes, clamped_charge, CreditTransaction, EventId, Field, FieldId, GameEvent,
    OpenSessionRow, Player, PlayerId, SessionId, StopReceipt, TransactionId, UsageSession, UserId,
    UserProfile, MIN_START_BALANCE_MINUTES,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{LedgerReceipt, Store};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    // Serializes compound check-then-act operations. RocksDB batches are
    // atomic on their own, but the balance check / exclusivity check that
    // precedes a batch must not interleave with another writer's commit.
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Database("write lock poisoned".into()))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        self.db
            .write(batch)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    /// Append a ledger transaction and the updated profile to `batch`.
    fn stage_ledger_write(
        &self,
        batch: &mut WriteBatch,
        profile: &UserProfile,
        transaction: &CreditTransaction,
    ) -> Result<()> {
        let cf_profiles = self.cf(cf::PROFILES)?;
        let cf_tx = self.cf(cf::TRANSACTIONS)?;
        let cf_tx_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;

        batch.put_cf(
            &cf_profiles,
            keys::profile_key(&profile.user_id),
            Self::serialize(profile)?,
        );
        batch.put_cf(
            &cf_tx,
            keys::transaction_key(&transaction.id),
            Self::serialize(transaction)?,
        );
        batch.put_cf(
            &cf_tx_by_user,
            keys::user_transaction_key(&transaction.user_id, &transaction.id),
            [],
        );
        Ok(())
    }

    fn require_profile(&self, user_id: &UserId) -> Result<UserProfile> {
        self.get_profile(user_id)?.ok_or(StoreError::NotFound {
            entity: "profile",
            id: user_id.to_string(),
        })
    }
}

impl Store for RocksStore {
    // =========================================================================
    // Profiles
    // =========================================================================

    fn put_profile(&self, profile: &UserProfile) -> Result<()> {
        let cf = self.cf(cf::PROFILES)?;
        self.db
            .put_cf(
                &cf,
                keys::profile_key(&profile.user_id),
                Self::serialize(profile)?,
            )
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_profile(&self, user_id: &UserId) -> Result<Option<UserProfile>> {
        let cf = self.cf(cf::PROFILES)?;
        self.db
            .get_cf(&cf, keys::profile_key(user_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_profiles(&self) -> Result<Vec<UserProfile>> {
        let cf = self.cf(cf::PROFILES)?;
        let mut profiles = Vec::new();

        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            profiles.push(Self::deserialize::<UserProfile>(&value)?);
        }

        profiles.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(profiles)
    }

    // =========================================================================
    // Ledger
    // =========================================================================

    fn get_transaction(&self, transaction_id: &TransactionId) -> Result<Option<CreditTransaction>> {
        let cf = self.cf(cf::TRANSACTIONS)?;
        self.db
            .get_cf(&cf, keys::transaction_key(transaction_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_transactions_by_user(
        &self,
        user_id: &UserId,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<CreditTransaction>> {
        let cf_by_user = self.cf(cf::TRANSACTIONS_BY_USER)?;
        let prefix = keys::user_transactions_prefix(user_id);

        // ULID keys scan oldest-first; collect and reverse for newest-first.
        let iter = self.db.iterator_cf(
            &cf_by_user,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut all_keys: Vec<Vec<u8>> = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            all_keys.push(key.to_vec());
        }
        all_keys.reverse();

        let mut transactions = Vec::new();
        for key in all_keys.into_iter().skip(offset) {
            if transactions.len() >= limit {
                break;
            }
            let tx_id = keys::transaction_id_from_user_key(&key);
            if let Some(tx) = self.get_transaction(&tx_id)? {
                transactions.push(tx);
            }
        }

        Ok(transactions)
    }

    fn add_credits(
        &self,
        user_id: &UserId,
        amount_minutes: i64,
        description: &str,
        reference: Option<String>,
    ) -> Result<LedgerReceipt> {
        let _guard = self.lock()?;

        let mut profile = self.require_profile(user_id)?;
        profile.balance_minutes += amount_minutes;
        profile.updated_at = Utc::now();

        let transaction = CreditTransaction::purchase(
            *user_id,
            amount_minutes,
            profile.balance_minutes,
            description.to_string(),
            reference,
        );

        let mut batch = WriteBatch::default();
        self.stage_ledger_write(&mut batch, &profile, &transaction)?;
        self.write(batch)?;

        tracing::debug!(
            user_id = %user_id,
            amount_minutes,
            new_balance = profile.balance_minutes,
            "credits added"
        );

        Ok(LedgerReceipt {
            transaction,
            new_balance_minutes: profile.balance_minutes,
        })
    }

    fn consume_credits(
        &self,
        user_id: &UserId,
        amount_minutes: i64,
        description: &str,
        reference: Option<String>,
    ) -> Result<LedgerReceipt> {
        let _guard = self.lock()?;

        let mut profile = self.require_profile(user_id)?;
        if amount_minutes > profile.balance_minutes {
            return Err(StoreError::InsufficientBalance {
                balance: profile.balance_minutes,
                required: amount_minutes,
            });
        }

        profile.balance_minutes -= amount_minutes;
        profile.updated_at = Utc::now();

        let transaction = CreditTransaction::consumption(
            *user_id,
            amount_minutes,
            profile.balance_minutes,
            description.to_string(),
            reference,
        );

        let mut batch = WriteBatch::default();
        self.stage_ledger_write(&mut batch, &profile, &transaction)?;
        self.write(batch)?;

        tracing::debug!(
            user_id = %user_id,
            amount_minutes,
            new_balance = profile.balance_minutes,
            "credits consumed"
        );

        Ok(LedgerReceipt {
            transaction,
            new_balance_minutes: profile.balance_minutes,
        })
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    fn get_session(&self, session_id: &SessionId) -> Result<Option<UsageSession>> {
        let cf = self.cf(cf::SESSIONS)?;
        self.db
            .get_cf(&cf, keys::session_key(session_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn open_session_for(&self, user_id: &UserId) -> Result<Option<UsageSession>> {
        let cf_open = self.cf(cf::OPEN_SESSIONS)?;
        let Some(value) = self
            .db
            .get_cf(&cf_open, keys::open_session_key(user_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
        else {
            return Ok(None);
        };

        self.get_session(&keys::session_id_from_value(&value))
    }

    fn start_session(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<UsageSession> {
        let _guard = self.lock()?;

        let profile = self.require_profile(user_id)?;

        // Exclusivity: the index entry is the source of truth for "already
        // open"; whichever racing start commits it first wins.
        let cf_open = self.cf(cf::OPEN_SESSIONS)?;
        if let Some(value) = self
            .db
            .get_cf(&cf_open, keys::open_session_key(user_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
        {
            return Err(StoreError::AlreadyOpen {
                session_id: keys::session_id_from_value(&value),
            });
        }

        if profile.balance_minutes < MIN_START_BALANCE_MINUTES {
            return Err(StoreError::InsufficientBalance {
                balance: profile.balance_minutes,
                required: MIN_START_BALANCE_MINUTES,
            });
        }

        let session = UsageSession::open(*user_id, now);

        let cf_sessions = self.cf(cf::SESSIONS)?;
        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_sessions,
            keys::session_key(&session.id),
            Self::serialize(&session)?,
        );
        batch.put_cf(
            &cf_open,
            keys::open_session_key(user_id),
            session.id.as_bytes(),
        );
        self.write(batch)?;

        tracing::debug!(user_id = %user_id, session_id = %session.id, "session started");

        Ok(session)
    }

    fn stop_session(&self, session_id: &SessionId, now: DateTime<Utc>) -> Result<StopReceipt> {
        let _guard = self.lock()?;

        let mut session = self.get_session(session_id)?.ok_or(StoreError::NotFound {
            entity: "session",
            id: session_id.to_string(),
        })?;
        if !session.is_open() {
            return Err(StoreError::AlreadyClosed {
                session_id: *session_id,
            });
        }

        let mut profile = self.require_profile(&session.user_id)?;

        let minutes_used = billable_minutes(session.started_at, now);
        let credits_charged = clamped_charge(minutes_used, profile.balance_minutes);

        profile.balance_minutes -= credits_charged;
        profile.updated_at = Utc::now();
        session.close(now, minutes_used, credits_charged);

        let cf_sessions = self.cf(cf::SESSIONS)?;
        let cf_open = self.cf(cf::OPEN_SESSIONS)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_sessions,
            keys::session_key(session_id),
            Self::serialize(&session)?,
        );
        batch.delete_cf(&cf_open, keys::open_session_key(&session.user_id));

        if credits_charged > 0 {
            let transaction = CreditTransaction::consumption(
                session.user_id,
                credits_charged,
                profile.balance_minutes,
                format!("Session charge ({minutes_used} min)"),
                Some(format!("session:{session_id}")),
            );
            self.stage_ledger_write(&mut batch, &profile, &transaction)?;
        } else {
            let cf_profiles = self.cf(cf::PROFILES)?;
            batch.put_cf(
                &cf_profiles,
                keys::profile_key(&profile.user_id),
                Self::serialize(&profile)?,
            );
        }

        self.write(batch)?;

        tracing::debug!(
            session_id = %session_id,
            minutes_used,
            credits_charged,
            new_balance = profile.balance_minutes,
            "session stopped"
        );

        Ok(StopReceipt {
            session_id: *session_id,
            minutes_used,
            credits_charged,
            new_balance_minutes: profile.balance_minutes,
        })
    }

    fn delete_session(&self, session_id: &SessionId) -> Result<()> {
        let _guard = self.lock()?;

        let session = self.get_session(session_id)?.ok_or(StoreError::NotFound {
            entity: "session",
            id: session_id.to_string(),
        })?;

        let cf_sessions = self.cf(cf::SESSIONS)?;
        let cf_open = self.cf(cf::OPEN_SESSIONS)?;

        let mut batch = WriteBatch::default();
        batch.delete_cf(&cf_sessions, keys::session_key(session_id));

        // Remove the exclusivity entry only when it points at this session.
        let open_key = keys::open_session_key(&session.user_id);
        if let Some(value) = self
            .db
            .get_cf(&cf_open, &open_key)
            .map_err(|e| StoreError::Database(e.to_string()))?
        {
            if keys::session_id_from_value(&value) == *session_id {
                batch.delete_cf(&cf_open, &open_key);
            }
        }

        self.write(batch)?;

        tracing::debug!(session_id = %session_id, "session deleted without charge");
        Ok(())
    }

    fn list_open_sessions(&self, now: DateTime<Utc>) -> Result<Vec<OpenSessionRow>> {
        let cf_open = self.cf(cf::OPEN_SESSIONS)?;
        let mut rows = Vec::new();

        for item in self.db.iterator_cf(&cf_open, IteratorMode::Start) {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let session_id = keys::session_id_from_value(&value);

            let Some(session) = self.get_session(&session_id)? else {
                continue;
            };
            let profile = self.require_profile(&session.user_id)?;

            let elapsed_minutes = session.elapsed_minutes(now);
            rows.push(OpenSessionRow {
                session,
                username: profile.username,
                email: profile.email,
                elapsed_minutes,
            });
        }

        rows.sort_by_key(|row| row.session.started_at);
        Ok(rows)
    }

    // =========================================================================
    // Fields & players
    // =========================================================================

    fn put_field(&self, field: &Field) -> Result<()> {
        let cf = self.cf(cf::FIELDS)?;
        self.db
            .put_cf(&cf, keys::field_key(&field.id), Self::serialize(field)?)
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn get_field(&self, field_id: &FieldId) -> Result<Option<Field>> {
        let cf = self.cf(cf::FIELDS)?;
        self.db
            .get_cf(&cf, keys::field_key(field_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn find_fields(&self, query: &str, limit: usize) -> Result<Vec<Field>> {
        let cf = self.cf(cf::FIELDS)?;
        let code = query.to_uppercase();
        let needle = query.to_lowercase();

        let mut fields = Vec::new();
        for item in self.db.iterator_cf(&cf, IteratorMode::Start) {
            if fields.len() >= limit {
                break;
            }
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let field: Field = Self::deserialize(&value)?;
            if field.code == code || field.description.to_lowercase().contains(&needle) {
                fields.push(field);
            }
        }

        Ok(fields)
    }

    fn delete_field(&self, field_id: &FieldId) -> Result<()> {
        if self.get_field(field_id)?.is_none() {
            return Err(StoreError::NotFound {
                entity: "field",
                id: field_id.to_string(),
            });
        }

        let cf = self.cf(cf::FIELDS)?;
        self.db
            .delete_cf(&cf, keys::field_key(field_id))
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn put_player(&self, player: &Player) -> Result<()> {
        let cf_players = self.cf(cf::PLAYERS)?;
        let cf_by_field = self.cf(cf::PLAYERS_BY_FIELD)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(
            &cf_players,
            keys::player_key(&player.id),
            Self::serialize(player)?,
        );
        batch.put_cf(
            &cf_by_field,
            keys::field_player_key(&player.field_id, &player.id),
            [],
        );
        self.write(batch)
    }

    fn get_player(&self, player_id: &PlayerId) -> Result<Option<Player>> {
        let cf = self.cf(cf::PLAYERS)?;
        self.db
            .get_cf(&cf, keys::player_key(player_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_players_by_field(&self, field_id: &FieldId) -> Result<Vec<Player>> {
        let cf_by_field = self.cf(cf::PLAYERS_BY_FIELD)?;
        let prefix = keys::field_players_prefix(field_id);

        let iter = self.db.iterator_cf(
            &cf_by_field,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut players = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            let player_id = keys::player_id_from_field_key(&key);
            if let Some(player) = self.get_player(&player_id)? {
                players.push(player);
            }
        }

        // Player IDs are random UUIDs, so the index scan is unordered.
        players.sort_by_key(|p| p.created_at);
        Ok(players)
    }

    fn set_player_active(&self, player_id: &PlayerId, active: bool) -> Result<Player> {
        let _guard = self.lock()?;

        let mut player = self.get_player(player_id)?.ok_or(StoreError::NotFound {
            entity: "player",
            id: player_id.to_string(),
        })?;
        player.active = active;

        let cf = self.cf(cf::PLAYERS)?;
        self.db
            .put_cf(&cf, keys::player_key(player_id), Self::serialize(&player)?)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(player)
    }

    fn delete_player(&self, player_id: &PlayerId) -> Result<()> {
        let player = self.get_player(player_id)?.ok_or(StoreError::NotFound {
            entity: "player",
            id: player_id.to_string(),
        })?;

        let cf_players = self.cf(cf::PLAYERS)?;
        let cf_by_field = self.cf(cf::PLAYERS_BY_FIELD)?;

        let mut batch = WriteBatch::default();
        batch.delete_cf(&cf_players, keys::player_key(player_id));
        batch.delete_cf(
            &cf_by_field,
            keys::field_player_key(&player.field_id, player_id),
        );
        self.write(batch)
    }

    // =========================================================================
    // Game events
    // =========================================================================

    fn put_event(&self, event: &GameEvent) -> Result<()> {
        let cf_events = self.cf(cf::EVENTS)?;
        let cf_by_player = self.cf(cf::EVENTS_BY_PLAYER)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_events, keys::event_key(&event.id), Self::serialize(event)?);
        batch.put_cf(
            &cf_by_player,
            keys::player_event_key(&event.player_id, &event.id),
            [],
        );
        self.write(batch)
    }

    fn list_events_by_player(&self, player_id: &PlayerId) -> Result<Vec<GameEvent>> {
        let cf_events = self.cf(cf::EVENTS)?;
        let cf_by_player = self.cf(cf::EVENTS_BY_PLAYER)?;
        let prefix = keys::player_events_prefix(player_id);

        let iter = self.db.iterator_cf(
            &cf_by_player,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut events = Vec::new();
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            let event_id = keys::event_id_from_player_key(&key);
            if let Some(data) = self
                .db
                .get_cf(&cf_events, keys::event_key(&event_id))
                .map_err(|e| StoreError::Database(e.to_string()))?
            {
                events.push(Self::deserialize(&data)?);
            }
        }

        Ok(events)
    }

    fn delete_event(&self, event_id: &EventId) -> Result<()> {
        let cf_events = self.cf(cf::EVENTS)?;
        let event: GameEvent = self
            .db
            .get_cf(&cf_events, keys::event_key(event_id))
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()?
            .ok_or(StoreError::NotFound {
                entity: "event",
                id: event_id.to_string(),
            })?;

        let cf_by_player = self.cf(cf::EVENTS_BY_PLAYER)?;
        let mut batch = WriteBatch::default();
        batch.delete_cf(&cf_events, keys::event_key(event_id));
        batch.delete_cf(
            &cf_by_player,
            keys::player_event_key(&event.player_id, event_id),
        );
        self.write(batch)
    }

    fn delete_events_by_player(&self, player_id: &PlayerId) -> Result<usize> {
        let cf_events = self.cf(cf::EVENTS)?;
        let cf_by_player = self.cf(cf::EVENTS_BY_PLAYER)?;
        let prefix = keys::player_events_prefix(player_id);

        let iter = self.db.iterator_cf(
            &cf_by_player,
            IteratorMode::From(&prefix, rocksdb::Direction::Forward),
        );

        let mut batch = WriteBatch::default();
        let mut count = 0;
        for item in iter {
            let (key, _) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            if !key.starts_with(&prefix) {
                break;
            }
            let event_id = keys::event_id_from_player_key(&key);
            batch.delete_cf(&cf_events, keys::event_key(&event_id));
            batch.delete_cf(&cf_by_player, key);
            count += 1;
        }

        self.write(batch)?;
        Ok(count)
    }
}
