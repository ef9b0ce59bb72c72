//! Key encoding utilities for `RocksDB`.
//!
//! All primary keys are the raw 16 bytes of the record's UUID or ULID.
//! Index keys concatenate the owning record's bytes with the owned record's
//! bytes; since ULIDs sort by creation time, per-owner scans come out in
//! chronological order.

use goalpost_core::{EventId, FieldId, PlayerId, SessionId, TransactionId, UserId};

/// Key for a user profile.
#[must_use]
pub fn profile_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Key for a credit transaction.
#[must_use]
pub fn transaction_key(transaction_id: &TransactionId) -> Vec<u8> {
    transaction_id.to_bytes().to_vec()
}

/// Index key `user_id (16) || transaction_id (16)`.
#[must_use]
pub fn user_transaction_key(user_id: &UserId, transaction_id: &TransactionId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(user_id.as_bytes());
    key.extend_from_slice(&transaction_id.to_bytes());
    key
}

/// Prefix for scanning a user's transactions.
#[must_use]
pub fn user_transactions_prefix(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Extract the transaction ID from a `user_id || transaction_id` index key.
///
/// # Panics
///
/// Panics if the key is shorter than 32 bytes.
#[must_use]
pub fn transaction_id_from_user_key(key: &[u8]) -> TransactionId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    TransactionId::from_bytes(bytes)
}

/// Key for a usage session.
#[must_use]
pub fn session_key(session_id: &SessionId) -> Vec<u8> {
    session_id.as_bytes().to_vec()
}

/// Key for the open-session exclusivity index (one entry per user).
#[must_use]
pub fn open_session_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}

/// Decode a session ID stored as an index value.
///
/// # Panics
///
/// Panics if the value is shorter than 16 bytes.
#[must_use]
pub fn session_id_from_value(value: &[u8]) -> SessionId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&value[..16]);
    SessionId::from_uuid_bytes(bytes)
}

/// Key for a field.
#[must_use]
pub fn field_key(field_id: &FieldId) -> Vec<u8> {
    field_id.as_bytes().to_vec()
}

/// Key for a player.
#[must_use]
pub fn player_key(player_id: &PlayerId) -> Vec<u8> {
    player_id.as_bytes().to_vec()
}

/// Index key `field_id (16) || player_id (16)`.
#[must_use]
pub fn field_player_key(field_id: &FieldId, player_id: &PlayerId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(field_id.as_bytes());
    key.extend_from_slice(player_id.as_bytes());
    key
}

/// Prefix for scanning a field's players.
#[must_use]
pub fn field_players_prefix(field_id: &FieldId) -> Vec<u8> {
    field_id.as_bytes().to_vec()
}

/// Extract the player ID from a `field_id || player_id` index key.
///
/// # Panics
///
/// Panics if the key is shorter than 32 bytes.
#[must_use]
pub fn player_id_from_field_key(key: &[u8]) -> PlayerId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    PlayerId::from_uuid_bytes(bytes)
}

/// Key for a game event.
#[must_use]
pub fn event_key(event_id: &EventId) -> Vec<u8> {
    event_id.to_bytes().to_vec()
}

/// Index key `player_id (16) || event_id (16)`.
#[must_use]
pub fn player_event_key(player_id: &PlayerId, event_id: &EventId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(player_id.as_bytes());
    key.extend_from_slice(&event_id.to_bytes());
    key
}

/// Prefix for scanning a player's events.
#[must_use]
pub fn player_events_prefix(player_id: &PlayerId) -> Vec<u8> {
    player_id.as_bytes().to_vec()
}

/// Extract the event ID from a `player_id || event_id` index key.
///
/// # Panics
///
/// Panics if the key is shorter than 32 bytes.
#[must_use]
pub fn event_id_from_player_key(key: &[u8]) -> EventId {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&key[16..32]);
    EventId::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_keys_are_16_bytes() {
        assert_eq!(profile_key(&UserId::generate()).len(), 16);
        assert_eq!(session_key(&SessionId::generate()).len(), 16);
        assert_eq!(event_key(&EventId::generate()).len(), 16);
    }

    #[test]
    fn user_transaction_key_format() {
        let user_id = UserId::generate();
        let tx_id = TransactionId::generate();
        let key = user_transaction_key(&user_id, &tx_id);

        assert_eq!(key.len(), 32);
        assert_eq!(&key[..16], user_id.as_bytes());
        assert_eq!(&key[16..], tx_id.to_bytes());
        assert_eq!(transaction_id_from_user_key(&key), tx_id);
    }

    #[test]
    fn session_id_value_roundtrip() {
        let session_id = SessionId::generate();
        let value = session_id.as_bytes().to_vec();
        assert_eq!(session_id_from_value(&value), session_id);
    }

    #[test]
    fn player_event_key_roundtrip() {
        let player_id = PlayerId::generate();
        let event_id = EventId::generate();
        let key = player_event_key(&player_id, &event_id);
        assert_eq!(event_id_from_player_key(&key), event_id);
    }

    #[test]
    fn field_player_key_roundtrip() {
        let field_id = FieldId::generate();
        let player_id = PlayerId::generate();
        let key = field_player_key(&field_id, &player_id);
        assert_eq!(player_id_from_field_key(&key), player_id);
    }
}
