//! Session lifecycle: start, stop, adoption, and the admin escape hatch.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use goalpost_core::{OpenSessionRow, SessionId, StopReceipt, UsageSession, UserId};
use goalpost_store::{Store, StoreError};

use crate::error::{EngineError, Result};

/// Outcome of a start request.
///
/// A start that finds the user already in a session does not fail: it adopts
/// the existing session so a user with two devices (or a retried request)
/// converges on the single open session instead of erroring.
#[derive(Debug, Clone)]
pub enum StartOutcome {
    /// A fresh session was opened.
    Started(UsageSession),

    /// The user already had an open session; it is returned as-is.
    Adopted(UsageSession),
}

impl StartOutcome {
    /// The session regardless of how it was obtained.
    #[must_use]
    pub fn session(&self) -> &UsageSession {
        match self {
            Self::Started(s) | Self::Adopted(s) => s,
        }
    }

    /// Whether this start adopted an existing session.
    #[must_use]
    pub fn adopted(&self) -> bool {
        matches!(self, Self::Adopted(_))
    }
}

/// Runs the metered session lifecycle over the shared store.
pub struct SessionManager {
    store: Arc<dyn Store>,
}

impl SessionManager {
    /// Create a manager over the shared store.
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Start a session for the user, adopting an existing open one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InsufficientBalance`] when the balance is below
    /// the start threshold, [`StoreError::NotFound`] for unknown users.
    pub fn start(&self, user_id: &UserId, now: DateTime<Utc>) -> Result<StartOutcome> {
        match self.store.start_session(user_id, now) {
            Ok(session) => {
                tracing::info!(user_id = %user_id, session_id = %session.id, "session started");
                Ok(StartOutcome::Started(session))
            }
            Err(StoreError::AlreadyOpen { session_id }) => {
                // Lost the race (or the user double-tapped): converge on the
                // winning session instead of surfacing a conflict.
                let session =
                    self.store
                        .get_session(&session_id)?
                        .ok_or(StoreError::NotFound {
                            entity: "session",
                            id: session_id.to_string(),
                        })?;
                tracing::info!(
                    user_id = %user_id,
                    session_id = %session.id,
                    "adopted existing open session"
                );
                Ok(StartOutcome::Adopted(session))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Stop a session, charging elapsed minutes clamped to the balance.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyClosed`] if the session was already
    /// stopped and [`StoreError::NotFound`] for unknown sessions.
    pub fn stop(&self, session_id: &SessionId, now: DateTime<Utc>) -> Result<StopReceipt> {
        let receipt = self.store.stop_session(session_id, now)?;
        tracing::info!(
            session_id = %session_id,
            minutes_used = receipt.minutes_used,
            credits_charged = receipt.credits_charged,
            "session stopped"
        );
        Ok(receipt)
    }

    /// Admin escape hatch: remove a stuck session without any charge.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown sessions.
    pub fn admin_delete(&self, session_id: &SessionId) -> Result<()> {
        self.store.delete_session(session_id)?;
        tracing::warn!(session_id = %session_id, "session removed by admin, no charge applied");
        Ok(())
    }

    /// All currently open sessions with owner details, oldest start first.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub fn open_sessions(&self, now: DateTime<Utc>) -> Result<Vec<OpenSessionRow>> {
        Ok(self.store.list_open_sessions(now)?)
    }

    /// The user's open session, if any.
    ///
    /// # Errors
    ///
    /// Propagates storage errors.
    pub fn open_session(&self, user_id: &UserId) -> Result<Option<UsageSession>> {
        Ok(self.store.open_session_for(user_id)?)
    }

    /// The user's open session, required.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoOpenSession`] when the user has none.
    pub fn require_open(&self, user_id: &UserId) -> Result<UsageSession> {
        self.store
            .open_session_for(user_id)?
            .ok_or(EngineError::NoOpenSession { user_id: *user_id })
    }

    /// Look up a session by ID.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for unknown sessions.
    pub fn get(&self, session_id: &SessionId) -> Result<UsageSession> {
        self.store
            .get_session(session_id)?
            .ok_or(EngineError::Store(StoreError::NotFound {
                entity: "session",
                id: session_id.to_string(),
            }))
    }
}
