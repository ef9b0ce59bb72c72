//! Application state.

use std::sync::Arc;

use goalpost_engine::{CreditLedger, EventLog, Roster, SessionManager};
use goalpost_store::Store;

use crate::config::ServiceConfig;

/// Application state shared across handlers.
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Credit ledger operations.
    pub ledger: CreditLedger,

    /// Session lifecycle operations.
    pub sessions: SessionManager,

    /// In-game event logging.
    pub events: EventLog,

    /// Field and player management.
    pub roster: Roster,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state over a shared store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        Self {
            ledger: CreditLedger::new(store.clone()),
            sessions: SessionManager::new(store.clone()),
            events: EventLog::new(store.clone()),
            roster: Roster::new(store.clone()),
            store,
            config,
        }
    }
}
