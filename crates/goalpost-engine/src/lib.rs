//! Domain operations for goalpost.
//!
//! Each struct here wraps the shared [`Store`](goalpost_store::Store) and
//! enforces one slice of the business rules:
//!
//! - [`CreditLedger`] validates and applies balance mutations
//! - [`SessionManager`] runs the start/stop lifecycle, including the
//!   adopt-existing fallback for racing starts
//! - [`EventLog`] records in-game events, gated by an open session
//! - [`Roster`] manages fields and players, with ordered cascade deletes
//!
//! All operations that depend on wall-clock time take `now` explicitly so
//! callers (and tests) control the clock.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod events;
mod ledger;
mod lifecycle;
mod roster;

pub use error::{EngineError, Result};
pub use events::EventLog;
pub use ledger::CreditLedger;
pub use lifecycle::{SessionManager, StartOutcome};
pub use roster::Roster;
