//! Core types for goalpost.
//!
//! This crate provides the foundational types used throughout the goalpost
//! platform:
//!
//! - **Identifiers**: `UserId`, `SessionId`, `TransactionId`, `FieldId`,
//!   `PlayerId`, `EventId`
//! - **Profiles**: `UserProfile`
//! - **Credits**: `CreditTransaction`, `TransactionKind`
//! - **Sessions**: `UsageSession`, `SessionStatus`, charge policy
//! - **Game entities**: `Field`, `Player`, `GameEvent`
//! - **Stats**: window-filtered per-player aggregation
//!
//! # Credit Unit
//!
//! **1 credit = 1 minute of open session time.**
//!
//! Balances and transaction amounts are stored as `i64` minutes. Balance is
//! mutated only through ledger transactions; it is a cached projection of the
//! transaction history, never an independently-editable field.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod credits;
pub mod game;
pub mod ids;
pub mod profile;
pub mod session;
pub mod stats;

pub use credits::{CreditTransaction, TransactionKind};
pub use game::{EventKind, Field, GameEvent, Player, PlayerRole};
pub use ids::{EventId, FieldId, IdError, PlayerId, SessionId, TransactionId, UserId};
pub use profile::UserProfile;
pub use session::{
    billable_minutes, clamped_charge, OpenSessionRow, SessionStatus, StopReceipt, UsageSession,
    MIN_START_BALANCE_MINUTES,
};
pub use stats::{aggregate, rank, SortOrder, StatLine, StatMetric, StatWindow};
