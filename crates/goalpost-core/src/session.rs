//! Usage session types and the elapsed-time charge policy.
//!
//! A session is a single timed, billable period of event-logging access. It
//! is created `Open` and transitions to `Closed` exactly once; the terminal
//! fields (`ended_at`, `minutes_used`, `credits_charged`) are fixed at that
//! point and never rewritten. At most one `Open` session exists per user.
//!
//! # Charge policy
//!
//! Elapsed time converts to billable minutes by **flooring to the minute,
//! with a minimum charge of 1 minute if any time at all elapsed**. The charge
//! is then clamped to the user's available balance: a session never drives a
//! balance negative, and it closes even when the user ran out of credit
//! mid-session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{SessionId, UserId};

/// Minimum balance (in minutes) required to start a session.
pub const MIN_START_BALANCE_MINUTES: i64 = 1;

/// Status of a usage session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// The session is running and accrues charge.
    Open,

    /// Terminal. The billing fields are fixed.
    Closed,
}

/// A credit-metered usage session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageSession {
    /// Unique session ID.
    pub id: SessionId,

    /// The user the session belongs to.
    pub user_id: UserId,

    /// When the session was started (server-authoritative).
    pub started_at: DateTime<Utc>,

    /// When the session was stopped. Absent while open.
    pub ended_at: Option<DateTime<Utc>>,

    /// Billable minutes at stop time, before clamping. Absent while open.
    pub minutes_used: Option<i64>,

    /// Minutes actually charged (clamped to balance). Absent while open.
    pub credits_charged: Option<i64>,

    /// Current status.
    pub status: SessionStatus,
}

impl UsageSession {
    /// Create a new open session starting at `now`.
    #[must_use]
    pub fn open(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::generate(),
            user_id,
            started_at: now,
            ended_at: None,
            minutes_used: None,
            credits_charged: None,
            status: SessionStatus::Open,
        }
    }

    /// Whether the session is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    /// Whole minutes elapsed since the session started, for display.
    #[must_use]
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> i64 {
        (now - self.started_at).num_minutes().max(0)
    }

    /// Fix the terminal fields. Must only be called once, on an open session.
    pub fn close(&mut self, now: DateTime<Utc>, minutes_used: i64, credits_charged: i64) {
        self.ended_at = Some(now);
        self.minutes_used = Some(minutes_used);
        self.credits_charged = Some(credits_charged);
        self.status = SessionStatus::Closed;
    }
}

/// Billable minutes for the span `started_at..now`: floor to the minute, with
/// a minimum of 1 if any time elapsed. Zero only for a zero-length span.
#[must_use]
pub fn billable_minutes(started_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let elapsed_secs = (now - started_at).num_seconds().max(0);
    if elapsed_secs == 0 {
        return 0;
    }
    (elapsed_secs / 60).max(1)
}

/// Clamp a charge to the available balance. The session still closes when the
/// balance cannot cover the elapsed time; the shortfall is simply not billed.
#[must_use]
pub fn clamped_charge(minutes_used: i64, balance_minutes: i64) -> i64 {
    minutes_used.min(balance_minutes).max(0)
}

/// Result of stopping a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopReceipt {
    /// The session that was closed.
    pub session_id: SessionId,

    /// Billable minutes, before clamping.
    pub minutes_used: i64,

    /// Minutes actually charged.
    pub credits_charged: i64,

    /// Balance after the charge.
    pub new_balance_minutes: i64,
}

/// One row of the administrative open-sessions view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenSessionRow {
    /// The open session.
    pub session: UsageSession,

    /// Owner's username.
    pub username: String,

    /// Owner's email.
    pub email: String,

    /// Minutes elapsed at the time the view was produced.
    pub elapsed_minutes: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn billable_minutes_floors() {
        let start = Utc::now();
        assert_eq!(billable_minutes(start, start + Duration::seconds(420)), 7);
        assert_eq!(billable_minutes(start, start + Duration::seconds(419)), 6);
        assert_eq!(billable_minutes(start, start + Duration::seconds(60)), 1);
    }

    #[test]
    fn billable_minutes_minimum_one_if_any_time_elapsed() {
        let start = Utc::now();
        assert_eq!(billable_minutes(start, start + Duration::seconds(1)), 1);
        assert_eq!(billable_minutes(start, start + Duration::seconds(59)), 1);
    }

    #[test]
    fn billable_minutes_zero_span() {
        let start = Utc::now();
        assert_eq!(billable_minutes(start, start), 0);
        // Clock drift: a stop timestamp before the start charges nothing.
        assert_eq!(billable_minutes(start, start - Duration::seconds(30)), 0);
    }

    #[test]
    fn charge_is_clamped_to_balance() {
        assert_eq!(clamped_charge(7, 5), 5);
        assert_eq!(clamped_charge(3, 5), 3);
        assert_eq!(clamped_charge(7, 0), 0);
        assert_eq!(clamped_charge(0, 5), 0);
    }

    #[test]
    fn close_fixes_terminal_fields() {
        let now = Utc::now();
        let mut session = UsageSession::open(UserId::generate(), now);
        assert!(session.is_open());

        let stop = now + Duration::seconds(420);
        session.close(stop, 7, 5);

        assert_eq!(session.status, SessionStatus::Closed);
        assert_eq!(session.ended_at, Some(stop));
        assert_eq!(session.minutes_used, Some(7));
        assert_eq!(session.credits_charged, Some(5));
    }
}
