//! Pure per-player stats aggregation over the game-event log.
//!
//! `aggregate` is a deterministic function of (events, window): no state, no
//! clock, restartable. A player appears in the output only if they have at
//! least one event inside the window; output order is the order of first
//! appearance in the event log, and sorting is stable so ties keep that
//! order.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EventKind, GameEvent, PlayerId};

/// A half-open time window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatWindow {
    /// Inclusive start.
    pub start: DateTime<Utc>,

    /// Exclusive end.
    pub end: DateTime<Utc>,
}

impl StatWindow {
    /// Create a window from explicit bounds.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whether `timestamp` falls inside the window.
    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp < self.end
    }

    /// The calendar day containing `at`.
    #[must_use]
    pub fn day_of(at: DateTime<Utc>) -> Self {
        let start = at.date_naive().and_time(NaiveTime::MIN).and_utc();
        Self::new(start, start + chrono::Duration::days(1))
    }

    /// The calendar month containing `at`.
    #[must_use]
    pub fn month_of(at: DateTime<Utc>) -> Self {
        let date = at.date_naive();
        let first = date.with_day(1).unwrap_or(date);
        let (next_year, next_month) = if first.month() == 12 {
            (first.year() + 1, 1)
        } else {
            (first.year(), first.month() + 1)
        };
        let next_first = NaiveDate::from_ymd_opt(next_year, next_month, 1).unwrap_or(first);
        Self::new(
            first.and_time(NaiveTime::MIN).and_utc(),
            next_first.and_time(NaiveTime::MIN).and_utc(),
        )
    }

    /// The calendar year containing `at`.
    #[must_use]
    pub fn year_of(at: DateTime<Utc>) -> Self {
        let date = at.date_naive();
        let first = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
        let next_first = NaiveDate::from_ymd_opt(date.year() + 1, 1, 1).unwrap_or(first);
        Self::new(
            first.and_time(NaiveTime::MIN).and_utc(),
            next_first.and_time(NaiveTime::MIN).and_utc(),
        )
    }
}

/// The metric a caller sorts the stats table by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatMetric {
    /// Goals scored.
    Goals,

    /// Assists.
    Assists,

    /// Goalkeeper saves.
    Saves,

    /// Fouls committed.
    Fouls,
}

/// Sort direction for the stats table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Smallest first.
    Ascending,

    /// Largest first (default for display).
    Descending,
}

/// Per-player counts within a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
    /// The player.
    pub player_id: PlayerId,

    /// Goals in the window.
    pub goals: u32,

    /// Assists in the window.
    pub assists: u32,

    /// Saves in the window.
    pub saves: u32,

    /// Fouls in the window.
    pub fouls: u32,
}

impl StatLine {
    fn empty(player_id: PlayerId) -> Self {
        Self {
            player_id,
            goals: 0,
            assists: 0,
            saves: 0,
            fouls: 0,
        }
    }

    /// The count for a given metric.
    #[must_use]
    pub const fn get(&self, metric: StatMetric) -> u32 {
        match metric {
            StatMetric::Goals => self.goals,
            StatMetric::Assists => self.assists,
            StatMetric::Saves => self.saves,
            StatMetric::Fouls => self.fouls,
        }
    }

    fn bump(&mut self, kind: EventKind) {
        match kind {
            EventKind::Goal => self.goals += 1,
            EventKind::Assist => self.assists += 1,
            EventKind::Save => self.saves += 1,
            EventKind::Foul => self.fouls += 1,
        }
    }
}

/// Count events per player within `window`, in order of first appearance.
#[must_use]
pub fn aggregate(events: &[GameEvent], window: StatWindow) -> Vec<StatLine> {
    let mut lines: Vec<StatLine> = Vec::new();
    let mut index: HashMap<PlayerId, usize> = HashMap::new();

    for event in events {
        if !window.contains(event.timestamp) {
            continue;
        }
        let slot = *index.entry(event.player_id).or_insert_with(|| {
            lines.push(StatLine::empty(event.player_id));
            lines.len() - 1
        });
        lines[slot].bump(event.kind);
    }

    lines
}

/// Aggregate and sort by `metric`. The sort is stable, so players tied on the
/// metric keep their first-appearance order.
#[must_use]
pub fn rank(
    events: &[GameEvent],
    window: StatWindow,
    metric: StatMetric,
    order: SortOrder,
) -> Vec<StatLine> {
    let mut lines = aggregate(events, window);
    match order {
        SortOrder::Descending => lines.sort_by(|a, b| b.get(metric).cmp(&a.get(metric))),
        SortOrder::Ascending => lines.sort_by(|a, b| a.get(metric).cmp(&b.get(metric))),
    }
    lines
}
