//! Local session timer.
//!
//! A cooperative one-second ticking mirror of the running session, for
//! display and proactive low-balance warnings. The timer's value is never
//! the basis for charging: only the server's own start-to-stop computation
//! is authoritative, so an operator editing the clock (or a skewed client
//! clock) cannot change what is billed.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Low-balance warning thresholds, fired at most once per session each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    /// Projected remaining balance dropped below 10 minutes.
    Below10,

    /// Projected remaining balance dropped below 5 minutes.
    Below5,
}

/// Timer run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Not started, or reset.
    Idle,

    /// Advancing one second per tick.
    Running,

    /// Holding its value.
    Paused,
}

/// Local ticking counter for an open session.
pub struct SessionTimer {
    state: TimerState,
    elapsed_secs: u64,
    balance_minutes: i64,
    warned_below_10: bool,
    warned_below_5: bool,
}

impl SessionTimer {
    /// Create an idle timer against the given starting balance.
    #[must_use]
    pub fn new(balance_minutes: i64) -> Self {
        Self {
            state: TimerState::Idle,
            elapsed_secs: 0,
            balance_minutes,
            warned_below_10: false,
            warned_below_5: false,
        }
    }

    /// Current run state.
    #[must_use]
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Elapsed seconds accumulated so far.
    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Elapsed whole minutes, for display.
    #[must_use]
    pub fn elapsed_minutes(&self) -> u64 {
        self.elapsed_secs / 60
    }

    /// Projected remaining balance in minutes if the session stopped now.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn projected_remaining_minutes(&self) -> i64 {
        self.balance_minutes - (self.elapsed_secs / 60) as i64
    }

    /// Begin (or resume) advancing.
    pub fn start(&mut self) {
        self.state = TimerState::Running;
    }

    /// Stop advancing, retaining the current value.
    pub fn pause(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
        }
    }

    /// Zero the value and re-arm both warnings.
    pub fn reset(&mut self) {
        self.state = TimerState::Idle;
        self.elapsed_secs = 0;
        self.warned_below_10 = false;
        self.warned_below_5 = false;
    }

    /// Operator correction: set an absolute minute value, overriding the
    /// accumulated seconds. Warnings are evaluated on the next tick.
    pub fn set_minutes(&mut self, minutes: u64) {
        self.elapsed_secs = minutes * 60;
    }

    /// Advance one second if running and evaluate warning thresholds.
    ///
    /// Each threshold fires at most once per session; when a jump (from
    /// `set_minutes`) crosses both at once, only the more severe fires and
    /// both are considered spent.
    pub fn tick(&mut self) -> Option<Warning> {
        if self.state != TimerState::Running {
            return None;
        }
        self.elapsed_secs += 1;

        let remaining = self.projected_remaining_minutes();
        if remaining < 5 && !self.warned_below_5 {
            self.warned_below_5 = true;
            self.warned_below_10 = true;
            return Some(Warning::Below5);
        }
        if remaining < 10 && !self.warned_below_10 {
            self.warned_below_10 = true;
            return Some(Warning::Below10);
        }
        None
    }
}

/// Spawn the async tick driver for a shared timer.
///
/// Ticks once per second while the timer is running, forwarding warnings on
/// `warnings`. The task exits as soon as the timer leaves the running state,
/// matching the pause/teardown semantics of a display clock. Dropping the
/// returned handle's task (via `abort`) also stops it.
pub fn spawn_driver(
    timer: Arc<Mutex<SessionTimer>>,
    warnings: UnboundedSender<Warning>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // The first tick of a tokio interval fires immediately; skip it so
        // one wall-clock second passes before the first advance.
        interval.tick().await;

        loop {
            interval.tick().await;

            let warning = {
                let Ok(mut timer) = timer.lock() else {
                    return;
                };
                if timer.state() != TimerState::Running {
                    return;
                }
                timer.tick()
            };

            if let Some(warning) = warning {
                if warnings.send(warning).is_err() {
                    return;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_timer_does_not_advance() {
        let mut timer = SessionTimer::new(60);
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.elapsed_secs(), 0);
    }

    #[test]
    fn pause_retains_value_and_reset_zeroes() {
        let mut timer = SessionTimer::new(60);
        timer.start();
        for _ in 0..90 {
            timer.tick();
        }
        assert_eq!(timer.elapsed_minutes(), 1);

        timer.pause();
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.elapsed_secs(), 90);

        timer.reset();
        assert_eq!(timer.elapsed_secs(), 0);
        assert_eq!(timer.state(), TimerState::Idle);
    }

    #[test]
    fn below_10_fires_exactly_once() {
        // Balance 11: remaining drops below 10 after 2 full minutes.
        let mut timer = SessionTimer::new(11);
        timer.start();

        let mut warnings = Vec::new();
        for _ in 0..180 {
            if let Some(w) = timer.tick() {
                warnings.push(w);
            }
        }

        assert_eq!(warnings, vec![Warning::Below10]);
    }

    #[test]
    fn below_5_follows_below_10() {
        let mut timer = SessionTimer::new(11);
        timer.start();

        let mut warnings = Vec::new();
        // 8 minutes: remaining goes 11 -> 3.
        for _ in 0..(8 * 60) {
            if let Some(w) = timer.tick() {
                warnings.push(w);
            }
        }

        assert_eq!(warnings, vec![Warning::Below10, Warning::Below5]);
    }

    #[test]
    fn manual_edit_jump_fires_only_the_severe_warning() {
        let mut timer = SessionTimer::new(20);
        timer.start();

        // Scorer forgot to start the clock: jump straight to 18 minutes.
        timer.set_minutes(18);
        let warning = timer.tick();
        assert_eq!(warning, Some(Warning::Below5));

        // Both thresholds are spent.
        for _ in 0..120 {
            assert_eq!(timer.tick(), None);
        }
    }

    #[test]
    fn reset_rearms_warnings() {
        let mut timer = SessionTimer::new(6);
        timer.start();
        timer.set_minutes(2);
        assert_eq!(timer.tick(), Some(Warning::Below5));

        timer.reset();
        timer.start();
        timer.set_minutes(2);
        assert_eq!(timer.tick(), Some(Warning::Below5));
    }

    #[test]
    fn restart_without_reset_does_not_refire() {
        let mut timer = SessionTimer::new(6);
        timer.start();
        timer.set_minutes(2);
        assert_eq!(timer.tick(), Some(Warning::Below5));

        timer.pause();
        timer.start();
        assert_eq!(timer.tick(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn driver_ticks_on_the_interval_and_stops_on_pause() {
        let timer = Arc::new(Mutex::new(SessionTimer::new(60)));
        timer.lock().unwrap().start();

        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        let handle = spawn_driver(timer.clone(), tx);

        tokio::time::advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        assert!(timer.lock().unwrap().elapsed_secs() >= 4);

        timer.lock().unwrap().pause();
        tokio::time::advance(Duration::from_secs(5)).await;
        handle.await.unwrap();

        // No further advance after the driver exited.
        let elapsed = timer.lock().unwrap().elapsed_secs();
        assert!(elapsed <= 6);
    }

    #[tokio::test(start_paused = true)]
    async fn driver_forwards_warnings() {
        let timer = Arc::new(Mutex::new(SessionTimer::new(10)));
        {
            let mut t = timer.lock().unwrap();
            t.start();
            t.set_minutes(1); // Remaining 9 after the next minute boundary
        }

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let _handle = spawn_driver(timer, tx);

        tokio::time::advance(Duration::from_secs(2)).await;
        tokio::task::yield_now().await;

        assert_eq!(rx.recv().await, Some(Warning::Below10));
    }
}
