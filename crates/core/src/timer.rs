//! Client session timer state machine.
//!
//! Tracks elapsed voice-session time against a fixed per-session cap,
//! entirely on the client. The timer is a UX guardrail only: billing is
//! derived from the server-reported duration at session end, never from
//! this state.
//!
//! Every method takes the current instant explicitly so transitions are
//! deterministic under test.

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default hard cap per voice session, in seconds (15 minutes).
pub const DEFAULT_SESSION_CAP_SECS: i64 = 900;

/// Fraction of the cap at which the pre-limit warning latches.
pub const WARNING_THRESHOLD: f64 = 0.8;

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// Timer lifecycle states.
///
/// `LimitReached` is terminal for the session; only `reset` leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    LimitReached,
}

// ---------------------------------------------------------------------------
// Timer
// ---------------------------------------------------------------------------

/// Soft-cap session timer.
#[derive(Debug, Clone)]
pub struct SessionTimer {
    cap_secs: i64,
    accumulated_secs: i64,
    started_at: Option<DateTime<Utc>>,
    state: TimerState,
    warning_latched: bool,
}

/// Derived view of the timer, recomputed on every tick and transition.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub elapsed_secs: i64,
    pub remaining_secs: i64,
    pub percent_used: f64,
    /// One-shot latch: true from the 80% crossing until reset, except in
    /// `LimitReached` where the limit notice replaces the warning.
    pub show_warning: bool,
    pub limit_reached: bool,
}

impl SessionTimer {
    /// Create an idle timer with the given hard cap.
    pub fn new(cap_secs: i64) -> Self {
        Self {
            cap_secs: cap_secs.max(1),
            accumulated_secs: 0,
            started_at: None,
            state: TimerState::Idle,
            warning_latched: false,
        }
    }

    /// Rebuild a timer from previously persisted accumulated seconds
    /// (page reload / process restart).
    pub fn restore(cap_secs: i64, accumulated_secs: i64) -> Self {
        let mut timer = Self::new(cap_secs);
        timer.accumulated_secs = accumulated_secs.clamp(0, timer.cap_secs);
        timer.state = if timer.accumulated_secs >= timer.cap_secs {
            TimerState::LimitReached
        } else if timer.accumulated_secs > 0 {
            TimerState::Paused
        } else {
            TimerState::Idle
        };
        timer.sync_warning_latch(timer.accumulated_secs);
        timer
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Total elapsed seconds, including the currently running stretch.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> i64 {
        let running_delta = match self.started_at {
            Some(started) => (now - started).num_seconds().max(0),
            None => 0,
        };
        (self.accumulated_secs + running_delta).min(self.cap_secs)
    }

    /// Begin (or resume) counting. Returns `false` when refused because
    /// the cap has already been reached.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        match self.state {
            TimerState::LimitReached => false,
            TimerState::Running => true,
            TimerState::Idle | TimerState::Paused => {
                self.started_at = Some(now);
                self.state = TimerState::Running;
                true
            }
        }
    }

    /// Advance the timer. Called once per second while a session is live;
    /// latches `LimitReached` when the cap is hit.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TimerSnapshot {
        if self.state == TimerState::Running {
            let elapsed = self.elapsed_secs(now);
            self.sync_warning_latch(elapsed);
            if elapsed >= self.cap_secs {
                self.accumulated_secs = self.cap_secs;
                self.started_at = None;
                self.state = TimerState::LimitReached;
            }
        }
        self.snapshot(now)
    }

    /// Stop counting, folding the running stretch into the accumulated
    /// total. Returns the accumulated seconds for the caller to persist.
    pub fn pause(&mut self, now: DateTime<Utc>) -> i64 {
        if self.state == TimerState::Running {
            self.accumulated_secs = self.elapsed_secs(now);
            self.started_at = None;
            self.sync_warning_latch(self.accumulated_secs);
            self.state = if self.accumulated_secs >= self.cap_secs {
                TimerState::LimitReached
            } else {
                TimerState::Paused
            };
        }
        self.accumulated_secs
    }

    /// Return to a pristine idle timer. Clears the warning latch.
    pub fn reset(&mut self) {
        self.accumulated_secs = 0;
        self.started_at = None;
        self.state = TimerState::Idle;
        self.warning_latched = false;
    }

    /// Derived values for display and decision-making.
    pub fn snapshot(&self, now: DateTime<Utc>) -> TimerSnapshot {
        let elapsed = self.elapsed_secs(now);
        let limit_reached = self.state == TimerState::LimitReached;
        TimerSnapshot {
            state: self.state,
            elapsed_secs: elapsed,
            remaining_secs: (self.cap_secs - elapsed).max(0),
            percent_used: (elapsed as f64 / self.cap_secs as f64 * 100.0).min(100.0),
            show_warning: self.warning_latched && !limit_reached,
            limit_reached,
        }
    }

    fn sync_warning_latch(&mut self, elapsed_secs: i64) {
        if elapsed_secs as f64 >= self.cap_secs as f64 * WARNING_THRESHOLD {
            self.warning_latched = true;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
