//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It does not use
//! internal threads and never mutates itself on a schedule: remaining time is
//! derived from the instant the interval was anchored and the instant the
//! caller observes it.
//!
//! ## State Transitions
//!
//! ```text
//! {Work, Rest} x {Running, Paused}
//!
//! Paused  --start-->  Running  --pause-->  Paused
//! Running --countdown hits 0-->  Running (other mode, full duration)
//! any     --skip-->   other mode, running flag preserved
//! any     --reset-->  Paused, full duration
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(ModeDurations::default(), clock.now());
//! engine.start(clock.now());
//! // Later, on every read:
//! let expired = engine.settle(clock.now()); // TimerExpired events, once each
//! let view = engine.state();
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::mode::{ModeDurations, TimerMode, MAX_DURATION_MIN};
use crate::error::CommandError;
use crate::events::Event;

/// Read-only view of the timer with the live remaining time filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub mode: TimerMode,
    pub running: bool,
    pub duration_sec: u32,
    pub remaining_sec: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    pub bound_task_id: Option<String>,
}

/// Core timer engine.
///
/// While running, `remaining_at_anchor` is the remaining time at `started_at`;
/// while paused it is the frozen remaining time. `updated_at` only moves
/// forward, so a wall clock stepping backwards can never make the countdown
/// rise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    mode: TimerMode,
    running: bool,
    duration_secs: u32,
    remaining_at_anchor: u32,
    started_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
    bound_task_id: Option<String>,
    durations: ModeDurations,
}

impl TimerEngine {
    /// Create a paused work-mode timer with a full work interval.
    pub fn new(durations: ModeDurations, now: DateTime<Utc>) -> Self {
        let duration_secs = durations.get(TimerMode::Work);
        Self {
            mode: TimerMode::Work,
            running: false,
            duration_secs,
            remaining_at_anchor: duration_secs,
            started_at: None,
            updated_at: now,
            bound_task_id: None,
            durations,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn durations(&self) -> ModeDurations {
        self.durations
    }

    pub fn bound_task_id(&self) -> Option<&str> {
        self.bound_task_id.as_deref()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Remaining seconds as of the last observed instant.
    pub fn remaining_secs(&self) -> u32 {
        let remaining = match self.started_at {
            Some(started) if self.running => self
                .remaining_at_anchor
                .saturating_sub(elapsed_secs(started, self.updated_at)),
            _ => self.remaining_at_anchor,
        };
        remaining.min(self.duration_secs)
    }

    /// View as of the last observed instant. Call [`settle`](Self::settle) first
    /// to bring it up to date.
    pub fn state(&self) -> TimerState {
        TimerState {
            mode: self.mode,
            running: self.running,
            duration_sec: self.duration_secs,
            remaining_sec: self.remaining_secs(),
            started_at: self.started_at,
            updated_at: self.updated_at,
            bound_task_id: self.bound_task_id.clone(),
        }
    }

    /// What [`state`](Self::state) would report at `now`, without mutating.
    pub fn state_at(&self, now: DateTime<Utc>) -> TimerState {
        let mut probe = self.clone();
        probe.settle(now);
        probe.state()
    }

    // ── Time ─────────────────────────────────────────────────────────

    /// Bring the engine up to `now`, applying every expiry that happened since
    /// the last observation exactly once.
    ///
    /// Each new interval is anchored at the instant the previous one ran out,
    /// so intervals missed while the process was suspended are expired in
    /// order. Repeated calls with the same `now` are no-ops.
    pub fn settle(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let now = self.observe(now);
        let mut expired = Vec::new();
        if !self.running {
            return expired;
        }
        while let Some(started) = self.started_at {
            if elapsed_secs(started, now) < self.remaining_at_anchor {
                break;
            }
            let at = started + Duration::seconds(i64::from(self.remaining_at_anchor));
            let from = self.mode;
            self.mode = from.other();
            self.duration_secs = self.durations.get(self.mode);
            self.remaining_at_anchor = self.duration_secs;
            self.started_at = Some(at);
            info!(from = %from, to = %self.mode, at = %at, "timer interval expired");
            expired.push(Event::TimerExpired {
                from,
                to: self.mode,
                duration_secs: self.duration_secs,
                at,
            });
        }
        expired
    }

    // ── Commands ─────────────────────────────────────────────────────
    //
    // Every command settles first, so the returned events can start with
    // expiries that happened before the command itself.

    /// Reconfigure mode and duration. Keeps the running flag; a running timer
    /// restarts the new interval immediately.
    pub fn set(
        &mut self,
        mode: TimerMode,
        duration_min: u32,
        bound_task_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Vec<Event>, CommandError> {
        if duration_min == 0 || duration_min > MAX_DURATION_MIN {
            return Err(CommandError::Validation(format!(
                "duration_min must be between 1 and {MAX_DURATION_MIN}, got {duration_min}"
            )));
        }
        let mut events = self.settle(now);
        let secs = duration_min * 60;
        self.durations.set(mode, secs);
        self.mode = mode;
        self.duration_secs = secs;
        self.remaining_at_anchor = secs;
        if self.running {
            self.started_at = Some(self.updated_at);
        }
        self.bound_task_id = bound_task_id;
        events.push(Event::TimerSet {
            mode,
            duration_secs: secs,
            bound_task_id: self.bound_task_id.clone(),
            at: self.updated_at,
        });
        Ok(events)
    }

    pub fn start(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = self.settle(now);
        if self.running {
            debug!("start ignored: timer already running");
            return events;
        }
        if self.duration_secs == 0 {
            debug!("start ignored: zero duration");
            return events;
        }
        if self.remaining_at_anchor == 0 {
            self.remaining_at_anchor = self.duration_secs;
        }
        self.running = true;
        self.started_at = Some(self.updated_at);
        events.push(Event::TimerStarted {
            mode: self.mode,
            remaining_secs: self.remaining_at_anchor,
            at: self.updated_at,
        });
        events
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = self.settle(now);
        if !self.running {
            debug!("pause ignored: timer not running");
            return events;
        }
        self.remaining_at_anchor = self.remaining_secs();
        self.running = false;
        self.started_at = None;
        events.push(Event::TimerPaused {
            mode: self.mode,
            remaining_secs: self.remaining_at_anchor,
            at: self.updated_at,
        });
        events
    }

    pub fn reset(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = self.settle(now);
        self.remaining_at_anchor = self.duration_secs;
        self.running = false;
        self.started_at = None;
        events.push(Event::TimerReset {
            mode: self.mode,
            duration_secs: self.duration_secs,
            at: self.updated_at,
        });
        events
    }

    /// Switch mode now, as if the interval had expired. Keeps the running flag.
    pub fn skip(&mut self, now: DateTime<Utc>) -> Vec<Event> {
        let mut events = self.settle(now);
        let from = self.mode;
        self.mode = from.other();
        self.duration_secs = self.durations.get(self.mode);
        self.remaining_at_anchor = self.duration_secs;
        if self.running {
            self.started_at = Some(self.updated_at);
        }
        events.push(Event::TimerSkipped {
            from,
            to: self.mode,
            at: self.updated_at,
        });
        events
    }

    /// Point the timer at another task without touching the countdown.
    pub fn bind(&mut self, task_id: Option<String>) {
        self.bound_task_id = task_id;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn observe(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        if now > self.updated_at {
            self.updated_at = now;
        }
        self.updated_at
    }
}

/// Whole seconds from `from` to `to`, fractional carry truncated.
fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> u32 {
    (to - from).num_seconds().clamp(0, i64::from(u32::MAX)) as u32
}
