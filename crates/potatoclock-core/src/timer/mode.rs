use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Longest interval `set` accepts, in minutes.
pub const MAX_DURATION_MIN: u32 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    Work,
    Rest,
}

impl TimerMode {
    /// The mode an expiry or skip switches to.
    pub fn other(self) -> Self {
        match self {
            TimerMode::Work => TimerMode::Rest,
            TimerMode::Rest => TimerMode::Work,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimerMode::Work => "work",
            TimerMode::Rest => "rest",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(TimerMode::Work),
            "rest" => Ok(TimerMode::Rest),
            other => Err(format!("unknown timer mode '{other}' (expected work or rest)")),
        }
    }
}

/// Discrete timer controls accepted by `timerControl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerAction {
    Start,
    Pause,
    Reset,
    Skip,
}

impl FromStr for TimerAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(TimerAction::Start),
            "pause" => Ok(TimerAction::Pause),
            "reset" => Ok(TimerAction::Reset),
            "skip" => Ok(TimerAction::Skip),
            other => Err(format!("unknown timer action '{other}'")),
        }
    }
}

/// Configured interval length per mode, in seconds.
///
/// Expiry and skip read the length for the mode being entered from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeDurations {
    pub work_secs: u32,
    pub rest_secs: u32,
}

impl ModeDurations {
    pub fn from_minutes(work_min: u32, rest_min: u32) -> Self {
        Self {
            work_secs: work_min.saturating_mul(60).max(1),
            rest_secs: rest_min.saturating_mul(60).max(1),
        }
    }

    /// Duration for `mode`. Never zero.
    pub fn get(&self, mode: TimerMode) -> u32 {
        let secs = match mode {
            TimerMode::Work => self.work_secs,
            TimerMode::Rest => self.rest_secs,
        };
        secs.max(1)
    }

    pub fn set(&mut self, mode: TimerMode, secs: u32) {
        let secs = secs.max(1);
        match mode {
            TimerMode::Work => self.work_secs = secs,
            TimerMode::Rest => self.rest_secs = secs,
        }
    }
}

impl Default for ModeDurations {
    fn default() -> Self {
        Self::from_minutes(25, 5)
    }
}

/// Render seconds as a `MM:SS` countdown. Minutes are not wrapped into hours.
pub fn format_countdown(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
