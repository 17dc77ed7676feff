mod engine;
mod mode;

pub use engine::{TimerEngine, TimerState};
pub use mode::{format_countdown, ModeDurations, TimerAction, TimerMode, MAX_DURATION_MIN};
