use clap::Subcommand;
use potatoclock_core::{format_countdown, Command, TimerAction as Control, TimerMode};

use super::{print_json, Backend, CliResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Choose mode and interval length
    Set {
        /// work or rest
        #[arg(long)]
        mode: TimerMode,
        /// Interval length in minutes (1-1440)
        #[arg(long)]
        minutes: u32,
        /// Bind the timer to this task instead of the focus task
        #[arg(long)]
        task: Option<String>,
    },
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Stop and restore the full interval
    Reset,
    /// Switch to the other mode now
    Skip,
    /// Print current timer state
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn control(backend: &Backend, action: Control) -> CliResult {
    print_json(&backend.execute(Command::TimerControl { action })?)
}

pub fn run(backend: &Backend, action: TimerAction) -> CliResult {
    match action {
        TimerAction::Set {
            mode,
            minutes,
            task,
        } => print_json(&backend.execute(Command::TimerSet {
            mode,
            duration_min: minutes,
            bound_task_id: task,
        })?),
        TimerAction::Start => control(backend, Control::Start),
        TimerAction::Pause => control(backend, Control::Pause),
        TimerAction::Reset => control(backend, Control::Reset),
        TimerAction::Skip => control(backend, Control::Skip),
        TimerAction::Status { json } => {
            let timer = backend.state(u64::MAX)?.state.timer;
            if json {
                return print_json(&timer);
            }
            println!(
                "{} {} ({})",
                format_countdown(timer.remaining_sec),
                timer.mode,
                if timer.running { "running" } else { "paused" }
            );
            Ok(())
        }
    }
}
