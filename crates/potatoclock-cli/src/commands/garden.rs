use clap::Subcommand;
use potatoclock_core::Command;

use super::{print_json, Backend, CliResult};

#[derive(Subcommand)]
pub enum GardenAction {
    /// Plant the fully grown flower and start a new one
    Plant {
        /// Remember which task this flower is for
        #[arg(long)]
        task: Option<String>,
    },
    /// Print watering, stage and planted flowers as JSON
    Status,
}

pub fn run(backend: &Backend, action: GardenAction) -> CliResult {
    match action {
        GardenAction::Plant { task } => {
            print_json(&backend.execute(Command::Plant { task_id: task })?)
        }
        GardenAction::Status => print_json(&backend.state(u64::MAX)?.state.garden),
    }
}
