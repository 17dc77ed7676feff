use clap::Subcommand;
use potatoclock_core::Command;

use super::{print_json, Backend, CliResult};

#[derive(Subcommand)]
pub enum RestAction {
    /// Suggest something to do (rest mode only)
    Suggest,
    /// Add your own idea to the pool
    Add {
        /// Idea text
        text: String,
    },
}

pub fn run(backend: &Backend, action: RestAction) -> CliResult {
    match action {
        RestAction::Suggest => {
            println!("{}", backend.rest_idea()?.idea);
            Ok(())
        }
        RestAction::Add { text } => print_json(&backend.execute(Command::AddRestIdea { text })?),
    }
}
