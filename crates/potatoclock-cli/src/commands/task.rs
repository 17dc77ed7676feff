use clap::Subcommand;
use potatoclock_core::Command;

use super::{print_json, Backend, CliResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to the end of the list
    Add {
        /// Task text
        text: String,
    },
    /// Flip a task between todo and done
    Toggle {
        /// Task ID
        id: String,
    },
    /// List tasks, todo first
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(backend: &Backend, action: TaskAction) -> CliResult {
    match action {
        TaskAction::Add { text } => print_json(&backend.execute(Command::AddTask { text })?),
        TaskAction::Toggle { id } => print_json(&backend.execute(Command::ToggleDone { id })?),
        TaskAction::List { json } => {
            let state = backend.state(u64::MAX)?.state;
            if json {
                return print_json(&state.tasks);
            }
            if state.tasks.is_empty() {
                println!("No tasks yet.");
                return Ok(());
            }
            let focus = state.focus_task_id.as_deref();
            let todo = state.tasks.iter().filter(|t| !t.done);
            let done = state.tasks.iter().filter(|t| t.done);
            for task in todo.chain(done) {
                let mark = if task.done { "x" } else { " " };
                let pointer = if Some(task.id.as_str()) == focus { ">" } else { " " };
                println!("{pointer} [{mark}] {}  {}", task.id, task.text);
            }
            println!(
                "{}/{} done ({}%)",
                state.progress.done, state.progress.total, state.progress.pct
            );
            Ok(())
        }
    }
}

/// Move the focus to `task_id`.
pub fn focus(backend: &Backend, task_id: String) -> CliResult {
    print_json(&backend.execute(Command::SetFocus { task_id })?)
}
