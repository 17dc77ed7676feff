//! Which task is "in progress".
//!
//! The declared focus is only a hint. Every read resolves it against the
//! current task list, falling back to the first unfinished task, and the
//! session writes a valid fallback back into the declared field.

use serde::{Deserialize, Serialize};

use crate::error::CommandError;
use crate::task::Task;

/// Resolve the focus task id.
///
/// Returns `declared` when it names an existing, unfinished task, otherwise
/// the first unfinished task in insertion order, otherwise `None`.
pub fn resolve_focus<'a>(tasks: &'a [Task], declared: Option<&str>) -> Option<&'a str> {
    if let Some(id) = declared {
        if let Some(task) = tasks.iter().find(|t| t.id == id && !t.done) {
            return Some(task.id.as_str());
        }
    }
    tasks.iter().find(|t| !t.done).map(|t| t.id.as_str())
}

/// Holds the declared focus id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FocusBinder {
    declared: Option<String>,
}

impl FocusBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declared(&self) -> Option<&str> {
        self.declared.as_deref()
    }

    pub fn resolve<'a>(&self, tasks: &'a [Task]) -> Option<&'a str> {
        resolve_focus(tasks, self.declared.as_deref())
    }

    /// Declare `task_id` as the focus. Unknown or finished tasks are refused.
    pub fn set(&mut self, tasks: &[Task], task_id: &str) -> Result<(), CommandError> {
        let task = tasks
            .iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| CommandError::task_not_found(task_id))?;
        if task.done {
            return Err(CommandError::InvalidState(format!(
                "task {task_id} is already done and cannot take focus"
            )));
        }
        self.declared = Some(task_id.to_string());
        Ok(())
    }

    /// Persist the fallback when the declared focus no longer resolves.
    ///
    /// Returns the new declared id when it changed. The declared id is never
    /// cleared: with no eligible task it stays as is and resolves to `None`.
    pub fn heal(&mut self, tasks: &[Task]) -> Option<String> {
        let resolved = self.resolve(tasks)?;
        if self.declared.as_deref() == Some(resolved) {
            return None;
        }
        let resolved = resolved.to_string();
        self.declared = Some(resolved.clone());
        Some(resolved)
    }
}
