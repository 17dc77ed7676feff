//! Task list for the current session.
//!
//! Tasks are only ever appended and toggled. Display grouping into todo and
//! done is done by filtering; nothing is reordered or removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CommandError;

/// Longest task text accepted, in characters.
pub const MAX_TASK_TEXT_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub text: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

/// Owns the ordered task collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task with trimmed `text` and a fresh id.
    pub fn add(&mut self, text: &str, now: DateTime<Utc>) -> Result<&Task, CommandError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CommandError::Validation("task text must not be empty".into()));
        }
        let chars = text.chars().count();
        if chars > MAX_TASK_TEXT_CHARS {
            return Err(CommandError::Validation(format!(
                "task text is {chars} characters, limit is {MAX_TASK_TEXT_CHARS}"
            )));
        }
        self.tasks.push(Task {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            done: false,
            created_at: now,
        });
        let index = self.tasks.len() - 1;
        Ok(&self.tasks[index])
    }

    /// Flip completion and return the new value.
    pub fn toggle(&mut self, id: &str) -> Result<bool, CommandError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CommandError::task_not_found(id))?;
        task.done = !task.done;
        Ok(task.done)
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// All tasks in insertion order.
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn todo(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.done)
    }

    pub fn done(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| t.done)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
