//! JSON bodies exchanged between displays and the state holder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CommandError, ErrorKind};
use crate::events::SequencedEvent;
use crate::garden::GardenState;
use crate::progress::Progress;
use crate::session::{Command, Snapshot};
use crate::task::Task;
use crate::timer::{TimerAction, TimerMode, TimerState};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StateQuery {
    #[serde(default)]
    pub since: Option<u64>,
}

/// `GET /api/state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateResponse {
    pub state: Snapshot,
    pub progress: Progress,
    pub now: DateTime<Utc>,
    #[serde(default)]
    pub events: Vec<SequencedEvent>,
}

impl StateResponse {
    /// Ordering key used to drop out-of-order responses.
    pub fn order_key(&self) -> (u64, DateTime<Utc>) {
        (self.state.revision, self.state.now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTaskRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleDoneRequest {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetFocusRequest {
    pub task_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerControlRequest {
    pub action: TimerAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSetRequest {
    pub mode: TimerMode,
    pub duration_min: u32,
    #[serde(default)]
    pub bound_task_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlantRequest {
    #[serde(default)]
    pub task_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRestIdeaRequest {
    pub text: String,
}

impl From<AddTaskRequest> for Command {
    fn from(req: AddTaskRequest) -> Self {
        Command::AddTask { text: req.text }
    }
}

impl From<ToggleDoneRequest> for Command {
    fn from(req: ToggleDoneRequest) -> Self {
        Command::ToggleDone { id: req.id }
    }
}

impl From<SetFocusRequest> for Command {
    fn from(req: SetFocusRequest) -> Self {
        Command::SetFocus {
            task_id: req.task_id,
        }
    }
}

impl From<TimerControlRequest> for Command {
    fn from(req: TimerControlRequest) -> Self {
        Command::TimerControl { action: req.action }
    }
}

impl From<TimerSetRequest> for Command {
    fn from(req: TimerSetRequest) -> Self {
        Command::TimerSet {
            mode: req.mode,
            duration_min: req.duration_min,
            bound_task_id: req.bound_task_id,
        }
    }
}

impl From<PlantRequest> for Command {
    fn from(req: PlantRequest) -> Self {
        Command::Plant {
            task_id: req.task_id,
        }
    }
}

impl From<AddRestIdeaRequest> for Command {
    fn from(req: AddRestIdeaRequest) -> Self {
        Command::AddRestIdea { text: req.text }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    pub ok: bool,
    pub task: Task,
    pub progress: Progress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusResponse {
    pub ok: bool,
    pub focus: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerResponse {
    pub ok: bool,
    pub timer: TimerState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GardenResponse {
    pub ok: bool,
    pub garden: GardenState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeaResponse {
    pub ok: bool,
    pub idea: String,
}

/// `{ok: false, error: {kind, message}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub ok: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorBody {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: ErrorDetail {
                kind,
                message: message.into(),
            },
        }
    }
}

impl From<&CommandError> for ErrorBody {
    fn from(err: &CommandError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}
