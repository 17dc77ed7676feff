//! The session aggregate: tasks, timer, focus, garden.
//!
//! `SessionState` is the only writer of its slices. Every command settles the
//! timer first, validates, mutates, heals the focus binding and bumps the
//! revision; a rejected command leaves every slice as it was.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CommandError;
use crate::events::{Event, EventLog, SequencedEvent};
use crate::focus::FocusBinder;
use crate::garden::{GardenEngine, GardenState};
use crate::progress::Progress;
use crate::rest_ideas::RestIdeas;
use crate::task::{Task, TaskStore};
use crate::timer::{ModeDurations, TimerAction, TimerEngine, TimerMode, TimerState};

/// A discrete mutation submitted by a display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    AddTask {
        text: String,
    },
    ToggleDone {
        id: String,
    },
    SetFocus {
        task_id: String,
    },
    TimerSet {
        mode: TimerMode,
        duration_min: u32,
        #[serde(default)]
        bound_task_id: Option<String>,
    },
    TimerControl {
        action: TimerAction,
    },
    Plant {
        #[serde(default)]
        task_id: Option<String>,
    },
    AddRestIdea {
        text: String,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddTask { .. } => "add_task",
            Command::ToggleDone { .. } => "toggle_done",
            Command::SetFocus { .. } => "set_focus",
            Command::TimerSet { .. } => "timer_set",
            Command::TimerControl { .. } => "timer_control",
            Command::Plant { .. } => "plant",
            Command::AddRestIdea { .. } => "add_rest_idea",
        }
    }
}

/// What an applied command hands back to its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Task(Task),
    Focus(Option<String>),
    Timer(TimerState),
    Garden(GardenState),
    RestIdea(String),
}

/// Fully resolved, read-only view of the session at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub timer: TimerState,
    pub progress: Progress,
    pub garden: GardenState,
    pub focus_task_id: Option<String>,
    pub revision: u64,
    pub last_event_seq: u64,
    pub now: DateTime<Utc>,
}

/// Which view to hand back once the command and the focus healing are done.
enum Applied {
    Task(Task),
    Focus,
    Timer,
    Garden,
    RestIdea(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    tasks: TaskStore,
    timer: TimerEngine,
    focus: FocusBinder,
    garden: GardenEngine,
    #[serde(default)]
    rest_ideas: RestIdeas,
    revision: u64,
    #[serde(default)]
    events: EventLog,
}

impl SessionState {
    /// Empty task list and a paused work timer.
    pub fn new(durations: ModeDurations, now: DateTime<Utc>) -> Self {
        Self {
            tasks: TaskStore::new(),
            timer: TimerEngine::new(durations, now),
            focus: FocusBinder::new(),
            garden: GardenEngine::new(),
            rest_ideas: RestIdeas::new(),
            revision: 0,
            events: EventLog::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn garden(&self) -> &GardenEngine {
        &self.garden
    }

    pub fn rest_ideas(&self) -> &RestIdeas {
        &self.rest_ideas
    }

    pub fn declared_focus(&self) -> Option<&str> {
        self.focus.declared()
    }

    /// Resolved on every call; never cached.
    pub fn focus_task_id(&self) -> Option<&str> {
        self.focus.resolve(self.tasks.list())
    }

    pub fn progress(&self) -> Progress {
        Progress::of(self.tasks.list())
    }

    pub fn events_since(&self, cursor: u64) -> Vec<SequencedEvent> {
        self.events.since(cursor)
    }

    /// Settle the timer at `now` and build the snapshot.
    ///
    /// Settling only applies expiries that are already determined by the wall
    /// clock, so it does not bump the revision.
    pub fn snapshot(&mut self, now: DateTime<Utc>) -> Snapshot {
        let expired = self.timer.settle(now);
        self.events.extend(expired);
        Snapshot {
            tasks: self.tasks.list().to_vec(),
            timer: self.timer.state(),
            progress: self.progress(),
            garden: self.garden.state(),
            focus_task_id: self.focus_task_id().map(str::to_string),
            revision: self.revision,
            last_event_seq: self.events.last_seq(),
            now: self.timer.updated_at(),
        }
    }

    /// A random rest idea. Only offered while the timer is in rest mode.
    pub fn suggest_rest_idea<R: Rng + ?Sized>(
        &mut self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<String, CommandError> {
        let expired = self.timer.settle(now);
        self.events.extend(expired);
        if self.timer.mode() != TimerMode::Rest {
            return Err(CommandError::InvalidState(
                "rest ideas are only offered during rest".into(),
            ));
        }
        Ok(self.rest_ideas.pick(rng).to_string())
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn apply(
        &mut self,
        command: Command,
        now: DateTime<Utc>,
    ) -> Result<CommandOutcome, CommandError> {
        let expired = self.timer.settle(now);
        self.events.extend(expired);
        let now = self.timer.updated_at();

        let name = command.name();
        let mut events = Vec::new();
        let applied = match command {
            Command::AddTask { text } => self.add_task(&text, now, &mut events),
            Command::ToggleDone { id } => self.toggle_done(&id, now, &mut events),
            Command::SetFocus { task_id } => self.set_focus(&task_id, now, &mut events),
            Command::TimerSet {
                mode,
                duration_min,
                bound_task_id,
            } => self.timer_set(mode, duration_min, bound_task_id, now, &mut events),
            Command::TimerControl { action } => self.timer_control(action, now, &mut events),
            Command::Plant { task_id } => self.plant(task_id, now, &mut events),
            Command::AddRestIdea { text } => self
                .rest_ideas
                .add(&text)
                .map(Applied::RestIdea),
        };
        let applied = match applied {
            Ok(applied) => applied,
            Err(err) => {
                debug!(command = name, error = %err, "command rejected");
                return Err(err);
            }
        };

        self.heal_focus(now, &mut events);
        self.revision += 1;
        self.events.extend(events);
        info!(command = name, revision = self.revision, "command applied");

        Ok(match applied {
            Applied::Task(task) => CommandOutcome::Task(task),
            Applied::Focus => CommandOutcome::Focus(self.focus_task_id().map(str::to_string)),
            Applied::Timer => CommandOutcome::Timer(self.timer.state()),
            Applied::Garden => CommandOutcome::Garden(self.garden.state()),
            Applied::RestIdea(idea) => CommandOutcome::RestIdea(idea),
        })
    }

    fn add_task(
        &mut self,
        text: &str,
        now: DateTime<Utc>,
        events: &mut Vec<Event>,
    ) -> Result<Applied, CommandError> {
        let task = self.tasks.add(text, now)?.clone();
        events.push(Event::TaskAdded {
            task_id: task.id.clone(),
            at: now,
        });
        Ok(Applied::Task(task))
    }

    fn toggle_done(
        &mut self,
        id: &str,
        now: DateTime<Utc>,
        events: &mut Vec<Event>,
    ) -> Result<Applied, CommandError> {
        let mut task = self
            .tasks
            .get(id)
            .cloned()
            .ok_or_else(|| CommandError::task_not_found(id))?;
        task.done = self.tasks.toggle(id)?;
        events.push(Event::TaskToggled {
            task_id: task.id.clone(),
            done: task.done,
            at: now,
        });
        if task.done {
            events.extend(self.garden.on_task_completed(1, now));
        }
        Ok(Applied::Task(task))
    }

    fn set_focus(
        &mut self,
        task_id: &str,
        now: DateTime<Utc>,
        events: &mut Vec<Event>,
    ) -> Result<Applied, CommandError> {
        self.focus.set(self.tasks.list(), task_id)?;
        self.timer.bind(Some(task_id.to_string()));
        events.push(Event::FocusChanged {
            task_id: Some(task_id.to_string()),
            healed: false,
            at: now,
        });
        Ok(Applied::Focus)
    }

    fn timer_set(
        &mut self,
        mode: TimerMode,
        duration_min: u32,
        bound_task_id: Option<String>,
        now: DateTime<Utc>,
        events: &mut Vec<Event>,
    ) -> Result<Applied, CommandError> {
        let bound = match bound_task_id {
            Some(id) => {
                let task = self
                    .tasks
                    .get(&id)
                    .ok_or_else(|| CommandError::task_not_found(&id))?;
                if task.done {
                    return Err(CommandError::InvalidState(format!(
                        "cannot bind the timer to finished task {id}"
                    )));
                }
                Some(id)
            }
            None => self.focus_task_id().map(str::to_string),
        };
        events.extend(self.timer.set(mode, duration_min, bound, now)?);
        Ok(Applied::Timer)
    }

    fn timer_control(
        &mut self,
        action: TimerAction,
        now: DateTime<Utc>,
        events: &mut Vec<Event>,
    ) -> Result<Applied, CommandError> {
        let emitted = match action {
            TimerAction::Start => self.timer.start(now),
            TimerAction::Pause => self.timer.pause(now),
            TimerAction::Reset => self.timer.reset(now),
            TimerAction::Skip => self.timer.skip(now),
        };
        events.extend(emitted);
        Ok(Applied::Timer)
    }

    fn plant(
        &mut self,
        task_id: Option<String>,
        now: DateTime<Utc>,
        events: &mut Vec<Event>,
    ) -> Result<Applied, CommandError> {
        if let Some(id) = task_id.as_deref() {
            if self.tasks.get(id).is_none() {
                return Err(CommandError::task_not_found(id));
            }
        }
        events.push(self.garden.plant(task_id, now)?);
        Ok(Applied::Garden)
    }

    /// Write a valid fallback focus back into the declared field, and move a
    /// timer binding that points at a finished or unknown task along with it.
    fn heal_focus(&mut self, now: DateTime<Utc>, events: &mut Vec<Event>) {
        if let Some(id) = self.focus.heal(self.tasks.list()) {
            debug!(task_id = %id, "focus healed");
            events.push(Event::FocusChanged {
                task_id: Some(id),
                healed: true,
                at: now,
            });
        }
        let binding_valid = self
            .timer
            .bound_task_id()
            .and_then(|id| self.tasks.get(id))
            .is_some_and(|task| !task.done);
        if !binding_valid {
            if let Some(focus) = self.focus_task_id().map(str::to_string) {
                self.timer.bind(Some(focus));
            }
        }
    }
}
