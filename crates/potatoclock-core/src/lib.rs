//! # Potato Clock Core Library
//!
//! This library provides the session state behind Potato Clock: a to-do list,
//! a work/rest countdown bound to the task in focus, and a flower that grows
//! as tasks get done. One state holder owns the session; any number of
//! displays (the HTTP server's clients, the CLI) submit commands and poll
//! snapshots.
//!
//! ## Architecture
//!
//! - **Session**: A single aggregate that settles the timer, validates and
//!   applies a command, heals the focus binding and bumps a revision
//! - **Timer Engine**: A wall-clock-based state machine; remaining time is
//!   computed from an injected [`Clock`] on every read
//! - **Storage**: SQLite-based session persistence and TOML-based configuration
//! - **Sync**: The shared [`SessionHandle`], the HTTP [`SyncClient`] and the
//!   display-side [`SnapshotPoller`]
//!
//! ## Key Components
//!
//! - [`SessionState`]: Tasks, timer, focus and garden under one revision
//! - [`TimerEngine`]: Core timer state machine
//! - [`GardenEngine`]: Watering, growth stages and planting
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod focus;
pub mod garden;
pub mod progress;
pub mod rest_ideas;
pub mod session;
pub mod storage;
pub mod sync;
pub mod task;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CommandError, ConfigError, CoreError, DatabaseError, ErrorKind, SyncError};
pub use events::{Event, EventLog, SequencedEvent};
pub use focus::{resolve_focus, FocusBinder};
pub use garden::{Flower, GardenEngine, GardenState};
pub use progress::Progress;
pub use rest_ideas::RestIdeas;
pub use session::{Command, CommandOutcome, SessionState, Snapshot};
pub use storage::{Config, Database, SessionStore, SqliteSessionStore};
pub use sync::{PollUpdate, SessionHandle, SnapshotPoller, StateResponse, SyncClient};
pub use task::{Task, TaskStore};
pub use timer::{format_countdown, ModeDurations, TimerAction, TimerEngine, TimerMode, TimerState};
