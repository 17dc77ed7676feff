pub mod config;
pub mod garden;
pub mod rest;
pub mod state;
pub mod task;
pub mod timer;

use std::sync::Arc;

use potatoclock_core::sync::wire::{
    FocusResponse, GardenResponse, IdeaResponse, TaskResponse, TimerResponse,
};
use potatoclock_core::{
    Command, CommandOutcome, Config, Database, SessionHandle, SqliteSessionStore, StateResponse,
    SyncClient, SystemClock,
};
use serde_json::Value;
use tokio::runtime::Runtime;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Where commands are sent.
pub enum Backend {
    /// A running state holder, reached over HTTP.
    Remote { client: SyncClient, runtime: Runtime },
    /// The saved session in the data directory, edited in place.
    Local { session: SessionHandle },
}

impl Backend {
    /// `--local` edits the saved session directly; otherwise talk to
    /// `server` or the configured `client.base_url`.
    pub fn connect(server: Option<&str>, local: bool) -> CliResult<Self> {
        let config = Config::load_or_default();
        if local {
            let store = SqliteSessionStore::new(Database::open()?);
            let session =
                SessionHandle::restore(config.durations(), Arc::new(SystemClock), Arc::new(store));
            return Ok(Backend::Local { session });
        }
        let client = match server {
            Some(url) => {
                let mut client_config = config.client.clone();
                client_config.base_url = url.to_string();
                SyncClient::from_config(&client_config)?
            }
            None => SyncClient::from_config(&config.client)?,
        };
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Backend::Remote { client, runtime })
    }

    pub fn state(&self, since: u64) -> CliResult<StateResponse> {
        match self {
            Backend::Remote { client, runtime } => Ok(runtime.block_on(client.state(since))?),
            Backend::Local { session } => Ok(session.state_since(since)),
        }
    }

    pub fn rest_idea(&self) -> CliResult<IdeaResponse> {
        match self {
            Backend::Remote { client, runtime } => Ok(runtime.block_on(client.rest_idea())?),
            Backend::Local { session } => Ok(IdeaResponse {
                ok: true,
                idea: session.suggest_rest_idea()?,
            }),
        }
    }

    /// Apply `command` and return the response body the server would send.
    pub fn execute(&self, command: Command) -> CliResult<Value> {
        match self {
            Backend::Remote { client, runtime } => runtime.block_on(remote(client, command)),
            Backend::Local { session } => {
                let (outcome, progress) =
                    session.execute_then(command, |s| s.progress())?;
                let body = match outcome {
                    CommandOutcome::Task(task) => serde_json::to_value(TaskResponse {
                        ok: true,
                        task,
                        progress,
                    })?,
                    CommandOutcome::Focus(focus) => {
                        serde_json::to_value(FocusResponse { ok: true, focus })?
                    }
                    CommandOutcome::Timer(timer) => {
                        serde_json::to_value(TimerResponse { ok: true, timer })?
                    }
                    CommandOutcome::Garden(garden) => {
                        serde_json::to_value(GardenResponse { ok: true, garden })?
                    }
                    CommandOutcome::RestIdea(idea) => {
                        serde_json::to_value(IdeaResponse { ok: true, idea })?
                    }
                };
                Ok(body)
            }
        }
    }
}

async fn remote(client: &SyncClient, command: Command) -> CliResult<Value> {
    let body = match command {
        Command::AddTask { text } => serde_json::to_value(client.add_task(&text).await?)?,
        Command::ToggleDone { id } => serde_json::to_value(client.toggle_done(&id).await?)?,
        Command::SetFocus { task_id } => serde_json::to_value(client.set_focus(&task_id).await?)?,
        Command::TimerSet {
            mode,
            duration_min,
            bound_task_id,
        } => serde_json::to_value(client.timer_set(mode, duration_min, bound_task_id).await?)?,
        Command::TimerControl { action } => {
            serde_json::to_value(client.timer_control(action).await?)?
        }
        Command::Plant { task_id } => serde_json::to_value(client.plant(task_id).await?)?,
        Command::AddRestIdea { text } => serde_json::to_value(client.add_rest_idea(&text).await?)?,
    };
    Ok(body)
}

pub fn print_json(value: &impl serde::Serialize) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
