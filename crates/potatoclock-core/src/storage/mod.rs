mod config;
pub mod database;

pub use config::{ClientConfig, Config, ServerConfig, TimerConfig};
pub use database::{Database, SqliteSessionStore};

use std::path::PathBuf;

use crate::error::DatabaseError;
use crate::session::SessionState;

/// Returns `~/.config/potatoclock[-dev]/` based on POTATOCLOCK_ENV.
///
/// Set POTATOCLOCK_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("POTATOCLOCK_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("potatoclock-dev")
    } else {
        base_dir.join("potatoclock")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Where a session survives a restart of the state holder.
pub trait SessionStore: Send + Sync {
    /// `Ok(None)` when nothing was saved yet.
    fn load(&self) -> Result<Option<SessionState>, DatabaseError>;

    fn save(&self, session: &SessionState) -> Result<(), DatabaseError>;
}
