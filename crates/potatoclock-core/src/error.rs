//! Core error types for potatoclock-core.
//!
//! Command errors are the user-facing taxonomy: each one is recoverable and
//! none of them leaves the session partially mutated. The remaining types
//! cover the collaborators (configuration, storage, the HTTP sync client).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core error type for potatoclock-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A session command was rejected
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Display <-> state holder communication errors
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Machine-readable error category carried over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    InvalidState,
    NotReady,
    Transient,
    Internal,
}

/// Rejection of a session command. The session is unchanged when one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Malformed or empty input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown id
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Operation not permitted in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Planting before the flower reached its final stage
    #[error("Flower not ready to plant (stage {stage} of 5)")]
    NotReady { stage: u8 },
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::Validation(_) => ErrorKind::Validation,
            CommandError::NotFound { .. } => ErrorKind::NotFound,
            CommandError::InvalidState(_) => ErrorKind::InvalidState,
            CommandError::NotReady { .. } => ErrorKind::NotReady,
        }
    }

    pub(crate) fn task_not_found(id: &str) -> Self {
        CommandError::NotFound {
            kind: "task",
            id: id.to_string(),
        }
    }
}

/// Errors seen by a display talking to the state holder.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Connection refused, timeout, 5xx or an undecodable body. Retry later.
    #[error("Transient I/O error: {0}")]
    Transient(String),

    /// The state holder answered and refused the command.
    #[error("Rejected ({status}): {message}")]
    Rejected {
        status: u16,
        kind: ErrorKind,
        message: String,
    },

    /// The configured server address is not a usable URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl SyncError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::Transient(_))
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Transient(err.to_string())
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Stored session could not be encoded or decoded
    #[error("Corrupt session record: {0}")]
    Corrupt(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
