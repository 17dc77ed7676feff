//! SQLite-based session persistence.
//!
//! The whole session is one JSON document in a key-value table. The timer is
//! wall-clock anchored, so a running timer restored from here is already
//! correct without replaying anything.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use rusqlite::{params, Connection};

use super::{data_dir, SessionStore};
use crate::error::DatabaseError;
use crate::session::SessionState;

const SESSION_KEY: &str = "session";

/// SQLite database holding the key-value table.
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Open the database at `~/.config/potatoclock/potatoclock.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()?.join("potatoclock.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn, path: None };
        db.migrate()?;
        Ok(db)
    }

    /// File backing this database; `None` for in-memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn load_session(&self) -> Result<Option<SessionState>, DatabaseError> {
        let Some(json) = self.kv_get(SESSION_KEY)? else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| DatabaseError::Corrupt(e.to_string()))
    }

    pub fn save_session(&self, session: &SessionState) -> Result<(), DatabaseError> {
        let json =
            serde_json::to_string(session).map_err(|e| DatabaseError::Corrupt(e.to_string()))?;
        self.kv_set(SESSION_KEY, &json)
    }
}

/// [`SessionStore`] over a shared SQLite connection.
pub struct SqliteSessionStore {
    db: Mutex<Database>,
}

impl SqliteSessionStore {
    pub fn new(db: Database) -> Self {
        Self { db: Mutex::new(db) }
    }
}

impl SessionStore for SqliteSessionStore {
    fn load(&self) -> Result<Option<SessionState>, DatabaseError> {
        self.db
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .load_session()
    }

    fn save(&self, session: &SessionState) -> Result<(), DatabaseError> {
        self.db
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .save_session(session)
    }
}
