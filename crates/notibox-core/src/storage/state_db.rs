//! SQLite-backed persistence for the durable inbox state.
//!
//! The entire inbox state is a single JSON envelope stored in one row,
//! written with a monotonically increasing version. Two processes may
//! share the file; the version column is how one context detects that
//! the other has written since it last loaded.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::PersistenceError;

use super::data_dir;

const STATE_KEY: &str = "inbox";

/// One loaded state row.
#[derive(Debug, Clone)]
pub struct StateRow {
    pub version: u64,
    pub saved_at: String,
    pub payload: String,
}

/// SQLite database holding the versioned state envelope.
pub struct StateDb {
    conn: Connection,
}

impl StateDb {
    /// Open the database at `~/.config/notibox/notibox.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let path = data_dir()?.join("notibox.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path).map_err(|source| PersistenceError::OpenFailed {
            path: PathBuf::from(path),
            source,
        })?;
        // The interactive and watch contexts may write concurrently.
        conn.busy_timeout(Duration::from_millis(250))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS state (
                key      TEXT PRIMARY KEY,
                version  INTEGER NOT NULL,
                saved_at TEXT NOT NULL,
                payload  TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Load the state envelope, if one has ever been written.
    pub fn load(&self) -> Result<Option<StateRow>, PersistenceError> {
        let row = self
            .conn
            .query_row(
                "SELECT version, saved_at, payload FROM state WHERE key = ?1",
                params![STATE_KEY],
                |row| {
                    Ok(StateRow {
                        version: row.get::<_, i64>(0)? as u64,
                        saved_at: row.get(1)?,
                        payload: row.get(2)?,
                    })
                },
            )
            .optional()
            .map_err(|e| PersistenceError::ReadFailed(e.to_string()))?;
        Ok(row)
    }

    /// Write the state envelope, replacing any previous payload.
    ///
    /// The version is allocated inside the statement: the row ends at
    /// `MAX(stored, floor) + 1` even when another context wrote between
    /// this caller's load and its flush, so no two writes can be
    /// assigned the same version. Returns the allocated version.
    pub fn save(&self, floor: u64, payload: &str) -> Result<u64, PersistenceError> {
        let saved_at = chrono::Utc::now().to_rfc3339();
        let version = self.conn.query_row(
            "INSERT INTO state (key, version, saved_at, payload)
             VALUES (?1, ?2 + 1, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                 version  = MAX(state.version, ?2) + 1,
                 saved_at = excluded.saved_at,
                 payload  = excluded.payload
             RETURNING version",
            params![STATE_KEY, floor as i64, saved_at, payload],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(version as u64)
    }

    /// Read only the stored version. Cheap staleness probe for the
    /// polling context.
    pub fn current_version(&self) -> Result<Option<u64>, PersistenceError> {
        let version = self
            .conn
            .query_row(
                "SELECT version FROM state WHERE key = ?1",
                params![STATE_KEY],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .map_err(|e| PersistenceError::ReadFailed(e.to_string()))?;
        Ok(version.map(|v| v as u64))
    }
}
