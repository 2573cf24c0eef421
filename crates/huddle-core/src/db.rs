// SQLite persistence layer for session state.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::warn;

use crate::model::Participant;

/// Key under which the roster is stored.
pub const ROSTER_KEY: &str = "hr_participants";

/// SQLite-backed key-value store for the session's roster.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS session_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// Store `value` as JSON under `key`, replacing any previous value.
    pub fn save_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let json_str = serde_json::to_string(value).context("failed to serialize state value")?;
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO session_state (key, value) VALUES (?1, ?2)",
                params![key, json_str],
            )
            .context("failed to save state")?;
        Ok(())
    }

    /// Load the JSON value stored under `key`, or `None` if the key is absent.
    pub fn load_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
        match self.load_raw(key)? {
            Some(json_str) => {
                let value = serde_json::from_str(&json_str)
                    .context("failed to deserialize state value")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn load_raw(&self, key: &str) -> Result<Option<String>> {
        self.conn()
            .query_row(
                "SELECT value FROM session_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("failed to query session state")
    }

    /// Persist the full roster.
    pub fn save_roster(&self, participants: &[Participant]) -> Result<()> {
        let value = serde_json::to_value(participants).context("failed to serialize roster")?;
        self.save_state(ROSTER_KEY, &value)
    }

    /// Load the stored roster.
    ///
    /// A missing key yields an empty roster. Stored data that does not parse
    /// as a participant list is logged and also yields an empty roster; only
    /// database failures are errors.
    pub fn load_roster(&self) -> Result<Vec<Participant>> {
        let Some(json_str) = self.load_raw(ROSTER_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&json_str) {
            Ok(participants) => Ok(participants),
            Err(e) => {
                warn!("Ignoring unreadable stored roster: {e}");
                Ok(Vec::new())
            }
        }
    }

    /// Delete all stored session state.
    pub fn clear(&self) -> Result<()> {
        self.conn()
            .execute("DELETE FROM session_state", [])
            .context("failed to clear session state")?;
        Ok(())
    }
}
