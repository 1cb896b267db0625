//! Database layer for the to-do list.
//!
//! The store owns a single `tasks` table. It holds only the path of the
//! SQLite file: every operation opens its own connection, runs one
//! statement in autocommit mode and drops the connection before returning.

pub mod tasks;

use crate::error::{StoreError, StoreResult};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS tasks (
    id      INTEGER PRIMARY KEY AUTOINCREMENT,
    title   TEXT NOT NULL,
    is_done INTEGER NOT NULL DEFAULT 0
);
";

/// Handle to the task table in a SQLite file.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
}

impl TaskStore {
    /// Create a store backed by the SQLite file at `path`.
    ///
    /// Nothing is opened until the first operation; call [`TaskStore::init`]
    /// once at startup to create the table.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the backing database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory and the `tasks` table if they are absent.
    pub fn init(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Directory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        self.with_conn(|conn| {
            // WAL is persistent on the file, so it only needs setting once.
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })?;

        tracing::debug!(path = %self.path.display(), "Task table ready");
        Ok(())
    }

    /// Run `f` against a fresh connection that is closed when `f` returns.
    pub(crate) fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T>,
    {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(std::time::Duration::from_millis(5000))?;
        Ok(f(&conn)?)
    }
}
