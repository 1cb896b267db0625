//! Task operations. Each one is a single parameterized statement.

use super::TaskStore;
use crate::error::StoreResult;
use crate::types::Task;
use rusqlite::{Row, params};

pub fn parse_task_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        is_done: row.get::<_, i64>("is_done")? != 0,
    })
}

impl TaskStore {
    /// List every task in creation (id) order.
    pub fn list_tasks(&self) -> StoreResult<Vec<Task>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT id, title, is_done FROM tasks ORDER BY id")?;
            let tasks = stmt
                .query_map([], parse_task_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tasks)
        })
    }

    /// Insert a task and return its id.
    ///
    /// The title is stored as given; callers validate it first.
    pub fn create_task(&self, title: &str) -> StoreResult<i64> {
        self.with_conn(|conn| {
            conn.execute("INSERT INTO tasks (title) VALUES (?1)", params![title])?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Mark a task done. Returns the number of rows touched (0 for an unknown id).
    pub fn complete_task(&self, id: i64) -> StoreResult<usize> {
        self.with_conn(|conn| {
            conn.execute("UPDATE tasks SET is_done = 1 WHERE id = ?1", params![id])
        })
    }

    /// Delete a task. Returns the number of rows removed (0 for an unknown id).
    pub fn delete_task(&self, id: i64) -> StoreResult<usize> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])
        })
    }
}
