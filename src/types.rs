//! Core types for the to-do list.

use serde::{Deserialize, Serialize};

/// A task in the to-do list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Assigned by the store on creation; strictly increasing, never reused.
    pub id: i64,
    pub title: String,
    /// One-way flag: once true, stays true until the task is deleted.
    pub is_done: bool,
}

impl Task {
    /// Short status label used by the HTML views.
    pub fn status_label(&self) -> &'static str {
        if self.is_done { "done" } else { "open" }
    }
}
