//! Error types for the task store and the HTTP layer.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Errors raised by the task store.
///
/// Every variant is a storage fault: the store never validates input, and
/// operations on unknown ids are no-ops rather than errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The SQLite engine rejected a statement or could not open the file.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The directory holding the database file could not be created.
    #[error("cannot prepare database directory {}: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The blocking task running a store operation panicked or was cancelled.
    #[error("task store worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// Result type for task store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Error codes for programmatic error handling in JSON responses.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationRejected,
    StorageFault,
}

/// Structured error body returned by the JSON endpoints.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn rejected(field: &str, reason: impl fmt::Display) -> Self {
        Self::new(ErrorCode::ValidationRejected, reason.to_string()).with_field(field)
    }

    pub fn storage(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::StorageFault, err.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::storage(err)
    }
}
