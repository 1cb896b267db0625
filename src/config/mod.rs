//! Configuration for the to-do server.
//!
//! Settings are merged field by field from these tiers, lowest first:
//! 1. **Defaults**: `todo.db`, `0.0.0.0:5000`
//! 2. **Project**: `./todo-web/config.yaml`
//! 3. **User**: `~/.todo-web/config.yaml`
//! 4. **Environment**: the variables below
//!
//! Command-line flags are applied on top by the binary.
//!
//! ## Environment Variables
//! - `TODO_WEB_CONFIG_PATH` - Explicit config file (used instead of the project and user files)
//! - `TODO_WEB_DB_PATH` - Database path
//! - `TODO_WEB_HOST` - Bind address
//! - `TODO_WEB_PORT` - Bind port
//! - `TODO_WEB_PROJECT_DIR` - Project config dir (default: `./todo-web`)
//! - `TODO_WEB_USER_DIR` - User config dir (default: `~/.todo-web`)

mod loader;
mod merge;
mod types;

pub use loader::{CONFIG_FILE_NAME, ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::{deep_merge, deep_merge_all};
pub use types::*;
