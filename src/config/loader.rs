//! Configuration loader with tier-based merging.

use super::merge::deep_merge_all;
use super::types::Config;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the config file looked up in each tier directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// File tiers, lowest priority first. Built-in defaults sit below them and
/// environment variables above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigTier {
    Project,
    User,
}

impl std::fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigTier::Project => write!(f, "project"),
            ConfigTier::User => write!(f, "user"),
        }
    }
}

/// Directories searched for `config.yaml`.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// Project-level config directory (`$TODO_WEB_PROJECT_DIR` or `./todo-web`).
    pub project_dir: Option<PathBuf>,
    /// User-level config directory (`$TODO_WEB_USER_DIR` or `~/.todo-web`).
    pub user_dir: Option<PathBuf>,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover configuration paths from environment and defaults.
    pub fn discover() -> Self {
        let project_dir = std::env::var("TODO_WEB_PROJECT_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| Some(PathBuf::from("todo-web")));

        let user_dir = std::env::var("TODO_WEB_USER_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".todo-web")));

        Self {
            project_dir,
            user_dir,
        }
    }

    /// Create paths with explicit directories.
    pub fn with_dirs(project_dir: Option<PathBuf>, user_dir: Option<PathBuf>) -> Self {
        Self {
            project_dir,
            user_dir,
        }
    }

    fn tier_files(&self) -> [(ConfigTier, Option<PathBuf>); 2] {
        [
            (
                ConfigTier::Project,
                self.project_dir.as_ref().map(|d| d.join(CONFIG_FILE_NAME)),
            ),
            (
                ConfigTier::User,
                self.user_dir.as_ref().map(|d| d.join(CONFIG_FILE_NAME)),
            ),
        ]
    }
}

/// Configuration loader that handles tier-based merging.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: Config,
    /// Config files that contributed, lowest tier first.
    sources: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Load configuration from all tiers, or from `explicit` alone when given.
    ///
    /// An explicit path may also come from `TODO_WEB_CONFIG_PATH`; the
    /// argument wins over the variable.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let explicit = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("TODO_WEB_CONFIG_PATH").ok().map(PathBuf::from));
        Self::load_with(ConfigPaths::discover(), explicit.as_deref(), |key| {
            std::env::var(key).ok()
        })
    }

    /// Load with every input supplied by the caller.
    pub fn load_with<F>(paths: ConfigPaths, explicit: Option<&Path>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut sources = Vec::new();

        let mut config = if let Some(path) = explicit {
            sources.push(path.to_path_buf());
            Config::load(path)?
        } else {
            let mut tiers: Vec<Value> = vec![serde_json::to_value(Config::default())?];

            for (tier, file) in paths.tier_files() {
                let Some(file) = file.filter(|f| f.exists()) else {
                    continue;
                };
                match read_yaml(&file) {
                    Ok(value) => {
                        debug!(tier = %tier, path = %file.display(), "Loaded config tier");
                        tiers.push(value);
                        sources.push(file);
                    }
                    Err(e) => {
                        warn!(
                            tier = %tier,
                            path = %file.display(),
                            "Ignoring unreadable config: {:#}",
                            e
                        );
                    }
                }
            }

            serde_json::from_value(deep_merge_all(tiers))
                .context("merged configuration is invalid")?
        };

        Self::apply_env_overrides(&mut config, env)?;

        Ok(Self { config, sources })
    }

    /// Apply environment variable overrides to config.
    fn apply_env_overrides<F>(config: &mut Config, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db_path) = env("TODO_WEB_DB_PATH") {
            config.server.db_path = PathBuf::from(db_path);
        }

        if let Some(host) = env("TODO_WEB_HOST") {
            config.server.host = host;
        }

        if let Some(port) = env("TODO_WEB_PORT") {
            config.server.port = port
                .parse()
                .with_context(|| format!("TODO_WEB_PORT is not a valid port: '{}'", port))?;
        }

        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// Config files that contributed to the result.
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}

fn read_yaml(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str::<Value>(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(dir: &Path, content: &str) {
        std::fs::create_dir_all(dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILE_NAME), content).unwrap();
    }

    #[test]
    fn test_load_defaults_only() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(
            Some(temp.path().join("project")),
            Some(temp.path().join("user")),
        );

        let loader = ConfigLoader::load_with(paths, None, no_env).unwrap();

        assert_eq!(loader.config().server.port, 5000);
        assert_eq!(loader.config().server.db_path, PathBuf::from("todo.db"));
        assert!(loader.sources().is_empty());
    }

    #[test]
    fn test_user_config_overrides_project() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("todo-web");
        let user_dir = temp.path().join("user");
        write_config(&project_dir, "server:\n  port: 6000\n  host: 127.0.0.1\n");
        write_config(&user_dir, "server:\n  port: 7000\n");

        let paths = ConfigPaths::with_dirs(Some(project_dir), Some(user_dir));
        let loader = ConfigLoader::load_with(paths, None, no_env).unwrap();
        let config = loader.config();

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(loader.sources().len(), 2);
    }

    #[test]
    fn test_unparsable_tier_is_skipped() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("todo-web");
        write_config(&project_dir, "server: [unclosed\n");

        let paths = ConfigPaths::with_dirs(Some(project_dir), None);
        let loader = ConfigLoader::load_with(paths, None, no_env).unwrap();

        assert_eq!(loader.config().server.port, 5000);
        assert!(loader.sources().is_empty());
    }

    #[test]
    fn test_explicit_file_bypasses_tiers() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("todo-web");
        write_config(&project_dir, "server:\n  port: 6000\n");
        let explicit = temp.path().join("custom.yaml");
        std::fs::write(&explicit, "server:\n  db_path: /tmp/other.db\n").unwrap();

        let paths = ConfigPaths::with_dirs(Some(project_dir), None);
        let loader = ConfigLoader::load_with(paths, Some(&explicit), no_env).unwrap();

        assert_eq!(loader.config().server.port, 5000);
        assert_eq!(
            loader.config().server.db_path,
            PathBuf::from("/tmp/other.db")
        );
        assert_eq!(loader.sources(), &[explicit]);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let paths = ConfigPaths::with_dirs(None, None);
        let missing = temp.path().join("nope.yaml");
        assert!(ConfigLoader::load_with(paths, Some(&missing), no_env).is_err());
    }

    #[test]
    fn test_environment_overrides_files() {
        let temp = TempDir::new().unwrap();
        let project_dir = temp.path().join("todo-web");
        write_config(&project_dir, "server:\n  port: 6000\n");

        let env: HashMap<&str, &str> = HashMap::from([
            ("TODO_WEB_PORT", "9100"),
            ("TODO_WEB_DB_PATH", "env.db"),
            ("TODO_WEB_HOST", "::1"),
        ]);
        let paths = ConfigPaths::with_dirs(Some(project_dir), None);
        let loader =
            ConfigLoader::load_with(paths, None, |k| env.get(k).map(|v| v.to_string())).unwrap();
        let config = loader.config();

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.db_path, PathBuf::from("env.db"));
        assert_eq!(config.server.host, "::1");
    }

    #[test]
    fn test_invalid_port_in_environment_is_an_error() {
        let paths = ConfigPaths::with_dirs(None, None);
        let result = ConfigLoader::load_with(paths, None, |k| {
            (k == "TODO_WEB_PORT").then(|| "eighty".to_string())
        });
        assert!(result.is_err());
    }
}
