//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/linkhub/config.toml)
//! 3. Environment variables (LINKHUB_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable prefix
const ENV_PREFIX: &str = "LINKHUB";

/// Which link store backs the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Embedded SQLite table in the data directory
    #[default]
    Sqlite,
    /// Hosted REST table (`rest_url` and `api_key` required)
    Rest,
}

impl std::str::FromStr for BackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(BackendKind::Sqlite),
            "rest" => Ok(BackendKind::Rest),
            other => bail!("Unknown backend '{}'. Expected 'sqlite' or 'rest'.", other),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Sqlite => write!(f, "sqlite"),
            BackendKind::Rest => write!(f, "rest"),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (SQLite db, session)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Link store backend
    #[serde(default)]
    pub backend: BackendKind,

    /// Base URL of the hosted project (rest backend)
    #[serde(default)]
    pub rest_url: Option<String>,

    /// Project API key (rest backend)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Log file path (default: stderr)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: BackendKind::default(),
            rest_url: None,
            api_key: None,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (LINKHUB_DATA_DIR, LINKHUB_BACKEND, ...)
    /// 2. Config file (~/.config/linkhub/config.toml or LINKHUB_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path from the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_path(path),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides()?;
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) -> Result<()> {
        // LINKHUB_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // LINKHUB_BACKEND
        if let Ok(val) = std::env::var(format!("{}_BACKEND", ENV_PREFIX)) {
            self.backend = val
                .parse()
                .with_context(|| format!("Invalid {}_BACKEND", ENV_PREFIX))?;
        }

        // LINKHUB_REST_URL
        if let Ok(val) = std::env::var(format!("{}_REST_URL", ENV_PREFIX)) {
            self.rest_url = if val.is_empty() { None } else { Some(val) };
        }

        // LINKHUB_API_KEY
        if let Ok(val) = std::env::var(format!("{}_API_KEY", ENV_PREFIX)) {
            self.api_key = if val.is_empty() { None } else { Some(val) };
        }

        Ok(())
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default file
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &PathBuf) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let optional = |v: &str| {
            if v.is_empty() {
                None
            } else {
                Some(v.to_string())
            }
        };

        match key {
            "data_dir" => self.data_dir = PathBuf::from(value),
            "backend" => self.backend = value.parse()?,
            "rest_url" => self.rest_url = optional(value),
            "api_key" => self.api_key = optional(value),
            "log_file" => self.log_file = optional(value).map(PathBuf::from),
            _ => bail!(
                "Unknown config key '{}'. Valid keys: data_dir, backend, rest_url, api_key, log_file",
                key
            ),
        }
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with LINKHUB_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("linkhub")
            .join("config.toml")
    }

    /// Get the path to the SQLite database
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("linkhub.db")
    }

    /// Get the path to the session file
    pub fn session_path(&self) -> PathBuf {
        self.data_dir.join("session.toml")
    }
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("linkhub")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to serialize tests that touch environment variables
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Guard that locks env access and saves/restores env vars
    struct EnvGuard<'a> {
        _lock: std::sync::MutexGuard<'a, ()>,
        saved: Vec<(String, Option<String>)>,
    }

    impl<'a> EnvGuard<'a> {
        fn new(vars: &[&str]) -> Self {
            let lock = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
            let saved = vars
                .iter()
                .map(|&name| (name.to_string(), env::var(name).ok()))
                .collect();
            for name in vars {
                env::remove_var(name);
            }
            Self { _lock: lock, saved }
        }
    }

    impl Drop for EnvGuard<'_> {
        fn drop(&mut self) {
            for (name, value) in &self.saved {
                match value {
                    Some(v) => env::set_var(name, v),
                    None => env::remove_var(name),
                }
            }
        }
    }

    const ENV_VARS: &[&str] = &[
        "LINKHUB_DATA_DIR",
        "LINKHUB_BACKEND",
        "LINKHUB_REST_URL",
        "LINKHUB_API_KEY",
    ];

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend, BackendKind::Sqlite);
        assert!(config.rest_url.is_none());
        assert!(config.data_dir.ends_with("linkhub"));
    }

    #[test]
    fn test_file_paths() {
        let config = Config::default();
        assert!(config.sqlite_path().ends_with("linkhub.db"));
        assert!(config.session_path().ends_with("session.toml"));
    }

    #[test]
    fn test_env_override_data_dir() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("LINKHUB_DATA_DIR", "/tmp/linkhub-test");
        config.apply_env_overrides().unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/linkhub-test"));
    }

    #[test]
    fn test_env_override_backend() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("LINKHUB_BACKEND", "REST");
        config.apply_env_overrides().unwrap();
        assert_eq!(config.backend, BackendKind::Rest);

        env::set_var("LINKHUB_BACKEND", "postgres");
        assert!(config.apply_env_overrides().is_err());
    }

    #[test]
    fn test_env_override_rest_url() {
        let _guard = EnvGuard::new(ENV_VARS);

        let mut config = Config::default();
        env::set_var("LINKHUB_REST_URL", "https://project.example.co");
        config.apply_env_overrides().unwrap();
        assert_eq!(
            config.rest_url,
            Some("https://project.example.co".to_string())
        );

        // Empty string clears it
        env::set_var("LINKHUB_REST_URL", "");
        config.apply_env_overrides().unwrap();
        assert!(config.rest_url.is_none());
    }

    #[test]
    fn test_load_from_str() {
        let _guard = EnvGuard::new(ENV_VARS);

        let toml = r#"
            data_dir = "/custom/data"
            backend = "rest"
            rest_url = "https://project.example.co"
            api_key = "anon"
        "#;

        let config = Config::load_from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/custom/data"));
        assert_eq!(config.backend, BackendKind::Rest);
        assert_eq!(config.api_key, Some("anon".to_string()));
    }

    #[test]
    fn test_load_from_path_missing_file() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        env::set_var("LINKHUB_DATA_DIR", temp_dir.path().join("data"));

        let path = PathBuf::from("/nonexistent/config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.backend, BackendKind::Sqlite);
        assert!(config.data_dir.exists());
    }

    #[test]
    fn test_save_and_reload() {
        let _guard = EnvGuard::new(ENV_VARS);
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut config = Config {
            data_dir: temp_dir.path().join("data"),
            ..Config::default()
        };
        config.set("backend", "rest").unwrap();
        config.set("rest_url", "https://project.example.co").unwrap();
        config.save_to_path(&path).unwrap();

        let loaded = Config::load_from_path(&path).unwrap();
        assert_eq!(loaded.backend, BackendKind::Rest);
        assert_eq!(loaded.rest_url, config.rest_url);
    }

    #[test]
    fn test_set_unknown_key() {
        let mut config = Config::default();
        let err = config.set("sync_url", "x").unwrap_err();
        assert!(err.to_string().contains("Unknown config key"));
    }
}
