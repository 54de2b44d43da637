//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/roster/config.toml)
//! 3. Environment variables (ROSTER_* prefix)
//!
//! Environment variables take precedence over config file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable prefix
const ENV_PREFIX: &str = "ROSTER";

/// Default remote directory API
pub const DEFAULT_API_URL: &str = "https://reqres.in/api";

/// Default base for stock avatar images
pub const DEFAULT_AVATAR_BASE: &str = "https://reqres.in/img/faces";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory for data storage (SQLite db)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Base URL of the remote directory API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Timeout for a single page fetch
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Whether to sync once when a session starts
    #[serde(default = "default_true")]
    pub sync_on_start: bool,

    /// Background sync interval for interactive sessions
    #[serde(default)]
    pub sync_interval_secs: Option<u64>,

    /// Base URL for avatars of locally added students
    #[serde(default = "default_avatar_base")]
    pub avatar_base: String,

    /// Log file path (used when ROSTER_LOG is set)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
            sync_on_start: true,
            sync_interval_secs: None,
            avatar_base: default_avatar_base(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (ROSTER_DATA_DIR, ROSTER_API_URL, ...)
    /// 2. Config file (~/.config/roster/config.toml or ROSTER_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path (e.g. `--config`)
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
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // ROSTER_DATA_DIR
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        // ROSTER_API_URL
        if let Ok(val) = std::env::var(format!("{}_API_URL", ENV_PREFIX)) {
            if !val.is_empty() {
                self.api_url = val;
            }
        }

        // ROSTER_SYNC_ON_START
        if let Ok(val) = std::env::var(format!("{}_SYNC_ON_START", ENV_PREFIX)) {
            self.sync_on_start = parse_bool(&val);
        }

        // ROSTER_SYNC_INTERVAL (seconds, empty or 0 disables)
        if let Ok(val) = std::env::var(format!("{}_SYNC_INTERVAL", ENV_PREFIX)) {
            self.sync_interval_secs = val.trim().parse().ok().filter(|secs| *secs > 0);
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Set a single value by key (as used by `roster config set`)
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "data_dir" => self.data_dir = PathBuf::from(value),
            "api_url" => self.api_url = value.trim_end_matches('/').to_string(),
            "request_timeout_secs" => {
                self.request_timeout_secs = value
                    .parse()
                    .with_context(|| format!("Invalid timeout: '{}'", value))?
            }
            "sync_on_start" => self.sync_on_start = parse_bool(value),
            "sync_interval_secs" => {
                self.sync_interval_secs = if value.is_empty() || value == "0" {
                    None
                } else {
                    Some(
                        value
                            .parse()
                            .with_context(|| format!("Invalid interval: '{}'", value))?,
                    )
                }
            }
            "avatar_base" => self.avatar_base = value.to_string(),
            "log_file" => {
                self.log_file = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                }
            }
            _ => anyhow::bail!(
                "Unknown config key '{}'. Valid keys: data_dir, api_url, request_timeout_secs, \
                 sync_on_start, sync_interval_secs, avatar_base, log_file",
                key
            ),
        }
        Ok(())
    }

    /// Save configuration to the default config file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path())
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with ROSTER_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("roster")
            .join("config.toml")
    }

    /// Get the path to the SQLite database
    pub fn sqlite_path(&self) -> PathBuf {
        self.data_dir.join("roster.db")
    }

    /// Get the default log file path
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("debug.log"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn sync_interval(&self) -> Option<Duration> {
        self.sync_interval_secs.map(Duration::from_secs)
    }
}

fn parse_bool(val: &str) -> bool {
    val.eq_ignore_ascii_case("true") || val == "1"
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("roster")
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_avatar_base() -> String {
    DEFAULT_AVATAR_BASE.to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}
