//! Configuration management for Relay.
//!
//! Loads configuration from ${RELAY_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `backend_url`.
pub const BACKEND_URL_ENV: &str = "RELAY_BACKEND_URL";

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// This ensures new comments/sections from the template are always present,
/// while preserving user's customized values.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;

    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for Relay configuration and data directories.
    //!
    //! RELAY_HOME resolution order:
    //! 1. RELAY_HOME environment variable (if set)
    //! 2. ~/.config/relay (default)
    //! 3. ./.relay when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the Relay home directory.
    pub fn relay_home() -> PathBuf {
        if let Ok(home) = std::env::var("RELAY_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".relay"),
            |h| h.join(".config").join("relay"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        relay_home().join("config.toml")
    }

    /// Returns the directory holding dashboard log files.
    pub fn logs_dir() -> PathBuf {
        relay_home().join("logs")
    }
}

/// Status polling configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Consecutive failed polls before polling is abandoned (0 = never).
    pub max_consecutive_failures: u32,
}

impl PollConfig {
    /// Failure ceiling, `None` when polling is unbounded.
    pub fn max_consecutive_failures(&self) -> Option<u32> {
        (self.max_consecutive_failures > 0).then_some(self.max_consecutive_failures)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive when `RELAY_LOG` is unset.
    pub level: String,
    /// Dashboard log file; defaults to `$RELAY_HOME/logs/relay.log`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the relay service.
    pub backend_url: String,

    /// Interval between status polls in milliseconds.
    pub poll_interval_ms: u64,

    /// Timeout for a single HTTP request in seconds (0 disables).
    pub request_timeout_secs: u64,

    /// `max_agents` sent when starting a conference chain.
    pub conference_max_agents: u32,

    #[serde(default)]
    pub poll: PollConfig,

    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    pub const DEFAULT_BACKEND_URL: &'static str = "https://web-production-2816f.up.railway.app";
    const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
    /// Default is disabled
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 0;
    const DEFAULT_CONFERENCE_MAX_AGENTS: u32 = 20;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Applies `RELAY_BACKEND_URL` on top of the loaded values.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                self.backend_url = trimmed.to_string();
            }
        }
        self
    }

    /// Returns the backend URL without a trailing slash.
    pub fn effective_backend_url(&self) -> &str {
        let trimmed = self.backend_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            Self::DEFAULT_BACKEND_URL
        } else {
            trimmed
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.request_timeout_secs))
        }
    }

    /// Returns the dashboard log file path.
    pub fn log_file(&self) -> PathBuf {
        self.log
            .file
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or_else(|| paths::logs_dir().join("relay.log"), PathBuf::from)
    }

    /// Saves only the backend_url field to a specific config file path.
    ///
    /// Creates the file with default template if it doesn't exist.
    /// If file exists, merges user values into the latest template.
    pub fn save_backend_url_to(path: &Path, url: &str) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["backend_url"] = value(url.trim());

        Self::write_config(path, &doc.to_string())
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Generates a fresh config TOML from Rust defaults.
    ///
    /// Uses the embedded template for structure/comments and merges
    /// generated values from `Config::default()` into it.
    pub fn generate() -> Result<String> {
        let generated_toml = toml::to_string(&Config::default())
            .context("Failed to serialize default config to TOML")?;
        merge_with_template(&generated_toml)
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: Self::DEFAULT_BACKEND_URL.to_string(),
            poll_interval_ms: Self::DEFAULT_POLL_INTERVAL_MS,
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            conference_max_agents: Self::DEFAULT_CONFERENCE_MAX_AGENTS,
            poll: PollConfig::default(),
            log: LogConfig::default(),
        }
    }
}
