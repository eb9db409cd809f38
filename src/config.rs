//! Configuration module for docr
//!
//! Manages application configuration: engine limits, history policy, the
//! adapter table overrides, and per-domain adapter bindings. Configuration
//! is stored in the user's config directory and created with defaults on
//! first run.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use config::{Config, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::engine::HistoryMode;

/// Binds a domain key (e.g. a file type) to a base adapter
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DomainBinding {
    /// Name of the base adapter to use for this domain
    pub adapter: String,

    /// Extra arguments merged onto the base adapter's template
    #[serde(default)]
    pub extra_args: Vec<String>,
}

/// User override applied onto a built-in base adapter
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AdapterOverride {
    /// Replace the argument template entirely
    #[serde(default)]
    pub args: Option<Vec<String>>,

    /// Environment assignments added to (or replacing) the adapter's own
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Additional error-indicating output patterns (regex)
    #[serde(default)]
    pub error_patterns: Vec<String>,
}

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DocrConfig {
    /// Concurrency ceiling for asynchronous backend processes
    #[serde(default = "defaults::max_async_jobs")]
    pub max_async_jobs: usize,

    /// How many disambiguation options to prefetch per list
    #[serde(default = "defaults::max_prefetch_options")]
    pub max_prefetch_options: usize,

    /// Which UI transitions are recorded in back/forward history
    #[serde(default)]
    pub history_mode: HistoryMode,

    /// Treat the first disambiguation option as immediately chosen
    #[serde(default)]
    pub auto_select_first_match: bool,

    /// Run content fetches and prefetches asynchronously
    #[serde(default = "defaults::enabled")]
    pub async_enabled: bool,

    /// Adapter used for domains without an explicit binding
    #[serde(default = "defaults::default_adapter")]
    pub default_adapter: String,

    /// Suppress informational output by default
    #[serde(default)]
    pub quiet: bool,

    /// Map of domain keys to adapter bindings
    #[serde(default)]
    pub domains: HashMap<String, DomainBinding>,

    /// Per-adapter overrides, keyed by base adapter name
    #[serde(default)]
    pub adapters: HashMap<String, AdapterOverride>,
}

mod defaults {
    pub fn max_async_jobs() -> usize {
        4
    }
    pub fn max_prefetch_options() -> usize {
        5
    }
    pub fn enabled() -> bool {
        true
    }
    pub fn default_adapter() -> String {
        "man".to_string()
    }
}

impl Default for DocrConfig {
    fn default() -> Self {
        Self {
            max_async_jobs: defaults::max_async_jobs(),
            max_prefetch_options: defaults::max_prefetch_options(),
            history_mode: HistoryMode::default(),
            auto_select_first_match: false,
            async_enabled: defaults::enabled(),
            default_adapter: defaults::default_adapter(),
            quiet: false,
            domains: HashMap::new(),
            adapters: HashMap::new(),
        }
    }
}

impl DocrConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::Message("Could not determine config directory".to_string())
        })?;

        let docr_config_dir = config_dir.join("docr");
        Ok(docr_config_dir.join("config.toml"))
    }

    /// Load configuration from file, creating default if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file cannot be read, parsed, or created.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        let settings = Config::builder()
            .add_source(File::from(config_path).format(FileFormat::Toml))
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(&config_path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Set a scalar configuration value by key
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` for unknown keys or unparseable values.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "quiet" => self.quiet = parse_bool(key, value)?,
            "async_enabled" => self.async_enabled = parse_bool(key, value)?,
            "auto_select_first_match" => {
                self.auto_select_first_match = parse_bool(key, value)?;
            }
            "history_mode" => {
                self.history_mode = match value {
                    "unified" => HistoryMode::Unified,
                    "separate" => HistoryMode::Separate,
                    _ => {
                        return Err(ConfigError::Message(format!(
                            "history_mode must be 'unified' or 'separate', got '{value}'"
                        )));
                    }
                };
            }
            "max_async_jobs" => self.max_async_jobs = parse_usize(key, value)?,
            "max_prefetch_options" => self.max_prefetch_options = parse_usize(key, value)?,
            "default_adapter" => self.default_adapter = value.to_string(),
            _ => return Err(ConfigError::Message(format!("Unknown config key: {key}"))),
        }
        Ok(())
    }

    /// Get a scalar configuration value by key
    #[must_use]
    pub fn get_value(&self, key: &str) -> Option<String> {
        match key {
            "quiet" => Some(self.quiet.to_string()),
            "async_enabled" => Some(self.async_enabled.to_string()),
            "auto_select_first_match" => Some(self.auto_select_first_match.to_string()),
            "history_mode" => Some(
                match self.history_mode {
                    HistoryMode::Unified => "unified",
                    HistoryMode::Separate => "separate",
                }
                .to_string(),
            ),
            "max_async_jobs" => Some(self.max_async_jobs.to_string()),
            "max_prefetch_options" => Some(self.max_prefetch_options.to_string()),
            "default_adapter" => Some(self.default_adapter.clone()),
            _ => None,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Message(format!("{key} must be true or false, got '{value}'")))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Message(format!("{key} must be a number, got '{value}'")))
}
