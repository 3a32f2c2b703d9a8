//! Configuration management for the autogather host.
//!
//! This module handles loading and validation of the host configuration from
//! a TOML file, and applying command-line overrides on top of it.

use plugin_autogather::{AutogatherError, GatherSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::CliArgs;

fn default_cache_file() -> PathBuf {
    PathBuf::from("resources.json")
}

fn default_names_file() -> PathBuf {
    PathBuf::from("names.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Application configuration loaded from TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Timing and distance tuning for the gather loop
    #[serde(default)]
    pub gather: GatherSettings,
    /// Locations of the node cache and name table
    #[serde(default)]
    pub paths: PathSettings,
    /// Logging configuration settings
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Files read and written by the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSettings {
    /// Persisted node location cache (read at startup, written on changes)
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,
    /// Static resource and zone name table
    #[serde(default = "default_names_file")]
    pub names_file: PathBuf,
}

/// Logging system configuration.
///
/// Controls log output format and level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Whether to output logs in JSON format
    #[serde(default)]
    pub json_format: bool,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            cache_file: default_cache_file(),
            names_file: default_names_file(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from a TOML file.
    ///
    /// If the file doesn't exist, creates a default configuration file at the
    /// specified path and returns the default configuration. A file that exists
    /// but does not parse is a fatal [`AutogatherError::ConfigLoad`].
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    pub async fn load_from_file(path: &Path) -> Result<Self, AutogatherError> {
        let load_err = |reason: String| AutogatherError::ConfigLoad {
            path: path.to_path_buf(),
            reason,
        };

        if path.exists() {
            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| load_err(e.to_string()))?;
            toml::from_str(&content).map_err(|e| load_err(e.to_string()))
        } else {
            let default_config = AppConfig::default();
            let toml_content = toml::to_string_pretty(&default_config).map_err(|e| load_err(e.to_string()))?;
            tokio::fs::write(path, toml_content)
                .await
                .map_err(|e| load_err(e.to_string()))?;
            info!("Created default configuration file: {}", path.display());
            Ok(default_config)
        }
    }

    /// Applies command-line overrides on top of the file values.
    pub fn apply_cli(&mut self, args: &CliArgs) {
        if let Some(cache) = &args.cache_file {
            self.paths.cache_file = cache.clone();
        }
        if let Some(names) = &args.names_file {
            self.paths.names_file = names.clone();
        }
        if let Some(level) = &args.log_level {
            self.logging.level = level.clone();
        }
        if args.json_logs {
            self.logging.json_format = true;
        }
    }

    /// Validates the configuration for consistency and correctness.
    ///
    /// # Returns
    ///
    /// `Ok(())` if the configuration is valid, or an error string describing the issue.
    pub fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid log level: {}. Must be one of: {valid_levels:?}",
                &self.logging.level
            ));
        }

        if self.gather.channel_reply_timeout_ms == 0 {
            return Err("gather.channel_reply_timeout_ms must be greater than 0".to_string());
        }

        if self.paths.cache_file.as_os_str().is_empty() {
            return Err("Cache file path cannot be empty".to_string());
        }
        if self.paths.names_file.as_os_str().is_empty() {
            return Err("Names file path cannot be empty".to_string());
        }

        Ok(())
    }
}
