//! Configuration System
//!
//! Handles loading rendering configuration from files and environment
//! variables. Supports TOML config files and environment variable overrides.

use crate::render::OutputFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub graph: GraphConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Value rendering configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Format used when a caller does not ask for one
    #[serde(default)]
    pub format: OutputFormat,
}

/// Graph rendering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    /// Name of the emitted `digraph`
    #[serde(default = "default_graph_name")]
    pub name: String,
}

fn default_graph_name() -> String {
    "query".to_string()
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            name: default_graph_name(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("promview").join("config.toml")),
            Some(PathBuf::from("./promview.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(format) = lookup("PROMVIEW_OUTPUT_FORMAT") {
            match OutputFormat::from_str(&format) {
                Some(format) => self.output.format = format,
                None => tracing::warn!("Ignoring unknown output format {:?}", format),
            }
        }

        if let Some(name) = lookup("PROMVIEW_GRAPH_NAME") {
            self.graph.name = name;
        }

        if let Some(level) = lookup("PROMVIEW_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("PROMVIEW_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Promview Configuration
#
# Environment variables override these settings:
# - PROMVIEW_OUTPUT_FORMAT
# - PROMVIEW_GRAPH_NAME
# - PROMVIEW_LOG_LEVEL
# - PROMVIEW_LOG_FORMAT

[output]
# Default format for evaluated values: text or json
format = "text"

[graph]
# Name of the emitted DOT digraph
name = "query"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
