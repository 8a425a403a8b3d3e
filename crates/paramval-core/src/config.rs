//! Engine configuration
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (YAML/JSON/TOML)
//! - Environment variables

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Some(ConfigFormat::Yaml),
            Some("json") => Some(ConfigFormat::Json),
            Some("toml") => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Validation settings
    pub validation: ValidationConfig,

    /// Raw value parsing settings
    pub parsing: ParsingConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Violations retained per schema failure (0 = unlimited)
    pub max_violations: usize,

    /// Stop evaluating an operation's parameters at the first failure
    pub fail_fast: bool,
}

/// Parsing configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Trim whitespace around delimited tokens
    pub trim_whitespace: bool,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive (trace, debug, info, warn, error)
    pub level: String,

    /// Log format
    pub format: LogFormat,

    /// Include thread IDs
    pub thread_ids: bool,

    /// Include file and line numbers
    pub source_location: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact format for production
    Compact,
    /// Full format with all details
    Full,
    /// JSON structured format
    Json,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_violations: 10,
            fail_fast: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            thread_ids: false,
            source_location: false,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            Error::configuration(format!(
                "Unsupported config format for '{}'. Expected .yaml, .yml, .json or .toml",
                path.display()
            ))
        })?;
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content, format)
    }

    /// Parse configuration content in the given format
    pub fn from_str(content: &str, format: ConfigFormat) -> Result<Self> {
        let parsed: std::result::Result<Self, anyhow::Error> = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content).map_err(anyhow::Error::from),
            ConfigFormat::Json => serde_json::from_str(content).map_err(anyhow::Error::from),
            ConfigFormat::Toml => toml::from_str(content).map_err(anyhow::Error::from),
        };
        parsed.map_err(|e| Error::Configuration {
            message: format!("Failed to parse {:?} configuration", format),
            source: Some(e),
        })
    }

    /// Apply environment overrides
    pub fn merge_with_env(&mut self) {
        // RUST_LOG is honoured by the subscriber filter itself
        if let Ok(level) = std::env::var("PARAMVAL_LOG") {
            self.logging.level = level;
        }

        if let Ok(format) = std::env::var("PARAMVAL_LOG_FORMAT") {
            match format.to_lowercase().as_str() {
                "compact" => self.logging.format = LogFormat::Compact,
                "full" => self.logging.format = LogFormat::Full,
                "json" => self.logging.format = LogFormat::Json,
                _ => tracing::warn!("Invalid log format: {}, using default", format),
            }
        }

        if let Ok(max) = std::env::var("PARAMVAL_MAX_VIOLATIONS") {
            match max.parse() {
                Ok(max) => self.validation.max_violations = max,
                Err(_) => tracing::warn!("Invalid PARAMVAL_MAX_VIOLATIONS: {}, ignoring", max),
            }
        }
    }
}
