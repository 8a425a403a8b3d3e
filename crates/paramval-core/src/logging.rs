//! Logging setup for applications embedding the engine
//!
//! The library itself only emits `tracing` events:
//! - `debug` when fragments are registered and validators compiled
//! - `trace` for per-request parse and validation outcomes
//! - `warn` for ignored or unsupported inputs
//!
//! [`init_logging`] installs a global subscriber for binaries and tests
//! that do not bring their own.

use crate::config::{LogFormat, LoggingConfig};
use crate::error::{Error, Result};
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

/// Initialize the global logging system
///
/// Fails with a configuration error when the filter is invalid or a global
/// subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = create_env_filter(config)?;
    let ansi = std::io::stderr().is_terminal();

    // Use different subscriber based on format to avoid type conflicts
    let installed = match config.format {
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_ansi(ansi)
                .with_writer(std::io::stderr)
                .with_thread_ids(config.thread_ids)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .compact()
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_ansi(false) // JSON should not have ANSI codes
                .with_writer(std::io::stderr)
                .with_thread_ids(config.thread_ids)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .json()
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        LogFormat::Full => {
            let subscriber = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(true)
                .with_ansi(ansi)
                .with_writer(std::io::stderr)
                .with_thread_ids(config.thread_ids)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    };

    installed.map_err(|e| Error::Configuration {
        message: "Failed to initialize logging".to_string(),
        source: Some(anyhow::Error::new(e)),
    })?;

    tracing::debug!(config = ?config, "Logging system initialized");
    Ok(())
}

/// Create environment filter based on configuration
///
/// `RUST_LOG` takes precedence over the configured level.
fn create_env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.level).map_err(|e| Error::Configuration {
        message: format!("Invalid log filter '{}'", config.level),
        source: Some(anyhow::Error::new(e)),
    })
}
