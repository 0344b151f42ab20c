//! Configuration Module
//!
//! This module defines all configuration structures for the ledger.
//! Configuration is loaded from TOML files and parsed using serde.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main configuration structure
///
/// Loaded from a TOML file (e.g., config/default.toml).
///
/// # Example TOML
/// ```toml
/// [ledger]
/// genesis_path = "config/genesis.json"
/// max_epoch_size = 0
/// report_rejections = true
///
/// [logging]
/// filter = "info"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ledger processing configuration
///
/// # Fields
/// - `genesis_path`: JSON ledger file holding the starting pool and the epochs to apply
/// - `max_epoch_size`: Maximum candidates considered per epoch, 0 for no limit
/// - `report_rejections`: Log every rejected candidate with its reason
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    pub genesis_path: String,
    #[serde(default)]
    pub max_epoch_size: usize,
    #[serde(default = "default_true")]
    pub report_rejections: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            genesis_path: "config/genesis.json".to_string(),
            max_epoch_size: 0,
            report_rejections: true,
        }
    }
}

/// Logging configuration
///
/// `filter` uses the `tracing_subscriber::EnvFilter` syntax, e.g. `"info"` or
/// `"ledger=debug"`. `RUST_LOG` takes precedence when set.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully loaded and parsed
    /// * `Err` if the file couldn't be read or the TOML is invalid
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
