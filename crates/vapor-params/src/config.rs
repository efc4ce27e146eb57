//! Parameter master configuration
//!
//! Loaded from TOML at startup, falls back to defaults if no config file
//! exists or it fails to parse.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use vapor_core::{Error, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterConfig {
    pub store: StoreConfig,
    pub notify: NotifyConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Remove every parameter and subscription before serving. Only has an
    /// effect on a persistent backend; the in-memory store starts empty.
    pub clean_on_start: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Upper bound on one delivery attempt in milliseconds. 0 disables it.
    pub delivery_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default tracing filter when RUST_LOG is unset.
    pub filter: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { clean_on_start: true }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self { delivery_timeout_ms: 5_000 }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { filter: "vapor=info".to_string() }
    }
}

impl NotifyConfig {
    pub fn delivery_timeout(&self) -> Option<Duration> {
        (self.delivery_timeout_ms > 0).then(|| Duration::from_millis(self.delivery_timeout_ms))
    }
}

// ============================================================
// Loading
// ============================================================

impl MasterConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("{} (using defaults)", e);
                Self::default()
            }
        }
    }

    /// Load config from a TOML file, reporting unreadable or malformed files.
    pub fn try_load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}
