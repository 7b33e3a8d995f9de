//! Configuration loading
//!
//! Resolution priority for every setting:
//! 1. Environment variable (highest)
//! 2. TOML config file (`$REVA_CONFIG`, else the platform config dir)
//! 3. Compiled default (fallback)
//!
//! The classifier endpoint is deliberately a configuration value injected at
//! construction, never a compile-time constant.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Default upload ceiling: 200 MB, matching the ingestion entry contract.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// Service configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP bind address for the API server.
    pub bind_address: String,
    /// SQLite database file path.
    pub database_path: PathBuf,
    /// Base URL of the external classification service.
    pub classifier_base_url: String,
    /// Timeout for a single classifier round trip, in seconds.
    pub classifier_timeout_secs: u64,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_address: "127.0.0.1:5741".to_string(),
            database_path: default_database_path(),
            classifier_base_url: "http://127.0.0.1:8000".to_string(),
            classifier_timeout_secs: 60,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    /// Load configuration with the documented priority order.
    pub fn load() -> Result<Config> {
        let mut config = match config_file_path() {
            Some(path) if path.exists() => {
                let content = std::fs::read_to_string(&path)?;
                toml::from_str::<Config>(&content)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?
            }
            _ => Config::default(),
        };

        if let Ok(addr) = std::env::var("REVA_BIND_ADDRESS") {
            config.bind_address = addr;
        }
        if let Ok(db) = std::env::var("REVA_DATABASE_PATH") {
            config.database_path = PathBuf::from(db);
        }
        if let Ok(url) = std::env::var("REVA_CLASSIFIER_URL") {
            config.classifier_base_url = url;
        }
        if let Ok(raw) = std::env::var("REVA_CLASSIFIER_TIMEOUT_SECS") {
            config.classifier_timeout_secs = raw.parse().map_err(|_| {
                Error::Config(format!(
                    "REVA_CLASSIFIER_TIMEOUT_SECS is not a number: '{}'",
                    raw
                ))
            })?;
        }
        if let Ok(raw) = std::env::var("REVA_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = raw.parse().map_err(|_| {
                Error::Config(format!("REVA_MAX_UPLOAD_BYTES is not a number: '{}'", raw))
            })?;
        }

        if config.classifier_base_url.trim().is_empty() {
            return Err(Error::Config(
                "classifier_base_url must not be empty".to_string(),
            ));
        }

        Ok(config)
    }
}

/// Config file path: `$REVA_CONFIG` wins, else `<config dir>/reva/config.toml`.
fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("REVA_CONFIG") {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("reva").join("config.toml"))
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("reva").join("reva.db"))
        .unwrap_or_else(|| PathBuf::from("./reva.db"))
}
