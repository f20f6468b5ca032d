//! Application configuration.
//!
//! Loaded from `config.toml`:
//!
//! ```toml
//! [storage]
//! backend = "sqlite"   # or "blob"
//! data_dir = "/somewhere/else"
//!
//! [offline]
//! cache_version = "session-tracker-v2"
//! static_assets = ["/", "/index.html"]
//! ```
//!
//! Every key is optional. Unset offline keys fall back to the offline
//! layer's own defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tidytrack_core::error::{Result, TrackerError};

/// Which storage adapter backs the repositories.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Structured store (SQLite).
    #[default]
    Sqlite,
    /// Flat key-value blob store (JSON files).
    Blob,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StorageBackend::Sqlite),
            "blob" => Ok(StorageBackend::Blob),
            other => Err(format!(
                "unknown storage backend '{}' (expected 'sqlite' or 'blob')",
                other
            )),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Sqlite => f.write_str("sqlite"),
            StorageBackend::Blob => f.write_str("blob"),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct OfflineSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_assets: Option<Vec<String>>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageSettings,
    pub offline: OfflineSettings,
}

impl AppConfig {
    /// Loads the configuration from `path`.
    ///
    /// A missing or empty file yields the defaults; a file that exists but
    /// cannot be read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(TrackerError::config(format!(
                    "Failed to read config file at {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(toml::from_str(&content)?)
    }
}
