//! Path management for Tidytrack configuration and data files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/tidytrack/        # Config directory
//! └── config.toml             # Application configuration
//!
//! ~/.local/share/tidytrack/   # Data directory
//! ├── tidytrack.db            # Structured store (sqlite backend)
//! └── blobs/                  # Flat blob store (blob backend)
//!     ├── sessions.json
//!     ├── comments.json
//!     └── pictures.json
//! ```
//!
//! With a base directory override (used by tests and `--data-dir`), both the
//! config and the data directory resolve to that base.

use std::path::{Path, PathBuf};
use tidytrack_core::error::{Result, TrackerError};

const APP_DIR: &str = "tidytrack";

/// Resolves Tidytrack's config and data locations.
#[derive(Debug, Clone, Default)]
pub struct TrackerPaths {
    base_dir: Option<PathBuf>,
}

impl TrackerPaths {
    /// Creates a resolver. `None` uses the platform directories.
    pub fn new(base_dir: Option<&Path>) -> Self {
        Self {
            base_dir: base_dir.map(Path::to_path_buf),
        }
    }

    /// Returns the configuration directory (e.g. `~/.config/tidytrack/`).
    pub fn config_dir(&self) -> Result<PathBuf> {
        if let Some(base) = &self.base_dir {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| TrackerError::config("Cannot find config directory"))
    }

    /// Returns the data directory (e.g. `~/.local/share/tidytrack/`).
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(base) = &self.base_dir {
            return Ok(base.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| TrackerError::config("Cannot find data directory"))
    }

    /// Returns the path to `config.toml`.
    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the structured store's database file.
    pub fn database_file(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("tidytrack.db"))
    }

    /// Returns the blob store directory.
    pub fn blob_dir(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join("blobs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_dir_override() {
        let paths = TrackerPaths::new(Some(Path::new("/tmp/tt")));

        assert_eq!(
            paths.config_file().unwrap(),
            PathBuf::from("/tmp/tt/config.toml")
        );
        assert_eq!(
            paths.database_file().unwrap(),
            PathBuf::from("/tmp/tt/tidytrack.db")
        );
        assert_eq!(paths.blob_dir().unwrap(), PathBuf::from("/tmp/tt/blobs"));
    }
}
