//! Error types for the offline cache.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OfflineError {
    /// The network could not be reached, or the request never produced a
    /// response.
    #[error("Network error: {0}")]
    Network(String),

    /// Precaching the static assets failed; the worker is not installed.
    #[error("Install failed: {0}")]
    Install(String),

    /// The cache storage itself failed.
    #[error("Cache error: {0}")]
    Cache(String),
}

impl OfflineError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn install(message: impl Into<String>) -> Self {
        Self::Install(message.into())
    }

    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for OfflineError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OfflineError>;
