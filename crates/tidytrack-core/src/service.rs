//! Service ports for time and identity.
//!
//! Use cases never read the system clock or generate identifiers themselves;
//! they go through these traits so tests can pin both.

use chrono::{DateTime, Utc};

/// Source of the current instant.
pub trait TimeService: Send + Sync {
    /// Returns the current instant.
    fn current_time(&self) -> DateTime<Utc>;
}

/// Source of opaque unique identifiers.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier that has never been returned before.
    fn generate(&self) -> String;
}
