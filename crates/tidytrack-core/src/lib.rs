//! Domain layer for Tidytrack.
//!
//! Entities, the error taxonomy and the ports (repository and service traits)
//! that the application layer drives. Nothing in this crate touches storage,
//! the clock or the network directly.

pub mod camera;
pub mod error;
pub mod picture;
pub mod repository;
pub mod service;
pub mod session;

// Re-export common error type
pub use error::{Result, TrackerError};
