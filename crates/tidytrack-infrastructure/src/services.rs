//! Production implementations of the time and identifier ports.

use chrono::{DateTime, Utc};
use tidytrack_core::service::{IdGenerator, TimeService};
use uuid::Uuid;

/// Reads the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTimeService;

impl TimeService for SystemTimeService {
    fn current_time(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Generates random (v4) UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
