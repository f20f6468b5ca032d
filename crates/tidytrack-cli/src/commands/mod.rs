pub mod cache;
pub mod session;

use anyhow::Result;
use tidytrack_application::AppContext;
use tidytrack_infrastructure::{AppConfig, TrackerPaths};

/// Wires the application against the platform directories.
pub fn build_context(config: AppConfig) -> Result<AppContext> {
    Ok(AppContext::from_config(config, &TrackerPaths::new(None))?)
}
