//! Camera capability port.
//!
//! The use cases only consume encoded image strings and never depend on how
//! they were produced. A device implementing this trait is what a UI layer
//! wires up to feed `start_session`/`end_session`.

use crate::error::Result;
use async_trait::async_trait;

/// A device that can capture still frames as encoded image strings.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Acquires access to the live video source.
    async fn initialize(&self) -> Result<()>;

    /// Captures the current frame as an encoded image string.
    ///
    /// Fails if the device has not been initialized.
    async fn take_picture(&self) -> Result<String>;

    /// Releases the video source. Safe to call when not initialized.
    async fn stop(&self);
}
