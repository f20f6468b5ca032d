//! File-backed camera device.
//!
//! Stands in for a live camera when there is none: "capturing" reads an image
//! file and encodes it the way a browser canvas would, as a `data:` URL.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tidytrack_core::camera::CameraDevice;
use tidytrack_core::error::{Result, TrackerError};

/// A [`CameraDevice`] whose "frame" is the content of an image file.
pub struct FileCameraDevice {
    path: PathBuf,
    initialized: AtomicBool,
}

impl FileCameraDevice {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            initialized: AtomicBool::new(false),
        }
    }
}

/// Encodes raw image bytes as a `data:<mime>;base64,...` URL.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Splits a `data:` URL back into its mime type and decoded bytes.
///
/// Returns `None` for anything that is not a base64 `data:` URL.
pub fn decode_data_url(data_url: &str) -> Option<(String, Vec<u8>)> {
    let rest = data_url.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((mime.to_string(), bytes))
}

#[async_trait]
impl CameraDevice for FileCameraDevice {
    async fn initialize(&self) -> Result<()> {
        let metadata = tokio::fs::metadata(&self.path).await.map_err(|e| {
            TrackerError::io(format!(
                "Could not access camera source {}: {}",
                self.path.display(),
                e
            ))
        })?;
        if !metadata.is_file() {
            return Err(TrackerError::io(format!(
                "Camera source is not a file: {}",
                self.path.display()
            )));
        }
        self.initialized.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn take_picture(&self) -> Result<String> {
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(TrackerError::invalid_state("Camera not initialized"));
        }
        let bytes = tokio::fs::read(&self.path).await?;
        let mime = mime_guess::from_path(&self.path).first_or_octet_stream();
        tracing::debug!(
            "Captured {} bytes ({}) from {}",
            bytes.len(),
            mime,
            self.path.display()
        );
        Ok(encode_data_url(mime.essence_str(), &bytes))
    }

    async fn stop(&self) {
        self.initialized.store(false, Ordering::SeqCst);
    }
}
