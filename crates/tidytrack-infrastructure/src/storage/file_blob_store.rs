//! File-backed blob store with atomic writes.

use super::BlobStore;
use async_trait::async_trait;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tidytrack_core::error::{Result, TrackerError};

/// A blob store keeping one file per key under a directory.
///
/// Provides:
/// - **Atomicity**: each value is written to a uniquely named temp file, fsynced,
///   then renamed over the target
/// - **Isolation**: writers hold an exclusive `fs2` lock on a sidecar lock file
///
/// The lock file is never removed. Deleting it while held would let the next
/// writer lock a fresh inode alongside the current holder.
///
/// Keys are restricted to ASCII letters, digits, `-` and `_` so they map
/// directly to file names.
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            let message = format!("Invalid blob key: '{}'", key);
            return Err(TrackerError::storage(message));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let value = value.to_string();
        tokio::task::spawn_blocking(move || write_atomic(&path, &value))
            .await
            .map_err(|e| TrackerError::storage(format!("Blob write task failed: {}", e)))?
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::task::spawn_blocking(move || {
            let _lock = FileLock::acquire(&path)?;
            match fs::remove_file(&path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(|e| TrackerError::storage(format!("Blob remove task failed: {}", e)))?
    }
}

/// Writes `content` to `path` via temp file + rename under an exclusive lock.
fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| TrackerError::io("Path has no parent directory"))?;
    fs::create_dir_all(parent)?;

    let _lock = FileLock::acquire(path)?;

    let mut tmp_file = NamedTempFile::new_in(parent)?;
    tmp_file.write_all(content.as_bytes())?;
    tmp_file.as_file().sync_all()?;
    tmp_file
        .persist(path)
        .map_err(|e| TrackerError::from(e.error))?;
    Ok(())
}

/// Exclusive lock on `<path>.lock`, released when the handle closes.
struct FileLock {
    _file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()
            .map_err(|e| TrackerError::storage(format!("Failed to acquire lock: {}", e)))?;

        Ok(FileLock { _file: file })
    }
}
