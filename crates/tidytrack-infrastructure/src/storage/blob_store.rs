//! Blob store port and its in-memory implementation.

use async_trait::async_trait;
use std::collections::HashMap;
use tidytrack_core::error::Result;
use tokio::sync::RwLock;

/// A string key -> string value store.
///
/// Mirrors the capabilities of browser local storage: whole values are read
/// and written, nothing else.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns the value under `key`, or `None` if nothing was stored.
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the value under `key`. Removing a missing key succeeds.
    async fn remove_item(&self, key: &str) -> Result<()>;
}

/// Process-local blob store, used in tests and for throwaway runs.
#[derive(Default)]
pub struct MemoryBlobStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.read().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        self.items.write().await.remove(key);
        Ok(())
    }
}
