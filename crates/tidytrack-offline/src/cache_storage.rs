//! Named response caches.

use crate::error::{OfflineError, Result};
use crate::request::{Request, Response};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// A set of named caches, each mapping a GET request's URL to a response.
///
/// Only GET requests are ever matched; any other method is a miss.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Creates the named cache if it does not exist yet.
    async fn open(&self, cache_name: &str) -> Result<()>;

    /// Looks the request up across every cache, oldest cache first.
    async fn match_request(&self, request: &Request) -> Result<Option<Response>>;

    /// Stores a response in the named cache, creating the cache if needed.
    async fn put(&self, cache_name: &str, request: &Request, response: Response) -> Result<()>;

    /// Deletes the named cache. Returns false if there was no such cache.
    async fn delete(&self, cache_name: &str) -> Result<bool>;

    /// Names of all caches, in creation order.
    async fn keys(&self) -> Result<Vec<String>>;
}

#[derive(Default)]
struct NamedCache {
    name: String,
    entries: HashMap<String, Response>,
}

/// Process-local cache storage.
#[derive(Default)]
pub struct MemoryCacheStorage {
    caches: RwLock<Vec<NamedCache>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> OfflineError {
    OfflineError::cache("cache storage lock poisoned")
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, cache_name: &str) -> Result<()> {
        let mut caches = self.caches.write().map_err(poisoned)?;
        if !caches.iter().any(|c| c.name == cache_name) {
            caches.push(NamedCache {
                name: cache_name.to_string(),
                entries: HashMap::new(),
            });
        }
        Ok(())
    }

    async fn match_request(&self, request: &Request) -> Result<Option<Response>> {
        if !request.is_get() {
            return Ok(None);
        }
        let caches = self.caches.read().map_err(poisoned)?;
        Ok(caches
            .iter()
            .find_map(|c| c.entries.get(&request.url))
            .cloned())
    }

    async fn put(&self, cache_name: &str, request: &Request, response: Response) -> Result<()> {
        if !request.is_get() {
            return Err(OfflineError::cache(format!(
                "Only GET requests can be cached, got {} {}",
                request.method, request.url
            )));
        }
        let mut caches = self.caches.write().map_err(poisoned)?;
        let index = match caches.iter().position(|c| c.name == cache_name) {
            Some(index) => index,
            None => {
                caches.push(NamedCache {
                    name: cache_name.to_string(),
                    entries: HashMap::new(),
                });
                caches.len() - 1
            }
        };
        caches[index].entries.insert(request.url.clone(), response);
        Ok(())
    }

    async fn delete(&self, cache_name: &str) -> Result<bool> {
        let mut caches = self.caches.write().map_err(poisoned)?;
        let before = caches.len();
        caches.retain(|c| c.name != cache_name);
        Ok(caches.len() != before)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let caches = self.caches.read().map_err(poisoned)?;
        Ok(caches.iter().map(|c| c.name.clone()).collect())
    }
}
