//! Offline request caching for the Tidytrack front end.
//!
//! [`OfflineCache`] sits between a client and the network. It precaches a
//! manifest of static assets on install, evicts caches from older versions on
//! activate, and serves each request with one of three fixed strategies
//! (see [`Strategy`]).
//!
//! The network, the cache storage and the set of controlled clients are
//! ports, so the cache runs the same against `reqwest` and against test
//! doubles.

pub mod cache_storage;
pub mod clients;
pub mod error;
pub mod fetcher;
pub mod offline_cache;
pub mod request;
pub mod strategy;

pub use cache_storage::{CacheStorage, MemoryCacheStorage};
pub use clients::{ClientController, LocalClients};
pub use error::{OfflineError, Result};
pub use fetcher::{Fetcher, HttpFetcher};
pub use offline_cache::{
    DEFAULT_CACHE_VERSION, DEFAULT_STATIC_ASSETS, OfflineCache, OfflineConfig, WorkerState,
};
pub use request::{Request, Response};
pub use strategy::Strategy;
