//! The request-intercepting offline cache.
//!
//! # Lifecycle
//!
//! ```text
//!   new ──install()──> Installed ──activate()──> Activated
//!    │                                  (old caches evicted, clients claimed)
//!    └──install() fails──> stays Pending
//! ```
//!
//! Requests are served in any state; activation only decides which caches
//! survive and whether clients are controlled.

use crate::cache_storage::CacheStorage;
use crate::clients::ClientController;
use crate::error::{OfflineError, Result};
use crate::fetcher::Fetcher;
use crate::request::{Request, Response};
use crate::strategy::Strategy;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const DEFAULT_CACHE_VERSION: &str = "session-tracker-v1";

pub const DEFAULT_STATIC_ASSETS: &[&str] = &[
    "/",
    "/index.html",
    "/manifest.json",
    "/vite.svg",
    "/assets/index.js",
    "/assets/index.css",
];

/// Cache version and precache manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineConfig {
    /// Name of the cache owned by this version. Activation deletes all others.
    pub cache_version: String,
    /// Paths fetched on install and served cache-first afterwards.
    pub static_assets: Vec<String>,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            cache_version: DEFAULT_CACHE_VERSION.to_string(),
            static_assets: DEFAULT_STATIC_ASSETS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Pending,
    Installed,
    Activated,
}

pub struct OfflineCache {
    config: OfflineConfig,
    fetcher: Arc<dyn Fetcher>,
    storage: Arc<dyn CacheStorage>,
    clients: Arc<dyn ClientController>,
    state: Mutex<WorkerState>,
}

impl OfflineCache {
    pub fn new(
        config: OfflineConfig,
        fetcher: Arc<dyn Fetcher>,
        storage: Arc<dyn CacheStorage>,
        clients: Arc<dyn ClientController>,
    ) -> Self {
        Self {
            config,
            fetcher,
            storage,
            clients,
            state: Mutex::new(WorkerState::Pending),
        }
    }

    pub fn config(&self) -> &OfflineConfig {
        &self.config
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.lock().await
    }

    /// Precaches every manifest entry into the current version's cache.
    ///
    /// All entries are fetched before anything is written. A fetch error or a
    /// non-2xx status for any entry fails the install and caches nothing.
    pub async fn install(&self) -> Result<()> {
        let cache_name = &self.config.cache_version;
        self.storage.open(cache_name).await?;

        let requests: Vec<Request> = self
            .config
            .static_assets
            .iter()
            .map(Request::get)
            .collect();

        let responses = futures::future::try_join_all(requests.iter().map(|request| async move {
            let response = self.fetcher.fetch(request).await.map_err(|e| {
                OfflineError::install(format!("Failed to fetch {}: {}", request.url, e))
            })?;
            if !response.is_success() {
                return Err(OfflineError::install(format!(
                    "Request for {} returned status {}",
                    request.url, response.status
                )));
            }
            Ok(response)
        }))
        .await?;

        for (request, response) in requests.iter().zip(responses) {
            self.storage.put(cache_name, request, response).await?;
        }

        *self.state.lock().await = WorkerState::Installed;
        tracing::info!(
            "Installed offline cache {} ({} assets)",
            cache_name,
            requests.len()
        );
        Ok(())
    }

    /// Deletes every cache but the current version's, then claims clients.
    ///
    /// Fails if the cache has not been installed.
    pub async fn activate(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if *state == WorkerState::Pending {
            return Err(OfflineError::install(
                "Cannot activate before a successful install",
            ));
        }

        let mut evicted = 0;
        for name in self.storage.keys().await? {
            if name != self.config.cache_version && self.storage.delete(&name).await? {
                tracing::debug!("Deleted stale cache {}", name);
                evicted += 1;
            }
        }

        self.clients.claim().await?;
        *state = WorkerState::Activated;

        tracing::info!(
            "Activated offline cache {} ({} stale caches removed)",
            self.config.cache_version,
            evicted
        );
        Ok(())
    }

    /// Installs and immediately activates.
    pub async fn start(&self) -> Result<()> {
        self.install().await?;
        self.activate().await
    }

    /// The strategy `request` will be served with.
    pub fn strategy_for(&self, request: &Request) -> Strategy {
        Strategy::classify(request, &self.config.static_assets)
    }

    /// Serves an intercepted request.
    pub async fn handle(&self, request: &Request) -> Result<Response> {
        let strategy = self.strategy_for(request);
        tracing::debug!("{} {} via {}", request.method, request.url, strategy);

        match strategy {
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::CacheFirst => self.cache_first(request).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request).await,
        }
    }

    async fn network_first(&self, request: &Request) -> Result<Response> {
        match self.fetcher.fetch(request).await {
            Ok(response) => Ok(response),
            Err(e) => match self.storage.match_request(request).await? {
                Some(cached) => {
                    tracing::debug!("Network failed for {}, serving cached copy", request.url);
                    Ok(cached)
                }
                None => Err(e),
            },
        }
    }

    async fn cache_first(&self, request: &Request) -> Result<Response> {
        if let Some(cached) = self.storage.match_request(request).await? {
            return Ok(cached);
        }
        self.fetcher.fetch(request).await
    }

    async fn stale_while_revalidate(&self, request: &Request) -> Result<Response> {
        if let Some(cached) = self.storage.match_request(request).await? {
            self.spawn_revalidation(request.clone());
            return Ok(cached);
        }

        let response = self.fetcher.fetch(request).await?;
        if let Err(e) = self
            .storage
            .put(&self.config.cache_version, request, response.clone())
            .await
        {
            tracing::debug!("Failed to cache {}: {}", request.url, e);
        }
        Ok(response)
    }

    fn spawn_revalidation(&self, request: Request) {
        let fetcher = Arc::clone(&self.fetcher);
        let storage = Arc::clone(&self.storage);
        let cache_name = self.config.cache_version.clone();

        tokio::spawn(async move {
            let fresh = match fetcher.fetch(&request).await {
                Ok(fresh) => fresh,
                Err(e) => {
                    tracing::debug!("Revalidation of {} failed: {}", request.url, e);
                    return;
                }
            };
            match storage.put(&cache_name, &request, fresh).await {
                Ok(()) => tracing::debug!("Revalidated {}", request.url),
                Err(e) => tracing::debug!("Failed to store revalidated {}: {}", request.url, e),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache_storage::MemoryCacheStorage;
    use crate::clients::LocalClients;
    use async_trait::async_trait;
    use reqwest::Method;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Serves canned bodies, counts calls, and can be switched offline.
    #[derive(Default)]
    struct MockFetcher {
        bodies: StdMutex<HashMap<String, (u16, String)>>,
        offline: AtomicBool,
        calls: AtomicUsize,
    }

    impl MockFetcher {
        fn serving(paths: &[&str]) -> Self {
            let fetcher = Self::default();
            for path in paths {
                fetcher.set(path, 200, &format!("body of {}", path));
            }
            fetcher
        }

        fn set(&self, url: &str, status: u16, body: &str) {
            self.bodies
                .lock()
                .unwrap()
                .insert(url.to_string(), (status, body.to_string()));
        }

        fn go_offline(&self) {
            self.offline.store(true, Ordering::SeqCst);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for MockFetcher {
        async fn fetch(&self, request: &Request) -> Result<Response> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                return Err(OfflineError::network("offline"));
            }
            let bodies = self.bodies.lock().unwrap();
            Ok(match bodies.get(&request.url) {
                Some((status, body)) => Response::new(*status, body.as_bytes()),
                None => Response::new(404, "not found"),
            })
        }
    }

    struct Harness {
        cache: OfflineCache,
        fetcher: Arc<MockFetcher>,
        storage: Arc<MemoryCacheStorage>,
        clients: Arc<LocalClients>,
    }

    fn harness(fetcher: MockFetcher) -> Harness {
        let fetcher = Arc::new(fetcher);
        let storage = Arc::new(MemoryCacheStorage::new());
        let clients = Arc::new(LocalClients::new());
        let cache = OfflineCache::new(
            OfflineConfig::default(),
            fetcher.clone(),
            storage.clone(),
            clients.clone(),
        );
        Harness {
            cache,
            fetcher,
            storage,
            clients,
        }
    }

    fn all_assets() -> MockFetcher {
        MockFetcher::serving(DEFAULT_STATIC_ASSETS)
    }

    async fn cached_body(storage: &MemoryCacheStorage, url: &str) -> Option<Vec<u8>> {
        storage
            .match_request(&Request::get(url))
            .await
            .unwrap()
            .map(|r| r.body)
    }

    #[tokio::test]
    async fn test_install_precaches_manifest() {
        let h = harness(all_assets());

        h.cache.install().await.unwrap();

        assert_eq!(h.cache.state().await, WorkerState::Installed);
        assert_eq!(h.fetcher.calls(), DEFAULT_STATIC_ASSETS.len());
        for asset in DEFAULT_STATIC_ASSETS {
            assert!(cached_body(&h.storage, asset).await.is_some(), "{}", asset);
        }
    }

    #[tokio::test]
    async fn test_install_fails_atomically_on_missing_asset() {
        let h = harness(MockFetcher::serving(&["/", "/index.html"]));

        let err = h.cache.install().await.unwrap_err();

        assert!(matches!(err, OfflineError::Install(_)));
        assert_eq!(h.cache.state().await, WorkerState::Pending);
        assert!(cached_body(&h.storage, "/index.html").await.is_none());
        assert!(h.cache.activate().await.is_err());
        assert!(!h.clients.is_claimed());
    }

    #[tokio::test]
    async fn test_install_fails_when_offline() {
        let fetcher = all_assets();
        fetcher.go_offline();
        let h = harness(fetcher);

        let err = h.cache.install().await.unwrap_err();
        assert!(matches!(err, OfflineError::Install(_)));
    }

    #[tokio::test]
    async fn test_activate_evicts_other_versions_and_claims() {
        let h = harness(all_assets());
        h.storage
            .put(
                "session-tracker-v0",
                &Request::get("/old.js"),
                Response::new(200, "old"),
            )
            .await
            .unwrap();

        h.cache.start().await.unwrap();

        assert_eq!(h.cache.state().await, WorkerState::Activated);
        assert_eq!(h.storage.keys().await.unwrap(), vec![DEFAULT_CACHE_VERSION]);
        assert!(cached_body(&h.storage, "/old.js").await.is_none());
        assert!(h.clients.is_claimed());
    }

    #[tokio::test]
    async fn test_warm_static_asset_never_hits_network() {
        let h = harness(all_assets());
        h.cache.install().await.unwrap();
        let after_install = h.fetcher.calls();
        h.fetcher.go_offline();

        for _ in 0..3 {
            let response = h.cache.handle(&Request::get("/index.html")).await.unwrap();
            assert_eq!(response.body, b"body of /index.html");
        }
        assert_eq!(h.fetcher.calls(), after_install);
    }

    #[tokio::test]
    async fn test_cold_static_asset_is_fetched_but_not_stored() {
        let h = harness(all_assets());

        let response = h.cache.handle(&Request::get("/vite.svg")).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(h.fetcher.calls(), 1);
        assert!(cached_body(&h.storage, "/vite.svg").await.is_none());
    }

    #[tokio::test]
    async fn test_api_always_tries_network_first() {
        let fetcher = MockFetcher::default();
        fetcher.set("/api/sessions", 200, "fresh");
        let h = harness(fetcher);
        h.storage
            .put(
                DEFAULT_CACHE_VERSION,
                &Request::get("/api/sessions"),
                Response::new(200, "stale"),
            )
            .await
            .unwrap();

        let response = h
            .cache
            .handle(&Request::get("/api/sessions"))
            .await
            .unwrap();
        assert_eq!(response.body, b"fresh");
        assert_eq!(h.fetcher.calls(), 1);
        // Network-first never writes back.
        assert_eq!(
            cached_body(&h.storage, "/api/sessions").await.unwrap(),
            b"stale"
        );

        h.fetcher.go_offline();
        let response = h
            .cache
            .handle(&Request::get("/api/sessions"))
            .await
            .unwrap();
        assert_eq!(response.body, b"stale");
        assert_eq!(h.fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_network_first_error_responses_are_not_failures() {
        let fetcher = MockFetcher::default();
        fetcher.set("/api/missing", 404, "nope");
        let h = harness(fetcher);
        h.storage
            .put(
                DEFAULT_CACHE_VERSION,
                &Request::get("/api/missing"),
                Response::new(200, "cached"),
            )
            .await
            .unwrap();

        let response = h.cache.handle(&Request::get("/api/missing")).await.unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_network_first_without_fallback_fails_with_network_error() {
        let fetcher = MockFetcher::default();
        fetcher.go_offline();
        let h = harness(fetcher);

        let post = Request::new(Method::POST, "/sessions");
        assert!(h.cache.handle(&post).await.unwrap_err().is_network());
        let err = h.cache.handle(&Request::get("/api/x")).await.unwrap_err();
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_stale_while_revalidate_cold_fetches_and_stores() {
        let fetcher = MockFetcher::default();
        fetcher.set("/photos/1.png", 200, "v1");
        let h = harness(fetcher);

        let response = h
            .cache
            .handle(&Request::get("/photos/1.png"))
            .await
            .unwrap();

        assert_eq!(response.body, b"v1");
        assert_eq!(
            cached_body(&h.storage, "/photos/1.png").await.unwrap(),
            b"v1"
        );
        assert_eq!(h.storage.keys().await.unwrap(), vec![DEFAULT_CACHE_VERSION]);
    }

    #[tokio::test]
    async fn test_stale_while_revalidate_serves_cached_then_refreshes() {
        let fetcher = MockFetcher::default();
        fetcher.set("/photos/1.png", 200, "v1");
        let h = harness(fetcher);
        h.cache
            .handle(&Request::get("/photos/1.png"))
            .await
            .unwrap();
        h.fetcher.set("/photos/1.png", 200, "v2");

        let response = h
            .cache
            .handle(&Request::get("/photos/1.png"))
            .await
            .unwrap();
        assert_eq!(response.body, b"v1");

        // The refresh runs detached; give it a chance to finish.
        for _ in 0..100 {
            if cached_body(&h.storage, "/photos/1.png").await.unwrap() == b"v2" {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(
            cached_body(&h.storage, "/photos/1.png").await.unwrap(),
            b"v2"
        );
        assert_eq!(h.fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_stale_while_revalidate_offline() {
        let fetcher = MockFetcher::default();
        fetcher.set("/photos/1.png", 200, "v1");
        let h = harness(fetcher);
        h.cache
            .handle(&Request::get("/photos/1.png"))
            .await
            .unwrap();
        h.fetcher.go_offline();

        // Cached copy still served; the failed refresh is swallowed.
        let response = h
            .cache
            .handle(&Request::get("/photos/1.png"))
            .await
            .unwrap();
        assert_eq!(response.body, b"v1");
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(
            cached_body(&h.storage, "/photos/1.png").await.unwrap(),
            b"v1"
        );

        // Nothing cached and no network: the fetch error surfaces.
        let err = h
            .cache
            .handle(&Request::get("/photos/2.png"))
            .await
            .unwrap_err();
        assert!(err.is_network());
    }
}
