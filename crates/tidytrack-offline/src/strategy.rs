//! Choosing how a request is served.

use crate::request::Request;
use std::fmt;

/// The three fixed fetch strategies, in the order they are tested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Try the network; fall back to a cached copy only when it fails.
    NetworkFirst,
    /// Serve the cached copy; go to the network only on a miss.
    CacheFirst,
    /// Serve the cached copy at once and refresh it in the background.
    StaleWhileRevalidate,
}

impl Strategy {
    /// Picks the strategy for `request`.
    ///
    /// API calls (`/api/` anywhere in the URL) and non-GET requests go to the
    /// network first. URLs ending with a manifest entry are cache first.
    /// Everything else is stale-while-revalidate.
    pub fn classify(request: &Request, static_assets: &[String]) -> Self {
        if request.url.contains("/api/") || !request.is_get() {
            return Strategy::NetworkFirst;
        }
        if static_assets.iter().any(|asset| request.url.ends_with(asset.as_str())) {
            return Strategy::CacheFirst;
        }
        Strategy::StaleWhileRevalidate
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::NetworkFirst => "network-first",
            Strategy::CacheFirst => "cache-first",
            Strategy::StaleWhileRevalidate => "stale-while-revalidate",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline_cache::OfflineConfig;
    use reqwest::Method;

    fn classify(method: Method, url: &str) -> Strategy {
        let manifest = OfflineConfig::default().static_assets;
        Strategy::classify(&Request::new(method, url), &manifest)
    }

    #[test]
    fn test_api_and_writes_are_network_first() {
        assert_eq!(
            classify(Method::GET, "/api/sessions"),
            Strategy::NetworkFirst
        );
        assert_eq!(
            classify(Method::GET, "http://host/v2/api/x.css"),
            Strategy::NetworkFirst
        );
        assert_eq!(
            classify(Method::POST, "/index.html"),
            Strategy::NetworkFirst
        );
        assert_eq!(
            classify(Method::DELETE, "/photos/1"),
            Strategy::NetworkFirst
        );
    }

    #[test]
    fn test_manifest_suffix_is_cache_first() {
        assert_eq!(classify(Method::GET, "/index.html"), Strategy::CacheFirst);
        assert_eq!(
            classify(Method::GET, "http://localhost:5173/assets/index.js"),
            Strategy::CacheFirst
        );
        // "/" is a manifest entry, so any URL ending in a slash matches it.
        assert_eq!(classify(Method::GET, "/gallery/"), Strategy::CacheFirst);
    }

    #[test]
    fn test_everything_else_is_stale_while_revalidate() {
        assert_eq!(
            classify(Method::GET, "/photos/1.png"),
            Strategy::StaleWhileRevalidate
        );
        assert_eq!(
            classify(Method::GET, "/index.html?v=2"),
            Strategy::StaleWhileRevalidate
        );
    }
}
