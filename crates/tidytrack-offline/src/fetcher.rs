//! Network access for the offline cache.

use crate::error::{OfflineError, Result};
use crate::request::{Request, Response};
use async_trait::async_trait;
use reqwest::{Client, Url};

/// Performs a request against the network.
///
/// Any HTTP status counts as a response; only failing to get one is an error.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response>;
}

/// Fetches over HTTP, resolving relative request URLs against a base URL.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
}

impl HttpFetcher {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            OfflineError::network(format!("Invalid base URL '{}': {}", base_url, e))
        })?;
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    fn resolve(&self, url: &str) -> Result<Url> {
        self.base_url
            .join(url)
            .map_err(|e| {
                OfflineError::network(format!("Invalid request URL '{}': {}", url, e))
            })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        let url = self.resolve(&request.url)?;
        tracing::debug!("Fetching {} {}", request.method, url);

        let response = self
            .client
            .request(request.method.clone(), url)
            .send()
            .await?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_paths_against_base() {
        let fetcher = HttpFetcher::new("http://localhost:5173/app/").unwrap();
        assert_eq!(
            fetcher.resolve("/index.html").unwrap().as_str(),
            "http://localhost:5173/index.html"
        );
        assert_eq!(
            fetcher.resolve("assets/index.js").unwrap().as_str(),
            "http://localhost:5173/app/assets/index.js"
        );
        let absolute = "https://cdn.example.com/x.css";
        assert_eq!(fetcher.resolve(absolute).unwrap().as_str(), absolute);
    }

    #[test]
    fn test_rejects_invalid_base() {
        assert!(HttpFetcher::new("not a url").unwrap_err().is_network());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Port 9 (discard) on localhost is closed in any sane test environment.
        let fetcher = HttpFetcher::new("http://127.0.0.1:9/").unwrap();
        let err = fetcher.fetch(&Request::get("/")).await.unwrap_err();
        assert!(err.is_network());
    }
}
