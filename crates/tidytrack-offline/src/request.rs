//! Request and response values passed through the offline cache.

use reqwest::Method;

/// An intercepted request.
///
/// `url` is either absolute or a path relative to the fetcher's origin; it is
/// used verbatim as the cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: String,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }
}

/// A complete, buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the first header with `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_ignores_case() {
        let response = Response::new(200, "ok").with_header("Content-Type", "text/html");
        assert_eq!(response.header("content-type"), Some("text/html"));
        assert_eq!(response.header("etag"), None);
    }

    #[test]
    fn test_success_range() {
        assert!(Response::new(200, "").is_success());
        assert!(Response::new(204, "").is_success());
        assert!(!Response::new(304, "").is_success());
        assert!(!Response::new(404, "").is_success());
    }
}
