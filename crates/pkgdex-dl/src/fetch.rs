use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use tracing::trace;
use url::Url;

use crate::{
    error::{DownloadError, Result},
    http_client::SHARED_AGENT,
};

/// Retrieves the text body of a URL.
///
/// Implementations return an error for transport failures and for any
/// non-success status.
pub trait Fetcher: Send + Sync {
    fn fetch_text(&self, url: &str) -> Result<String>;
}

pub type FetcherHandle = Arc<dyn Fetcher>;

/// Fetcher backed by the shared `ureq` agent.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpFetcher;

impl Fetcher for HttpFetcher {
    fn fetch_text(&self, url: &str) -> Result<String> {
        Url::parse(url).map_err(|source| {
            DownloadError::InvalidUrl {
                url: url.to_string(),
                source,
            }
        })?;

        trace!(url, "GET");

        let resp = SHARED_AGENT.get(url).call().map_err(|err| {
            match err {
                ureq::Error::StatusCode(status) => {
                    DownloadError::HttpError {
                        status,
                        url: url.to_string(),
                    }
                }
                other => DownloadError::from(other),
            }
        })?;

        if !resp.status().is_success() {
            return Err(DownloadError::HttpError {
                status: resp.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(resp.into_body().read_to_string()?)
    }
}

/// In-memory fetcher serving canned responses.
///
/// URLs without a registered response answer with HTTP 404. Every request is
/// recorded, so callers can assert on fetch counts and order.
#[derive(Default)]
pub struct MemoryFetcher {
    responses: Mutex<HashMap<String, std::result::Result<String, u16>>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(url.into(), Ok(body.into()));
        self
    }

    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.insert(url.into(), Err(status));
        self
    }

    pub fn set_body(&self, url: impl Into<String>, body: impl Into<String>) {
        self.insert(url.into(), Ok(body.into()));
    }

    fn insert(&self, url: String, response: std::result::Result<String, u16>) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.insert(url, response);
        }
    }

    /// Every requested URL, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests().iter().filter(|u| *u == url).count()
    }
}

impl Fetcher for MemoryFetcher {
    fn fetch_text(&self, url: &str) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        let response = self
            .responses
            .lock()
            .ok()
            .and_then(|responses| responses.get(url).cloned());

        match response {
            Some(Ok(body)) => Ok(body),
            Some(Err(status)) => {
                Err(DownloadError::HttpError {
                    status,
                    url: url.to_string(),
                })
            }
            None => {
                Err(DownloadError::HttpError {
                    status: 404,
                    url: url.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use mockito::Server;

    use super::*;

    #[test]
    fn test_http_fetcher_reads_body() {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/main.yaml")
            .with_status(200)
            .with_body("packages:\n  a: github:o/a\n")
            .create();

        let body = HttpFetcher
            .fetch_text(&format!("{}/main.yaml", server.url()))
            .unwrap();
        assert_eq!(body, "packages:\n  a: github:o/a\n");
    }

    #[test]
    fn test_http_fetcher_maps_status() {
        let mut server = Server::new();
        let _m = server
            .mock("GET", "/README.md")
            .with_status(404)
            .with_body("404: Not Found")
            .create();

        let url = format!("{}/README.md", server.url());
        let err = HttpFetcher.fetch_text(&url).unwrap_err();
        assert!(matches!(
            err,
            DownloadError::HttpError { status: 404, url: ref u } if *u == url
        ));
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_http_fetcher_rejects_invalid_url() {
        assert!(matches!(
            HttpFetcher.fetch_text("not a url"),
            Err(DownloadError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_memory_fetcher() {
        let fetcher = MemoryFetcher::new()
            .with_body("https://a/m.json", "{}")
            .with_status("https://a/down.json", 500);

        assert_eq!(fetcher.fetch_text("https://a/m.json").unwrap(), "{}");
        assert_eq!(
            fetcher.fetch_text("https://a/down.json").unwrap_err().status(),
            Some(500)
        );
        assert_eq!(
            fetcher.fetch_text("https://a/missing").unwrap_err().status(),
            Some(404)
        );

        fetcher.fetch_text("https://a/m.json").unwrap();
        assert_eq!(fetcher.request_count("https://a/m.json"), 2);
        assert_eq!(fetcher.requests().len(), 4);
    }
}
