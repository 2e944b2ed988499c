//! Docker Hub catalog client.
//!
//! Serves the blank-query case: when the user has typed no image name yet,
//! the default suggestion list comes from the paginated `library` catalog on
//! Docker Hub. Short timeout, a few retries, and a decoder that treats every
//! field as optional.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::engine::SearchHit;

/// Per-request timeout for Hub calls.
pub const HUB_TIMEOUT: Duration = Duration::from_secs(1);
/// Retries after the initial attempt, waits pinned to the timeout.
pub const HUB_RETRIES: u32 = 3;

const HUB_URL: &str = "https://registry.hub.docker.com/v2/repositories/library";

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status: {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Default, Deserialize)]
struct HubEnvelope {
    #[serde(default)]
    results: Vec<HubResult>,
}

#[derive(Debug, Default, Deserialize)]
struct HubResult {
    name: Option<String>,
    is_official: Option<bool>,
    description: Option<String>,
}

/// Remote catalog surface the pipeline depends on. Failures degrade to an
/// empty list; the pipeline never sees an error.
#[async_trait]
pub trait CatalogFetch: Send + Sync {
    async fn fetch_default_images(&self, page_size: usize) -> Vec<SearchHit>;
}

/// HTTP client for the Docker Hub repository catalog.
pub struct HubClient {
    http: reqwest::Client,
    base_url: String,
}

impl HubClient {
    pub fn new() -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder().timeout(HUB_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: HUB_URL.to_string(),
        })
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, RegistryError> {
        let http = reqwest::Client::builder().timeout(HUB_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    async fn try_fetch(&self, page_size: usize) -> Result<Vec<SearchHit>, RegistryError> {
        let url = format!("{}?page=1&page_size={}", self.base_url, page_size);
        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(RegistryError::Status(response.status()));
        }
        let body = response.text().await?;
        Ok(decode_catalog(&body))
    }
}

#[async_trait]
impl CatalogFetch for HubClient {
    async fn fetch_default_images(&self, page_size: usize) -> Vec<SearchHit> {
        for attempt in 0..=HUB_RETRIES {
            match self.try_fetch(page_size).await {
                Ok(hits) => return hits,
                Err(err) => {
                    debug!(%err, attempt, "hub catalog fetch failed");
                    if attempt < HUB_RETRIES {
                        tokio::time::sleep(HUB_TIMEOUT).await;
                    }
                }
            }
        }
        Vec::new()
    }
}

/// Decode the Hub JSON envelope. Malformed bodies or absent fields coerce to
/// an empty list rather than an error.
pub fn decode_catalog(body: &str) -> Vec<SearchHit> {
    let envelope: HubEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(err) => {
            debug!(%err, "hub envelope decode failed");
            return Vec::new();
        }
    };
    envelope
        .results
        .into_iter()
        .filter_map(|r| {
            let name = r.name.filter(|n| !n.is_empty())?;
            Some(SearchHit {
                name,
                official: r.is_official.unwrap_or(false),
                description: r.description.unwrap_or_default(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_hub_envelope() {
        let body = r#"{
            "num_pages": 1, "num_results": 2, "page_size": 10, "page": 1,
            "results": [
                {"name": "nginx", "is_official": true, "description": "Official build of Nginx."},
                {"name": "redis", "is_official": true, "description": "Redis is an open source key-value store."}
            ]
        }"#;
        let hits = decode_catalog(body);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].name, "nginx");
        assert!(hits[0].official);
    }

    #[test]
    fn absent_fields_do_not_crash_the_decoder() {
        let body = r#"{"results": [{"name": "alpine"}, {"description": "no name"}, {}]}"#;
        let hits = decode_catalog(body);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "alpine");
        assert!(!hits[0].official);
        assert_eq!(hits[0].description, "");
    }

    #[test]
    fn malformed_body_yields_empty() {
        assert!(decode_catalog("<html>rate limited</html>").is_empty());
        assert!(decode_catalog("").is_empty());
        assert!(decode_catalog(r#"{"results": "oops"}"#).is_empty());
    }

    #[tokio::test]
    async fn persistent_failure_retries_then_degrades() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(AtomicUsize::new(0));

        let served = Arc::clone(&requests);
        tokio::spawn(async move {
            loop {
                let (mut sock, _) = listener.accept().await.unwrap();
                served.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 1024];
                let _ = sock.read(&mut buf).await;
                let _ = sock
                    .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 0\r\n\r\n")
                    .await;
            }
        });

        let client = HubClient::with_base_url(format!("http://{addr}")).unwrap();
        let hits = client.fetch_default_images(5).await;

        assert!(hits.is_empty());
        assert_eq!(
            requests.load(Ordering::SeqCst),
            1 + HUB_RETRIES as usize,
            "one initial attempt plus the configured retries"
        );
    }
}
