//! The transport seam between the resolution engine and the network.
//!
//! The engine only sees [`Transport::fetch`]: one request in, the final
//! location, content type and fully read body out. [`HttpTransport`] is the
//! reqwest-backed default; tests substitute in-memory doubles.

use crate::config::DiscoveryConfig;
use crate::location::Location;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, redirect};
use tracing::{debug, info};

/// One fetched response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    /// Location the content was actually served from, after redirects.
    pub final_url: Location,
    /// `Content-Type` as reported; empty when absent.
    pub content_type: String,
    /// Complete body.
    pub body: Vec<u8>,
}

/// Fetches the content behind a location.
///
/// Implementations must read the body completely before returning and must
/// report non-success statuses as [`Error::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url`, following redirects.
    async fn fetch(&self, url: &Location) -> Result<FetchedDocument>;
}

/// HTTP transport built on reqwest
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with the configured timeout, user agent and redirect limit
    pub fn new(config: &DiscoveryConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .redirect(redirect::Policy::limited(config.max_redirects))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &Location) -> Result<FetchedDocument> {
        let response = self.client.get(url.as_str()).send().await?;
        let status = response.status();

        if !status.is_success() {
            debug!("{} returned HTTP {}", url, status.as_u16());
            return Err(Error::Transport {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = Location::parse(response.url().as_str())?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.bytes().await?.to_vec();

        info!("Fetched {} bytes from {}", body.len(), final_url);
        Ok(FetchedDocument {
            final_url,
            content_type,
            body,
        })
    }
}
