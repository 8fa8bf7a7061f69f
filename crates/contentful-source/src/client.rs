//! HTTP client for the Contentful sync endpoint.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use sync_core::{Product, RequestDescriptor, Result, SourceClient, SourcePage, SyncError};

use crate::config::ContentfulConfig;
use crate::conversion::entry_to_product;
use crate::wire::{Entry, SyncResponse};

/// Fetches sync pages from one Contentful space.
pub struct ContentfulClient {
    http: reqwest::Client,
    config: ContentfulConfig,
    sync_url: Url,
}

impl ContentfulClient {
    /// Create a client. Fails with [`SyncError::Config`] on missing settings
    /// or an unusable base URL.
    pub fn new(config: ContentfulConfig) -> Result<Self> {
        for (name, value) in [
            ("space id", &config.space_id),
            ("access token", &config.access_token),
            ("content type", &config.content_type),
            ("locale", &config.locale),
        ] {
            if value.trim().is_empty() {
                return Err(SyncError::Config(format!("Contentful {name} is empty")));
            }
        }

        let endpoint = config.sync_endpoint();
        let sync_url = Url::parse(&endpoint)
            .map_err(|e| SyncError::Config(format!("invalid sync endpoint {endpoint}: {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SyncError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            sync_url,
        })
    }

    pub fn config(&self) -> &ContentfulConfig {
        &self.config
    }
}

fn classify_status(status: StatusCode, url: &str) -> SyncError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SyncError::SourceUnauthorized(format!("HTTP {status} for {url}"))
        }
        _ => SyncError::SourceUnavailable(format!("HTTP {status} for {url}")),
    }
}

#[async_trait]
impl SourceClient for ContentfulClient {
    type Item = Entry;

    fn initial_request(&self) -> RequestDescriptor {
        let mut url = self.sync_url.clone();
        url.query_pairs_mut()
            .append_pair("initial", "true")
            .append_pair("type", "Entry")
            .append_pair("content_type", &self.config.content_type);
        RequestDescriptor::initial(url.to_string())
    }

    fn continuation_request(&self, cursor: &str) -> Result<RequestDescriptor> {
        let cursor = cursor.trim();
        if cursor.is_empty() {
            return Err(SyncError::InvalidCursor("empty cursor".to_string()));
        }

        // Cursors persisted as a full nextSyncUrl are followed as they are.
        if cursor.starts_with("http://") || cursor.starts_with("https://") {
            let url = Url::parse(cursor)
                .map_err(|e| SyncError::InvalidCursor(format!("{cursor}: {e}")))?;
            return Ok(RequestDescriptor::continuation(url.to_string()));
        }

        let mut url = self.sync_url.clone();
        url.query_pairs_mut().append_pair("sync_token", cursor);
        Ok(RequestDescriptor::continuation(url.to_string()))
    }

    async fn fetch_page(&self, request: &RequestDescriptor) -> Result<SourcePage<Entry>> {
        tracing::debug!("Fetching {} page: {}", request.kind, request.url);

        let response = self
            .http
            .get(&request.url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SyncError::SourceUnavailable(format!("timed out fetching {}", request.url))
                } else {
                    SyncError::SourceUnavailable(format!("failed to fetch {}: {e}", request.url))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status, &request.url));
        }

        let bytes = response.bytes().await.map_err(|e| {
            SyncError::SourceUnavailable(format!(
                "failed to read response body from {}: {e}",
                request.url
            ))
        })?;
        tracing::debug!("Fetched {} bytes from: {}", bytes.len(), request.url);

        let body: SyncResponse = serde_json::from_slice(&bytes).map_err(|e| {
            SyncError::SourceUnavailable(format!("invalid sync response from {}: {e}", request.url))
        })?;
        Ok(body.into_page())
    }

    fn canonicalize(&self, items: &[Entry]) -> Vec<Result<Product>> {
        items
            .iter()
            .map(|entry| entry_to_product(entry, &self.config.locale))
            .collect()
    }
}
