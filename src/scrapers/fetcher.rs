use crate::error::FetchError;
use anyhow::{Context, Result};
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, warn};

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Single-shot HTTP GET client shared by every scraper.
///
/// Built once and passed around; no retries, no caching.
#[derive(Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Fetch a page body as text
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.get(url).await?;
        let html = response
            .text()
            .await
            .map_err(|e| FetchError::new(url, format!("failed to read response body: {e}")))?;

        debug!(url, bytes = html.len(), "Downloaded page");
        Ok(html)
    }

    /// Fetch a binary document such as a PDF
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.get(url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::new(url, format!("failed to read response body: {e}")))?;

        debug!(url, bytes = bytes.len(), "Downloaded document");
        Ok(bytes.to_vec())
    }

    async fn get(&self, url: &str) -> Result<Response, FetchError> {
        debug!("Fetching URL: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(url, error = %e, "Request failed");
            FetchError::new(url, e)
        })?;

        if !response.status().is_success() {
            warn!(url, status = %response.status(), "Non-success status");
            return Err(FetchError::new(url, format!("HTTP status {}", response.status())));
        }

        Ok(response)
    }
}
