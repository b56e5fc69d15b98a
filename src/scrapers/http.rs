use crate::scrapers::traits::PageFetcher;
use crate::scrapers::types::{FetchError, ScrapeParams};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// reqwest-backed fetcher with a fixed User-Agent
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(params: &ScrapeParams) -> Result<Self> {
        let client = Client::builder()
            .timeout(params.detail_timeout().max(params.listing_timeout()))
            .user_agent(params.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        debug!("Fetching URL: {}", url);

        let response = self.client.get(url).timeout(timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http { status: status.as_u16() });
        }

        let body = response.text().await?;
        debug!("Downloaded {} bytes of HTML", body.len());
        Ok(body)
    }
}
