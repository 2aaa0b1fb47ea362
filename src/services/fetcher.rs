// src/services/fetcher.rs

//! Page fetching.
//!
//! `PageFetcher` is the seam every stage fetches through. `HttpFetcher` is the
//! production implementation: politeness delay, timeout, bounded retries with
//! exponential backoff and raise-for-status semantics.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{CrawlerConfig, Page, ProbeResponse};
use crate::utils::http::{backoff_delay, create_client};

/// Source of HTML pages.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page, retrying per configuration. Non-2xx is a failure.
    async fn fetch(&self, url: &str) -> Result<Page>;

    /// Single short-timeout request that reports any status.
    async fn probe(&self, url: &str) -> Result<ProbeResponse>;
}

/// reqwest-backed fetcher, scoped to one pipeline run.
pub struct HttpFetcher {
    client: Client,
    config: CrawlerConfig,
}

impl HttpFetcher {
    /// Build a fetcher with its own HTTP client.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
            config: config.clone(),
        })
    }

    /// Fetch with an explicit attempt budget.
    pub async fn fetch_with_retries(&self, url: &str, max_retries: u32) -> Result<Page> {
        let attempts = max_retries.max(1);
        let mut last_error = String::new();

        for attempt in 0..attempts {
            self.politeness_delay().await;
            log::info!("Fetching URL: {} (attempt {}/{})", url, attempt + 1, attempts);

            match self.get_once(url).await {
                Ok(page) => {
                    if page.final_url != page.url {
                        log::debug!("Redirected from {} to {}", page.url, page.final_url);
                    }
                    return Ok(page);
                }
                Err(e) => {
                    log::warn!("Error fetching {} (attempt {}): {}", url, attempt + 1, e);
                    last_error = e.to_string();
                }
            }

            if attempt + 1 < attempts {
                tokio::time::sleep(backoff_delay(self.config.backoff_base_ms, attempt)).await;
            }
        }

        log::error!("Failed to fetch {} after {} attempts", url, attempts);
        Err(AppError::fetch(url, attempts, last_error))
    }

    async fn get_once(&self, url: &str) -> std::result::Result<Page, reqwest::Error> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let final_url = response.url().to_string();
        let html = response.text().await?;
        Ok(Page {
            url: url.to_string(),
            final_url,
            html,
        })
    }

    async fn politeness_delay(&self) {
        let (min, max) = (self.config.delay_min_ms, self.config.delay_max_ms);
        if max == 0 {
            return;
        }
        let millis = rand::thread_rng().gen_range(min.min(max)..=max);
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Page> {
        self.fetch_with_retries(url, self.config.max_retries).await
    }

    async fn probe(&self, url: &str) -> Result<ProbeResponse> {
        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(self.config.probe_timeout_secs))
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(ProbeResponse { status, body })
    }
}
