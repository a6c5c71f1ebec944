// src/utils/http.rs

//! Resilient document fetching.
//!
//! A [`Fetcher`] performs bounded-retry GETs with exponential backoff and a
//! fixed inter-request delay that rate-limits the whole run. Anything that
//! can hand back rendered HTML (e.g. a browser-automation collaborator)
//! satisfies the same [`DocumentSource`] contract.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use scraper::Html;

use crate::config::ScraperConfig;
use crate::error::Result;

/// Anything that can turn a URL into a parsed HTML document.
#[async_trait(?Send)]
pub trait DocumentSource {
    async fn fetch(&self, url: &str) -> Result<Html>;
}

/// HTTP fetcher with retry/backoff and rate limiting.
pub struct Fetcher {
    client: reqwest::Client,
    max_retries: u32,
    request_delay: Duration,
}

impl Fetcher {
    /// Build a fetcher from scraper configuration.
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries.max(1),
            request_delay: Duration::from_millis(config.request_delay_ms),
        })
    }

    /// Backoff duration before retry number `attempt` (zero-based).
    pub fn backoff(attempt: u32) -> Duration {
        Duration::from_secs(2u64.saturating_pow(attempt))
    }

    /// Fetch a URL and parse the body as an HTML document.
    ///
    /// Transport failures (timeouts, connection errors, non-2xx statuses)
    /// are retried up to the configured limit with exponential backoff.
    /// The fixed inter-request delay is applied after the attempt loop
    /// regardless of outcome. An exhausted retry budget surfaces as an
    /// error for the caller to log; it is not fatal to a batch.
    pub async fn fetch(&self, url: &str) -> Result<Html> {
        let mut attempt = 0;
        let outcome = loop {
            log::debug!("GET {} (attempt {})", url, attempt + 1);
            match self.try_fetch(url).await {
                Ok(html) => break Ok(html),
                Err(error) if attempt + 1 < self.max_retries => {
                    log::warn!("Request failed (attempt {}): {}", attempt + 1, error);
                    tokio::time::sleep(Self::backoff(attempt)).await;
                    attempt += 1;
                }
                Err(error) => {
                    log::error!("Giving up on {} after {} attempts", url, attempt + 1);
                    break Err(error);
                }
            }
        };

        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
        outcome
    }

    async fn try_fetch(&self, url: &str) -> Result<Html> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let text = response.text().await?;
        Ok(Html::parse_document(&text))
    }
}

#[async_trait(?Send)]
impl DocumentSource for Fetcher {
    async fn fetch(&self, url: &str) -> Result<Html> {
        Fetcher::fetch(self, url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_per_attempt() {
        assert_eq!(Fetcher::backoff(0), Duration::from_secs(1));
        assert_eq!(Fetcher::backoff(1), Duration::from_secs(2));
        assert_eq!(Fetcher::backoff(2), Duration::from_secs(4));
        assert_eq!(Fetcher::backoff(3), Duration::from_secs(8));
    }

    #[test]
    fn fetcher_builds_from_default_config() {
        let config = ScraperConfig::default();
        assert!(Fetcher::new(&config).is_ok());
    }
}
