//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - GET requests for list and detail pages
//! - Retry with a fixed delay for every kind of failure
//! - Error classification

use crate::config::Config;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Connect timeout, separate from the configured whole-request timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A failed fetch
///
/// Every variant is retryable; [`Fetcher::fetch`] only surfaces an error
/// after the last attempt, wrapped in [`FetchError::Exhausted`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to create request for {url}: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("failed to fetch {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("failed to fetch {url}: status code {status}")]
    Status {
        url: String,
        status: u16,
        /// Response body, kept so callers can salvage links from error pages
        body: Option<String>,
    },

    #[error("failed to read HTML from {url}: {source}")]
    Body { url: String, source: reqwest::Error },

    #[error("giving up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: Box<FetchError> },
}

impl FetchError {
    /// Body of the failed response, if the server sent one
    pub fn partial_body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } => body.as_deref(),
            Self::Exhausted { last, .. } => last.partial_body(),
            _ => None,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use catalog_harvest::config::load_config;
/// use catalog_harvest::crawler::build_http_client;
/// use std::path::Path;
///
/// let config = load_config(Path::new("catalog.toml")).unwrap();
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.value.as_str())
        .timeout(config.crawler.request_timeout())
        .connect_timeout(CONNECT_TIMEOUT)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages with a fixed number of attempts
///
/// The client is borrowed so a single connection pool serves the whole run.
#[derive(Debug, Clone)]
pub struct Fetcher<'c> {
    client: &'c Client,
    max_attempts: u32,
    retry_delay: Duration,
}

impl<'c> Fetcher<'c> {
    pub fn new(client: &'c Client, max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            client,
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    pub fn from_config(client: &'c Client, config: &Config) -> Self {
        Self::new(
            client,
            config.crawler.max_attempts,
            config.crawler.retry_delay(),
        )
    }

    /// Fetches and parses a page
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | Request cannot be built | Retry after delay |
    /// | Connection / timeout error | Retry after delay |
    /// | Non-2xx status | Retry after delay |
    /// | Body cannot be read | Retry after delay |
    ///
    /// After the last attempt the final error is returned; no partially
    /// fetched document is ever returned.
    pub async fn fetch(&self, url: &Url) -> Result<Html, FetchError> {
        let mut attempt = 1;

        loop {
            tracing::info!(
                "Fetching URL: {} (Attempt {}/{})",
                url,
                attempt,
                self.max_attempts
            );

            let error = match self.fetch_once(url).await {
                Ok(body) => return Ok(Html::parse_document(&body)),
                Err(e) => e,
            };

            if attempt >= self.max_attempts {
                return Err(FetchError::Exhausted {
                    attempts: attempt,
                    last: Box::new(error),
                });
            }

            tracing::warn!(
                "Attempt {}/{} failed: {}. Retrying in {:?}",
                attempt,
                self.max_attempts,
                error,
                self.retry_delay
            );
            if !self.retry_delay.is_zero() {
                tokio::time::sleep(self.retry_delay).await;
            }
            attempt += 1;
        }
    }

    /// Performs a single GET and returns the body text
    async fn fetch_once(&self, url: &Url) -> Result<String, FetchError> {
        let request = self
            .client
            .get(url.clone())
            .build()
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: response.text().await.ok().filter(|b| !b.trim().is_empty()),
            });
        }

        response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }
}
