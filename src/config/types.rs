use crate::extract::ExtractionRules;
use serde::Deserialize;
use std::time::Duration;

/// Browser-like user agent sent when the configuration does not set one
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for Catalog-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    /// Site-specific extraction rules; the built-in ruleset is used when absent
    #[serde(default)]
    pub rules: Option<ExtractionRules>,
}

/// The catalog being harvested
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Base URL that relative links are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// First list page of the catalog
    #[serde(rename = "start-url")]
    pub start_url: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Fetch attempts per URL before giving up
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Pause between fetch attempts (milliseconds)
    #[serde(rename = "retry-delay")]
    pub retry_delay: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Politeness pause after each detail page fetch (milliseconds)
    #[serde(rename = "detail-delay")]
    pub detail_delay: u64,

    /// Pause before fetching the next list page (milliseconds)
    #[serde(rename = "page-delay")]
    pub page_delay: u64,

    /// Capacity of the record queue between the crawl loop and the collector
    #[serde(rename = "queue-capacity")]
    pub queue_capacity: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: 5_000,
            request_timeout: 30,
            detail_delay: 1_000,
            page_delay: 1_000,
            queue_capacity: 50,
        }
    }
}

impl CrawlerConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn detail_delay(&self) -> Duration {
        Duration::from_millis(self.detail_delay)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay)
    }
}

/// User agent header configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Full `User-Agent` header value
    #[serde(default = "default_user_agent")]
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the complete dataset JSON file
    #[serde(rename = "dataset-path")]
    pub dataset_path: String,

    /// Path to the resume (processed URLs) JSON file
    #[serde(rename = "resume-path")]
    pub resume_path: String,
}
