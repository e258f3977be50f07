//! Politeness delays for the crawl loop
//!
//! The crawl loop is the only code that talks to the catalog, so pacing is
//! plain sleeping between its requests:
//! - a fixed delay after every detail page fetch, successful or not
//! - a fixed delay before moving on to the next list page

use crate::config::CrawlerConfig;
use std::time::Duration;

/// Fixed delays applied between requests to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    detail_delay: Duration,
    page_delay: Duration,
}

impl Pacing {
    pub fn new(detail_delay: Duration, page_delay: Duration) -> Self {
        Self {
            detail_delay,
            page_delay,
        }
    }

    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(config.detail_delay(), config.page_delay())
    }

    /// Waits after a detail page fetch
    pub async fn after_detail(&self) {
        Self::pause(self.detail_delay).await;
    }

    /// Waits before fetching the next list page
    pub async fn between_pages(&self) {
        Self::pause(self.page_delay).await;
    }

    async fn pause(delay: Duration) {
        if delay.is_zero() {
            return;
        }
        tracing::trace!("Sleeping {:?}", delay);
        tokio::time::sleep(delay).await;
    }
}
