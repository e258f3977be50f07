//! The crawl loop: walks list pages and feeds new records to the pipeline
//!
//! Each list page passes through the states of [`CrawlState`]. Parsed
//! documents never outlive the state that fetched them: everything later
//! states need is extracted into a [`ListingPage`] right away.

use crate::crawler::{Fetcher, Pacing};
use crate::extract::ExtractionRules;
use crate::pipeline::{PipelineError, RecordSender};
use crate::state::{CrawlState, ListingPage, StopReason};
use crate::storage::ResumeStore;
use crate::url::resolve_url;
use scraper::Html;
use std::collections::HashSet;
use url::Url;

/// Counters for one pass of the crawl loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlProgress {
    /// List pages fetched successfully
    pub pages_visited: usize,

    /// List page fetches that failed after every retry
    pub pages_failed: usize,

    /// Listing entries inspected, including incomplete ones
    pub entries_seen: usize,

    /// Entries skipped because their URL was already known
    pub entries_known: usize,

    /// Records handed to the collector
    pub records_sent: usize,

    /// Detail pages that could not be fetched
    pub detail_failures: usize,

    /// Detail pages whose extracted name was empty
    pub unnamed_records: usize,
}

/// Drives the list page state machine
pub struct Paginator<'a> {
    fetcher: Fetcher<'a>,
    rules: &'a ExtractionRules,
    base_url: &'a Url,
    pacing: Pacing,

    /// URLs treated as already handled: the resume set plus this run's records
    known: ResumeStore,

    /// List pages fetched or attempted in this run
    visited_pages: HashSet<String>,

    progress: CrawlProgress,
}

impl<'a> Paginator<'a> {
    pub fn new(
        fetcher: Fetcher<'a>,
        rules: &'a ExtractionRules,
        base_url: &'a Url,
        pacing: Pacing,
        known: ResumeStore,
    ) -> Self {
        Self {
            fetcher,
            rules,
            base_url,
            pacing,
            known,
            visited_pages: HashSet::new(),
            progress: CrawlProgress::default(),
        }
    }

    /// Runs the loop from `start_url` until a stop condition is reached
    ///
    /// Only a collector that has gone away ends the loop with an error;
    /// fetch and extraction failures are logged and counted.
    pub async fn run(
        mut self,
        start_url: Url,
        sender: &RecordSender,
    ) -> Result<(StopReason, CrawlProgress), PipelineError> {
        let mut state = CrawlState::FetchListPage { url: start_url };

        loop {
            tracing::debug!("Crawl state: {}", state);
            state = match state {
                CrawlState::Done(reason) => {
                    tracing::info!("Pagination stopped: {}", reason);
                    return Ok((reason, self.progress));
                }
                CrawlState::FetchListPage { url } => self.fetch_list_page(url).await,
                CrawlState::ExtractListing { url, page } => Self::inspect_listing(url, page),
                CrawlState::FilterAndDispatch { url, page } => {
                    self.filter_and_dispatch(url, page, sender).await?
                }
                CrawlState::DetermineNextPage { url, next_href } => {
                    self.determine_next_page(&url, next_href).await
                }
            };
        }
    }

    async fn fetch_list_page(&mut self, url: Url) -> CrawlState {
        self.visited_pages.insert(url.to_string());

        match self.fetcher.fetch(&url).await {
            Ok(document) => {
                self.progress.pages_visited += 1;
                tracing::info!("Processing page: {}", url);
                let page = self.rules.extract_listing(&document);
                CrawlState::ExtractListing { url, page }
            }
            Err(e) => {
                self.progress.pages_failed += 1;
                tracing::error!("Error fetching list page {}: {}", url, e);

                // The error page may still carry pagination
                let next_href = e
                    .partial_body()
                    .and_then(|body| self.rules.extract_next_page(&Html::parse_document(body)));

                match next_href {
                    Some(href) => {
                        tracing::warn!("Recovered next page link from failed page {}", url);
                        CrawlState::DetermineNextPage {
                            url,
                            next_href: Some(href),
                        }
                    }
                    None => CrawlState::Done(StopReason::ListPageFailed),
                }
            }
        }
    }

    fn inspect_listing(url: Url, page: ListingPage) -> CrawlState {
        if page.entries.is_empty() {
            tracing::info!("No items found on page {}", url);
            return CrawlState::Done(StopReason::EmptyListing);
        }

        tracing::debug!("Found {} entries on {}", page.entries.len(), url);
        CrawlState::FilterAndDispatch { url, page }
    }

    async fn filter_and_dispatch(
        &mut self,
        url: Url,
        page: ListingPage,
        sender: &RecordSender,
    ) -> Result<CrawlState, PipelineError> {
        for (position, entry) in page.entries.iter().enumerate() {
            self.progress.entries_seen += 1;

            if !entry.is_complete() {
                tracing::warn!(
                    "Skipping item {} on {}: missing name or URL",
                    position + 1,
                    url
                );
                continue;
            }

            let item_url = match resolve_url(self.base_url, &entry.href) {
                Ok(item_url) => item_url,
                Err(e) => {
                    tracing::warn!("Skipping item '{}': {}", entry.name, e);
                    continue;
                }
            };

            if self.known.contains(item_url.as_str()) {
                self.progress.entries_known += 1;
                if position == 0 {
                    tracing::info!(
                        "First item on page, '{}' ({}), already processed",
                        entry.name,
                        item_url
                    );
                    return Ok(CrawlState::Done(StopReason::FirstEntryKnown));
                }
                tracing::debug!("Already processed: '{}' ({})", entry.name, item_url);
                continue;
            }

            tracing::info!("Fetching details for new item: {} ({})", entry.name, item_url);
            self.scrape_item(item_url, sender).await?;
        }

        Ok(CrawlState::DetermineNextPage {
            url,
            next_href: page.next_href,
        })
    }

    /// Fetches one detail page and queues its record
    async fn scrape_item(&mut self, item_url: Url, sender: &RecordSender) -> Result<(), PipelineError> {
        let record = match self.fetcher.fetch(&item_url).await {
            Ok(document) => Some(
                self.rules
                    .extract_record(&document, &item_url, self.base_url),
            ),
            Err(e) => {
                self.progress.detail_failures += 1;
                tracing::error!("Error fetching detail page {}: {}", item_url, e);
                None
            }
        };

        self.pacing.after_detail().await;

        let Some(record) = record else {
            return Ok(());
        };
        if record.name.is_empty() {
            self.progress.unnamed_records += 1;
            tracing::warn!("Skipping item with no name from {}", item_url);
            return Ok(());
        }

        sender.push(record).await?;
        self.known.merge(item_url);
        self.progress.records_sent += 1;
        Ok(())
    }

    async fn determine_next_page(&mut self, url: &Url, next_href: Option<String>) -> CrawlState {
        let Some(href) = next_href else {
            tracing::info!("No next page link on {}", url);
            return CrawlState::Done(StopReason::NoNextPage);
        };

        let next_url = match resolve_url(self.base_url, &href) {
            Ok(next_url) => next_url,
            Err(e) => {
                tracing::warn!("Unusable next page link '{}' on {}: {}", href, url, e);
                return CrawlState::Done(StopReason::NoNextPage);
            }
        };

        if self.visited_pages.contains(next_url.as_str()) {
            tracing::warn!("Next page {} was already visited in this run", next_url);
            return CrawlState::Done(StopReason::NoNextPage);
        }

        tracing::info!("Next page: {}", next_url);
        self.pacing.between_pages().await;
        CrawlState::FetchListPage { url: next_url }
    }
}
