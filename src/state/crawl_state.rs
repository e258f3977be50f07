//! Crawl loop state definitions
//!
//! The crawl loop walks the catalog one list page at a time. Each page moves
//! through the states below in order, then either loops back to
//! `FetchListPage` for the next page or ends in `Done`.

use std::fmt;
use url::Url;

/// One item link found on a list page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    /// Item name as shown on the list page (may be empty)
    pub name: String,

    /// Raw link href (may be empty or relative)
    pub href: String,
}

impl ListingEntry {
    /// Returns true if the entry has both a name and a link
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.href.is_empty()
    }
}

/// What the crawl loop needs from a list page, extracted while the document is alive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Item entries in page order
    pub entries: Vec<ListingEntry>,

    /// Raw href of the "next page" link, if the page has one
    pub next_href: Option<String>,
}

/// Represents the current state of the crawl loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlState {
    /// Fetch the list page at `url`
    FetchListPage { url: Url },

    /// Inspect the entries extracted from the fetched page
    ExtractListing { url: Url, page: ListingPage },

    /// Skip known entries, scrape new ones and hand records to the pipeline
    FilterAndDispatch { url: Url, page: ListingPage },

    /// Follow the page's "next page" link, if any
    DetermineNextPage { url: Url, next_href: Option<String> },

    /// Terminal state
    Done(StopReason),
}

impl CrawlState {
    /// List page URL the state refers to, if any
    pub fn page_url(&self) -> Option<&Url> {
        match self {
            Self::FetchListPage { url }
            | Self::ExtractListing { url, .. }
            | Self::FilterAndDispatch { url, .. }
            | Self::DetermineNextPage { url, .. } => Some(url),
            Self::Done(_) => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchListPage { .. } => "fetch_list_page",
            Self::ExtractListing { .. } => "extract_listing",
            Self::FilterAndDispatch { .. } => "filter_and_dispatch",
            Self::DetermineNextPage { .. } => "determine_next_page",
            Self::Done(_) => "done",
        }
    }
}

/// Why the crawl loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// The last list page had no "next page" link
    NoNextPage,

    /// A list page yielded no listing entries (end of catalog)
    EmptyListing,

    /// The first entry of a list page was already processed
    FirstEntryKnown,

    /// A list page could not be fetched and no next page could be recovered
    ListPageFailed,
}

impl StopReason {
    /// Returns true if the crawl reached a natural end of new content
    ///
    /// Only a list page failure means the catalog may hold items this run
    /// could not reach.
    pub fn is_complete(&self) -> bool {
        !matches!(self, Self::ListPageFailed)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::NoNextPage => "no next page link",
            Self::EmptyListing => "list page had no entries",
            Self::FirstEntryKnown => "first entry on page already processed",
            Self::ListPageFailed => "list page fetch failed",
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done(reason) => write!(f, "done ({})", reason),
            other => match other.page_url() {
                Some(url) => write!(f, "{} {}", other.name(), url),
                None => write!(f, "{}", other.name()),
            },
        }
    }
}
