//! State management module
//!
//! This module defines the crawl loop's states and stop reasons, and the
//! list page data carried between states.

mod crawl_state;

pub use crawl_state::{CrawlState, ListingEntry, ListingPage, StopReason};
