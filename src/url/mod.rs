//! URL handling module for Catalog-Harvest
//!
//! Catalog pages link to items, authors and further list pages with a mix of
//! absolute and site-relative hrefs. Everything the crawler fetches or stores
//! goes through [`resolve_url`] first so that record URLs (the dataset's
//! identity key) are always absolute.

mod resolve;

pub use resolve::{resolve_or_empty, resolve_url};
