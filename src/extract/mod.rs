//! Extraction rules: turning catalog pages into records
//!
//! A ruleset is a declarative table, loaded from TOML, with two parts:
//! - listing rules that find item links and the "next page" link on list pages
//! - field rules mapping each [`RecordField`] to an ordered list of [`Probe`]s
//!
//! For each field the first probe producing a non-empty value wins. If no
//! probe produces anything the field stays empty; extraction never fails
//! as a whole. The crawl loop only ever talks to [`ExtractionRules`], so
//! nothing outside this module knows about site markup.
//!
//! # Example
//!
//! ```
//! use catalog_harvest::extract::ExtractionRules;
//! use scraper::Html;
//! use url::Url;
//!
//! let rules = ExtractionRules::builtin().unwrap();
//! let html = Html::parse_document(r#"<h1 class="single-post-title">Example Track</h1>"#);
//! let base = Url::parse("https://example.com").unwrap();
//! let url = base.join("/downloads/example-track/").unwrap();
//!
//! let record = rules.extract_record(&html, &url, &base);
//! assert_eq!(record.name, "Example Track");
//! assert_eq!(record.price, "");
//! ```

mod probe;

pub use probe::{Css, Probe};

use crate::state::{ListingEntry, ListingPage};
use crate::storage::{Record, RecordField};
use crate::url::resolve_or_empty;
use probe::element_text;
use scraper::Html;
use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

/// Ruleset for the reference catalog, shipped with the crate
const BUILTIN_RULES: &str = include_str!("builtin_rules.toml");

/// Errors raised while building a ruleset
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("Invalid CSS selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Built-in ruleset is invalid: {0}")]
    Builtin(String),
}

/// Ordered fallback chain for one record field
#[derive(Debug, Clone, Deserialize)]
pub struct FieldRule {
    /// Probes in priority order
    pub probes: Vec<Probe>,

    /// Resolve the winning value against the site base URL (for links)
    #[serde(default)]
    pub absolute: bool,
}

impl FieldRule {
    /// Returns the first non-empty probe result, or an empty string
    pub fn evaluate(&self, document: &Html, base: &Url) -> String {
        let value = self
            .probes
            .iter()
            .map(|probe| probe.evaluate(document))
            .find(|candidate| !candidate.is_empty())
            .unwrap_or_default();

        if self.absolute && !value.is_empty() {
            resolve_or_empty(base, &value)
        } else {
            value
        }
    }
}

/// Rules for list pages
#[derive(Debug, Clone, Deserialize)]
pub struct ListingRules {
    /// One match per catalog item
    pub item: Css,

    /// Anchor inside an item carrying its name (text) and link (href)
    pub link: Css,

    /// Anchor pointing at the next list page
    #[serde(rename = "next-page")]
    pub next_page: Css,
}

/// A complete, site-specific extraction ruleset
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionRules {
    pub listing: ListingRules,

    /// Field rules; fields without a rule are always empty
    #[serde(default)]
    pub fields: BTreeMap<RecordField, FieldRule>,
}

impl ExtractionRules {
    /// Loads the ruleset shipped for the reference catalog
    pub fn builtin() -> Result<Self, RulesError> {
        Self::from_toml(BUILTIN_RULES).map_err(|e| RulesError::Builtin(e.to_string()))
    }

    /// Parses a ruleset from a TOML document
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Extracts the listing entries and the next page link from a list page
    ///
    /// Every matched item yields an entry, in page order, even if its name or
    /// link is missing: position matters to the crawl loop.
    pub fn extract_listing(&self, document: &Html) -> ListingPage {
        let entries = document
            .select(self.listing.item.selector())
            .map(|item| {
                let anchor = item.select(self.listing.link.selector()).next();
                ListingEntry {
                    name: anchor.map(element_text).unwrap_or_default(),
                    href: anchor
                        .and_then(|a| a.value().attr("href"))
                        .map(|href| href.trim().to_string())
                        .unwrap_or_default(),
                }
            })
            .collect();

        ListingPage {
            entries,
            next_href: self.extract_next_page(document),
        }
    }

    /// Raw href of the first "next page" link, if present and non-empty
    pub fn extract_next_page(&self, document: &Html) -> Option<String> {
        document
            .select(self.listing.next_page.selector())
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| href.trim().to_string())
            .filter(|href| !href.is_empty())
    }

    /// Builds a record from a detail page
    ///
    /// Never fails: fields whose probes all miss are left empty, and the
    /// caller decides what to do with a record that has no name.
    pub fn extract_record(&self, document: &Html, url: &Url, base: &Url) -> Record {
        let mut record = Record::new(url.as_str());
        for (field, rule) in &self.fields {
            record.set_field(*field, rule.evaluate(document, base));
        }
        record
    }

    /// Record fields that have no rule in this ruleset
    pub fn uncovered_fields(&self) -> Vec<RecordField> {
        RecordField::ALL
            .into_iter()
            .filter(|field| !self.fields.contains_key(field))
            .collect()
    }
}
