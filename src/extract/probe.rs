//! Extraction probes: the individual strategies a field rule tries in order

use crate::extract::RulesError;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::fmt;

/// A CSS selector, validated when the ruleset is loaded
#[derive(Clone, Deserialize)]
#[serde(try_from = "String")]
pub struct Css {
    source: String,
    selector: Selector,
}

impl Css {
    pub fn new(source: &str) -> Result<Self, RulesError> {
        Self::try_from(source.to_string())
    }

    /// The selector as written in the ruleset
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl TryFrom<String> for Css {
    type Error = RulesError;

    fn try_from(source: String) -> Result<Self, Self::Error> {
        let selector = Selector::parse(&source).map_err(|e| RulesError::Selector {
            selector: source.clone(),
            message: format!("{:?}", e),
        })?;
        Ok(Self { source, selector })
    }
}

impl fmt::Debug for Css {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Css({:?})", self.source)
    }
}

/// One way of deriving a candidate value from a detail document
///
/// Every probe yields a string; an empty string means "no candidate" and
/// lets the field rule move on to its next probe.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Probe {
    /// Trimmed text of the first element matching `selector`
    Text { selector: Css },

    /// Trimmed `attr` attribute of the first element matching `selector`
    Attr { selector: Css, attr: String },

    /// Label/value rows: the first row whose `label` text equals `matches`
    /// (case-insensitively) supplies the text of its first `value` element,
    /// or that element's `attr` attribute when `attr` is set
    Labeled {
        rows: Css,
        label: Css,
        value: Css,
        matches: String,
        #[serde(default)]
        attr: Option<String>,
    },

    /// Text of the first `selector` element containing `marker`, accepted
    /// only if the whole text equals the marker case-insensitively
    Marker { selector: Css, marker: String },
}

impl Probe {
    /// Runs the probe against a document
    pub fn evaluate(&self, document: &Html) -> String {
        match self {
            Self::Text { selector } => document
                .select(selector.selector())
                .next()
                .map(element_text)
                .unwrap_or_default(),

            Self::Attr { selector, attr } => document
                .select(selector.selector())
                .next()
                .and_then(|element| element.value().attr(attr))
                .map(|value| value.trim().to_string())
                .unwrap_or_default(),

            Self::Labeled {
                rows,
                label,
                value,
                matches,
                attr,
            } => {
                let wanted = matches.trim().to_lowercase();
                // The first row with a matching label decides the value, even if empty
                document
                    .select(rows.selector())
                    .find_map(|row| {
                        let row_label: String = row.select(label.selector()).map(element_text).collect();
                        if row_label.trim().to_lowercase() != wanted {
                            return None;
                        }

                        let cell = row.select(value.selector()).next();
                        Some(match attr {
                            Some(attr) => cell
                                .and_then(|element| element.value().attr(attr))
                                .map(|v| v.trim().to_string())
                                .unwrap_or_default(),
                            None => cell.map(element_text).unwrap_or_default(),
                        })
                    })
                    .unwrap_or_default()
            }

            Self::Marker { selector, marker } => document
                .select(selector.selector())
                .map(element_text)
                .find(|text| text.contains(marker.as_str()))
                .filter(|text| text.to_lowercase() == marker.to_lowercase())
                .unwrap_or_default(),
        }
    }

    /// Short human-readable description, used by `--dry-run`
    pub fn describe(&self) -> String {
        match self {
            Self::Text { selector } => format!("text of `{}`", selector.as_str()),
            Self::Attr { selector, attr } => format!("@{} of `{}`", attr, selector.as_str()),
            Self::Labeled {
                rows,
                matches,
                attr,
                ..
            } => match attr {
                Some(attr) => format!("@{} of row \"{}\" in `{}`", attr, matches, rows.as_str()),
                None => format!("row \"{}\" in `{}`", matches, rows.as_str()),
            },
            Self::Marker { selector, marker } => {
                format!("marker \"{}\" in `{}`", marker, selector.as_str())
            }
        }
    }
}

/// Concatenated, trimmed text content of an element
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
