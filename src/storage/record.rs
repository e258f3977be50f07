//! The scraped item record and the names of its extractable fields

use chrono::{DateTime, FixedOffset, Local, NaiveDate, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display format of the catalog's release dates, e.g. "January 2, 2006"
pub const RELEASE_DATE_FORMAT: &str = "%B %d, %Y";

/// One item scraped from a catalog detail page
///
/// The URL is the identity key; every other field may be empty when
/// extraction misses softly. The JSON keys match the dataset files written by
/// earlier versions of the harvester.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    #[serde(rename = "track_name")]
    pub name: String,

    #[serde(rename = "track_url")]
    pub url: String,

    pub author_name: String,
    pub author_url: String,

    /// Free-form price text, "Free" for free items, empty if unknown
    pub price: String,

    /// Release date as displayed by the catalog
    pub released_date: String,
    pub last_updated: String,
    pub file_size: String,
    pub version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_version_url: Option<String>,

    #[serde(rename = "ingame_mod_name", skip_serializing_if = "Option::is_none")]
    pub in_game_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,

    #[serde(rename = "compatible_with_beta", skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<String>,

    /// RFC 3339 time at which the record was scraped
    pub scraped_timestamp: String,
}

impl Record {
    /// Creates an empty record for the given item URL, stamped with the current time
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            scraped_timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            ..Self::default()
        }
    }

    /// Parsed release date, `None` when the display string is not recognized
    ///
    /// The month must be spelled out in full. `%B` alone also accepts "Mar".
    pub fn release_date(&self) -> Option<NaiveDate> {
        let text = self.released_date.trim();
        let date = NaiveDate::parse_from_str(text, RELEASE_DATE_FORMAT).ok()?;
        let month = text.split_whitespace().next()?;
        month
            .eq_ignore_ascii_case(&date.format("%B").to_string())
            .then_some(date)
    }

    /// Parsed scrape timestamp, `None` when it is not valid RFC 3339
    pub fn scraped_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(self.scraped_timestamp.trim()).ok()
    }

    /// Stores an extracted value into the named field
    ///
    /// Empty values leave optional fields unset.
    pub fn set_field(&mut self, field: RecordField, value: String) {
        let optional = if value.is_empty() { None } else { Some(value.clone()) };

        match field {
            RecordField::Name => self.name = value,
            RecordField::AuthorName => self.author_name = value,
            RecordField::AuthorUrl => self.author_url = value,
            RecordField::Price => self.price = value,
            RecordField::Released => self.released_date = value,
            RecordField::LastUpdated => self.last_updated = value,
            RecordField::FileSize => self.file_size = value,
            RecordField::Version => self.version = value,
            RecordField::ServerVersion => self.server_version_url = optional,
            RecordField::InGameName => self.in_game_name = optional,
            RecordField::Difficulty => self.difficulty = optional,
            RecordField::Compatibility => self.compatibility = optional,
        }
    }
}

/// Record fields that are filled in by extraction rules
///
/// The URL and scrape timestamp are not listed: they come from the crawl
/// itself, never from page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum RecordField {
    Name,
    AuthorName,
    AuthorUrl,
    Price,
    Released,
    LastUpdated,
    FileSize,
    Version,
    ServerVersion,
    InGameName,
    Difficulty,
    Compatibility,
}

impl RecordField {
    pub const ALL: [RecordField; 12] = [
        Self::Name,
        Self::AuthorName,
        Self::AuthorUrl,
        Self::Price,
        Self::Released,
        Self::LastUpdated,
        Self::FileSize,
        Self::Version,
        Self::ServerVersion,
        Self::InGameName,
        Self::Difficulty,
        Self::Compatibility,
    ];

    /// Key used for this field in rule tables
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::AuthorName => "author-name",
            Self::AuthorUrl => "author-url",
            Self::Price => "price",
            Self::Released => "released",
            Self::LastUpdated => "last-updated",
            Self::FileSize => "file-size",
            Self::Version => "version",
            Self::ServerVersion => "server-version",
            Self::InGameName => "in-game-name",
            Self::Difficulty => "difficulty",
            Self::Compatibility => "compatibility",
        }
    }
}

impl FromStr for RecordField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| format!("unknown record field '{}'", s))
    }
}

impl TryFrom<String> for RecordField {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
