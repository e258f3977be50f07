//! The resume set: URLs handled in any earlier run

use crate::storage::json::{read_json_array, write_json_atomic};
use crate::storage::{PersistedStore, StorageError, StorageResult};
use std::collections::BTreeSet;
use std::path::Path;

/// Persisted set of item URLs that have already been scraped
///
/// The set only grows: there is no remove operation. It is written as a
/// lexically sorted JSON array of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeStore {
    urls: BTreeSet<String>,
}

impl ResumeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a URL as handled; returns true if it was not known before
    pub fn merge(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    /// URLs in lexical order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ResumeStore {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl PersistedStore for ResumeStore {
    /// Loads the resume set
    ///
    /// Never fails: a missing file is an empty set, and an unreadable or
    /// unparseable file is logged and treated as an empty set so the run can
    /// start fresh.
    fn load(path: &Path) -> StorageResult<Self> {
        match read_json_array::<String>(path) {
            Ok(Some(urls)) => {
                tracing::debug!("Loaded {} processed URLs from {}", urls.len(), path.display());
                Ok(urls.into_iter().collect())
            }
            Ok(None) => {
                tracing::info!("No resume file at {}, starting with an empty set", path.display());
                Ok(Self::new())
            }
            Err(e @ StorageError::Parse { .. }) | Err(e @ StorageError::Read { .. }) => {
                tracing::warn!("{}. Starting with an empty resume set", e);
                Ok(Self::new())
            }
            Err(e) => Err(e),
        }
    }

    fn save(&self, path: &Path) -> StorageResult<()> {
        let urls: Vec<&str> = self.iter().collect();
        write_json_atomic(path, &urls)
    }

    fn len(&self) -> usize {
        self.urls.len()
    }
}
