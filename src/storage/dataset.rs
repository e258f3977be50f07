//! The cumulative dataset: latest record per item URL

use crate::output::sort_records;
use crate::storage::json::{read_json_array, write_json_atomic};
use crate::storage::{PersistedStore, Record, StorageError, StorageResult};
use std::collections::HashMap;
use std::path::Path;

/// Outcome of inserting a record into the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// The URL was not in the dataset yet
    Inserted,
    /// An older record for the URL was overwritten
    Replaced,
}

/// Mapping from item URL to the most recent record scraped for it
///
/// Iteration order is unspecified. The on-disk order is decided solely by
/// [`sort_records`] when saving.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: HashMap<String, Record>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record, replacing any earlier record with the same URL entirely
    pub fn upsert(&mut self, record: Record) -> Upsert {
        match self.records.insert(record.url.clone(), record) {
            Some(_) => Upsert::Replaced,
            None => Upsert::Inserted,
        }
    }

    pub fn contains(&self, url: &str) -> bool {
        self.records.contains_key(url)
    }

    /// Records in unspecified order
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Records in persisted order
    pub fn to_sorted_vec(&self) -> Vec<&Record> {
        let mut records: Vec<&Record> = self.records.values().collect();
        sort_records(&mut records);
        records
    }
}

impl FromIterator<Record> for Dataset {
    /// Later records win when URLs repeat
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut dataset = Self::new();
        for record in iter {
            dataset.upsert(record);
        }
        dataset
    }
}

impl PersistedStore for Dataset {
    /// Loads the dataset
    ///
    /// A missing or empty file is an empty dataset, and so is one that cannot
    /// be read (with a warning). Unlike the resume set, a file that reads but
    /// does not parse is an error: merging into a dataset of unknown shape
    /// and saving would silently drop its records.
    fn load(path: &Path) -> StorageResult<Self> {
        match read_json_array::<Record>(path) {
            Ok(Some(records)) => {
                let dataset: Dataset = records.into_iter().collect();
                tracing::debug!("Loaded {} records from {}", dataset.len(), path.display());
                Ok(dataset)
            }
            Ok(None) => {
                tracing::info!("No dataset at {}, starting with an empty dataset", path.display());
                Ok(Self::new())
            }
            Err(e @ StorageError::Read { .. }) => {
                tracing::warn!("{}. Starting with an empty dataset", e);
                Ok(Self::new())
            }
            Err(e) => Err(e),
        }
    }

    fn save(&self, path: &Path) -> StorageResult<()> {
        write_json_atomic(path, &self.to_sorted_vec())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
