//! Storage module for persisting harvest state
//!
//! This module holds the two stores that survive between runs:
//! - the dataset, mapping each item URL to its latest [`Record`]
//! - the resume set of item URLs already handled
//!
//! Both are JSON array files, loaded once at the start of a run and saved
//! once at the end.

mod dataset;
mod json;
mod record;
mod resume;
mod traits;

pub use dataset::{Dataset, Upsert};
pub use json::{read_json_array, write_json_atomic};
pub use record::{Record, RecordField, RELEASE_DATE_FORMAT};
pub use resume::ResumeStore;
pub use traits::{PersistedStore, StorageError, StorageResult};
