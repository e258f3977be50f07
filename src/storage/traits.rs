//! Storage traits and error types
//!
//! This module defines the load/save interface shared by the persisted
//! stores and the errors they can produce.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A store that is loaded once at the start of a run and saved once at the end
///
/// Implementations decide how forgiving `load` is: the resume set starts over
/// on a damaged file, while the dataset refuses to load rather than risk
/// overwriting records it could not read.
pub trait PersistedStore: Sized {
    /// Loads the store from `path`; a missing file yields an empty store
    fn load(path: &Path) -> StorageResult<Self>;

    /// Writes the store to `path` in its deterministic on-disk order
    fn save(&self, path: &Path) -> StorageResult<()>;

    /// Number of entries in the store
    fn len(&self) -> usize;

    /// Returns true if the store holds no entries
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
