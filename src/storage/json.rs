//! JSON array file helpers shared by the persisted stores

use crate::storage::{StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Reads a JSON array document
///
/// Returns `Ok(None)` when the file does not exist, and an empty vector when
/// the file is empty or holds `null` (what older tools wrote for an empty
/// store).
pub fn read_json_array<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<Vec<T>>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(Some(Vec::new()));
    }

    let items: Option<Vec<T>> =
        serde_json::from_slice(&bytes).map_err(|source| StorageError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(Some(items.unwrap_or_default()))
}

/// Writes a value as pretty-printed JSON (two-space indent)
///
/// The document is written to a sibling `.tmp` file first and renamed over
/// the target, so readers never observe a half-written file.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> StorageResult<()> {
    let encoded = serde_json::to_vec_pretty(value)?;

    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, encoded).map_err(|source| StorageError::Write {
        path: tmp_path.clone(),
        source,
    })?;

    fs::rename(&tmp_path, path).map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}
