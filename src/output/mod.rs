//! Output module: merging the run's results into the persisted artifacts
//!
//! This module handles:
//! - The persisted sort order of dataset records
//! - Writing the dataset and resume files at the end of a run
//! - Statistics over existing artifacts

mod sort;
pub mod stats;

pub use sort::sort_records;
pub use stats::{load_statistics, print_statistics, DatasetStatistics};

use crate::config::OutputConfig;
use crate::storage::{Dataset, PersistedStore, ResumeStore, StorageResult};
use std::path::Path;

/// Writes the dataset and the resume set
///
/// Must only be called once the pipeline has fully drained. The dataset is
/// written first, sorted by [`sort_records`]; the resume set second. Either
/// write failing is returned to the caller, which aborts the run: no partial
/// success is attempted.
pub fn persist_run(
    dataset: &Dataset,
    resume: &ResumeStore,
    output: &OutputConfig,
) -> StorageResult<()> {
    let dataset_path = Path::new(&output.dataset_path);
    dataset.save(dataset_path)?;
    tracing::info!(
        "Saved {} records to {}",
        dataset.len(),
        dataset_path.display()
    );

    let resume_path = Path::new(&output.resume_path);
    resume.save(resume_path)?;
    tracing::info!(
        "Saved {} processed URLs to {}",
        resume.len(),
        resume_path.display()
    );

    Ok(())
}
