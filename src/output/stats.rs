//! Statistics over the persisted dataset and resume files
//!
//! Backs the `--stats` mode of the binary.

use crate::config::OutputConfig;
use crate::storage::{Dataset, PersistedStore, ResumeStore, StorageResult};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;

/// Number of authors listed in the summary
const TOP_AUTHORS: usize = 5;

/// Dataset statistics summary
#[derive(Debug, Clone, Default)]
pub struct DatasetStatistics {
    /// Records in the dataset
    pub total_records: usize,

    /// URLs in the resume set
    pub resume_entries: usize,

    /// Resume entries with no record in the dataset
    pub resume_only: usize,

    /// Records priced as free
    pub free: usize,

    /// Records with a non-free price
    pub paid: usize,

    /// Records with no price extracted
    pub unknown_price: usize,

    /// Records whose release date did not parse
    pub undated: usize,

    /// Records linking a dedicated server version
    pub with_server_version: usize,

    pub newest_release: Option<NaiveDate>,
    pub oldest_release: Option<NaiveDate>,

    /// Authors with the most records, most prolific first
    pub top_authors: Vec<(String, usize)>,
}

/// Computes statistics for a dataset and resume set already in memory
pub fn compute_statistics(dataset: &Dataset, resume: &ResumeStore) -> DatasetStatistics {
    let mut stats = DatasetStatistics {
        total_records: dataset.len(),
        resume_entries: resume.len(),
        resume_only: resume.iter().filter(|url| !dataset.contains(url)).count(),
        ..DatasetStatistics::default()
    };

    let mut authors: HashMap<&str, usize> = HashMap::new();

    for record in dataset.records() {
        let price = record.price.trim();
        if price.is_empty() {
            stats.unknown_price += 1;
        } else if price.eq_ignore_ascii_case("free") {
            stats.free += 1;
        } else {
            stats.paid += 1;
        }

        match record.release_date() {
            Some(date) => {
                stats.newest_release = stats.newest_release.max(Some(date));
                stats.oldest_release = Some(stats.oldest_release.map_or(date, |d| d.min(date)));
            }
            None => stats.undated += 1,
        }

        if record.server_version_url.is_some() {
            stats.with_server_version += 1;
        }

        if !record.author_name.is_empty() {
            *authors.entry(record.author_name.as_str()).or_default() += 1;
        }
    }

    let mut authors: Vec<(String, usize)> = authors
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect();
    authors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    authors.truncate(TOP_AUTHORS);
    stats.top_authors = authors;

    stats
}

/// Loads the persisted artifacts and computes their statistics
///
/// Uses the same load rules as a crawl: a corrupt dataset is an error, a
/// corrupt resume file counts as empty.
pub fn load_statistics(output: &OutputConfig) -> StorageResult<DatasetStatistics> {
    let dataset = Dataset::load(Path::new(&output.dataset_path))?;
    let resume = ResumeStore::load(Path::new(&output.resume_path))?;
    Ok(compute_statistics(&dataset, &resume))
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &DatasetStatistics) {
    println!("=== Dataset Statistics ===\n");

    println!("Overview:");
    println!("  Records: {}", stats.total_records);
    println!("  Processed URLs: {}", stats.resume_entries);
    if stats.resume_only > 0 {
        println!("  Processed URLs without a record: {}", stats.resume_only);
    }
    println!();

    println!("Pricing:");
    println!("  Free: {}", stats.free);
    println!("  Paid: {}", stats.paid);
    println!("  Unknown: {}", stats.unknown_price);
    println!();

    println!("Releases:");
    match (stats.newest_release, stats.oldest_release) {
        (Some(newest), Some(oldest)) => {
            println!("  Newest: {}", newest.format("%B %-d, %Y"));
            println!("  Oldest: {}", oldest.format("%B %-d, %Y"));
        }
        _ => println!("  No parseable release dates"),
    }
    println!("  Undated: {}", stats.undated);
    println!("  With server version: {}", stats.with_server_version);
    println!();

    if !stats.top_authors.is_empty() {
        println!("Top Authors:");
        for (author, count) in &stats.top_authors {
            println!("  - {} ({})", author, count);
        }
    }
}
