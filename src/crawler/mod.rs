//! Crawler module for catalog fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Politeness delays between requests
//! - The list page state machine
//! - Overall run coordination, from loading the stores to persisting them

mod fetcher;
mod pacing;
mod paginator;

pub use fetcher::{build_http_client, FetchError, Fetcher};
pub use pacing::Pacing;
pub use paginator::{CrawlProgress, Paginator};

use crate::config::{validate, Config};
use crate::extract::ExtractionRules;
use crate::output::persist_run;
use crate::pipeline::{self, CollectStats, Collector};
use crate::state::StopReason;
use crate::storage::{Dataset, PersistedStore, ResumeStore};
use crate::ScrapeError;
use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};
use url::Url;

/// Options that change how a single run treats previous results
#[derive(Debug, Clone, Copy, Default)]
pub struct CrawlOptions {
    /// Ignore the resume set when filtering listing entries
    ///
    /// Every listed item is scraped again. The saved resume set still
    /// contains everything it held before the run.
    pub fresh: bool,
}

/// Summary of a completed run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub stop_reason: StopReason,
    pub progress: CrawlProgress,
    pub collected: CollectStats,
    pub dataset_before: usize,
    pub dataset_after: usize,
    pub resume_size: usize,
    pub elapsed: Duration,
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Crawl finished: {}", self.stop_reason)?;
        writeln!(
            f,
            "  List pages:      {} visited, {} failed",
            self.progress.pages_visited, self.progress.pages_failed
        )?;
        writeln!(
            f,
            "  Listing entries: {} seen, {} already processed",
            self.progress.entries_seen, self.progress.entries_known
        )?;
        writeln!(
            f,
            "  Records:         {} new, {} updated",
            self.collected.inserted, self.collected.replaced
        )?;
        writeln!(
            f,
            "  Skipped:         {} fetch failures, {} without a name",
            self.progress.detail_failures, self.progress.unnamed_records
        )?;
        writeln!(
            f,
            "  Dataset:         {} -> {} records",
            self.dataset_before, self.dataset_after
        )?;
        writeln!(f, "  Resume set:      {} URLs", self.resume_size)?;
        write!(f, "  Elapsed:         {:.1}s", self.elapsed.as_secs_f64())
    }
}

/// Runs a complete crawl
///
/// This is the main entry point for a run. It will:
/// 1. Validate the configuration
/// 2. Load the resume set (leniently) and the dataset (strictly)
/// 3. Build the HTTP client and the extraction ruleset
/// 4. Start the collector and walk the catalog
/// 5. Wait for the collector to drain the queue
/// 6. Write the sorted dataset and the resume set
///
/// Nothing is written if any step before persistence fails.
pub async fn run_crawl(config: Config, options: CrawlOptions) -> Result<CrawlReport, ScrapeError> {
    let started = Instant::now();
    validate(&config)?;

    let resume = ResumeStore::load(Path::new(&config.output.resume_path))?;
    let dataset = Dataset::load(Path::new(&config.output.dataset_path))?;
    tracing::info!(
        "Loaded {} processed URLs and {} records",
        resume.len(),
        dataset.len()
    );
    let dataset_before = dataset.len();

    // The crawl loop keeps its own copy; the collector owns the saved set
    let known = if options.fresh {
        tracing::info!("Fresh run: ignoring {} processed URLs", resume.len());
        ResumeStore::new()
    } else {
        resume.clone()
    };

    let client = build_http_client(&config)?;
    let rules = match &config.rules {
        Some(rules) => rules.clone(),
        None => ExtractionRules::builtin()?,
    };
    let base_url = Url::parse(&config.site.base_url)?;
    let start_url = Url::parse(&config.site.start_url)?;

    let (sender, receiver) = pipeline::bounded(config.crawler.queue_capacity);
    let collector = Collector::new(dataset, resume).spawn(receiver);

    let paginator = Paginator::new(
        Fetcher::from_config(&client, &config),
        &rules,
        &base_url,
        Pacing::from_config(&config.crawler),
        known,
    );
    let crawl = paginator.run(start_url, &sender).await;

    // The collector only finishes once every sender is gone
    sender.close();
    let collected = collector.finish().await?;
    let (stop_reason, progress) = crawl?;

    tracing::info!(
        "Found and processed {} new items in this run",
        progress.records_sent
    );

    persist_run(&collected.dataset, &collected.resume, &config.output)?;

    Ok(CrawlReport {
        stop_reason,
        progress,
        collected: collected.stats,
        dataset_before,
        dataset_after: collected.dataset.len(),
        resume_size: collected.resume.len(),
        elapsed: started.elapsed(),
    })
}
