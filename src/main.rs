//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for the incremental catalog scraper.

use anyhow::Context;
use catalog_harvest::config::{load_config_with_hash, Config};
use catalog_harvest::crawler::{run_crawl, CrawlOptions};
use catalog_harvest::extract::ExtractionRules;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Catalog-Harvest: an incremental catalog scraper
///
/// Walks a paginated catalog, scrapes every item it has not seen before and
/// merges the results into a sorted JSON dataset. Items handled by earlier
/// runs are remembered in a resume file.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version)]
#[command(about = "An incremental catalog scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Re-scrape every listed item, ignoring the resume file
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    fresh: bool,

    /// Validate config and show the effective settings without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics for the existing dataset and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config, cli.fresh).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_harvest=info,warn"),
            1 => EnvFilter::new("catalog_harvest=debug,info"),
            2 => EnvFilter::new("catalog_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective settings and ruleset
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    println!("=== Catalog-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Start URL: {}", config.site.start_url);

    let crawler = &config.crawler;
    println!("\nCrawler Configuration:");
    println!("  Max attempts: {}", crawler.max_attempts);
    println!("  Retry delay: {}ms", crawler.retry_delay);
    println!("  Request timeout: {}s", crawler.request_timeout);
    println!("  Detail delay: {}ms", crawler.detail_delay);
    println!("  Page delay: {}ms", crawler.page_delay);
    println!("  Queue capacity: {}", crawler.queue_capacity);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.value);

    println!("\nOutput:");
    println!("  Dataset: {}", config.output.dataset_path);
    println!("  Resume file: {}", config.output.resume_path);

    let (rules, origin) = match &config.rules {
        Some(rules) => (rules.clone(), "from config"),
        None => (
            ExtractionRules::builtin().context("built-in extraction rules are invalid")?,
            "built-in",
        ),
    };

    println!("\nExtraction Rules ({}):", origin);
    println!("  Listing item: {}", rules.listing.item.as_str());
    println!("  Listing link: {}", rules.listing.link.as_str());
    println!("  Next page: {}", rules.listing.next_page.as_str());
    for (field, rule) in &rules.fields {
        let suffix = if rule.absolute { " (absolute)" } else { "" };
        println!("  {}{}:", field, suffix);
        for probe in &rule.probes {
            println!("    - {}", probe.describe());
        }
    }

    let uncovered = rules.uncovered_fields();
    if !uncovered.is_empty() {
        let names: Vec<&str> = uncovered.iter().map(|f| f.as_str()).collect();
        println!("  (always empty: {})", names.join(", "));
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: shows statistics for the persisted dataset
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    use catalog_harvest::output::{load_statistics, print_statistics};

    println!("Dataset: {}", config.output.dataset_path);
    println!("Resume file: {}\n", config.output.resume_path);

    let stats = load_statistics(&config.output).context("failed to load dataset")?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring processed URLs)");
    } else {
        tracing::info!("Starting crawl");
    }
    tracing::info!("Start page: {}", config.site.start_url);

    let report = run_crawl(config, CrawlOptions { fresh })
        .await
        .context("crawl failed")?;

    if report.stop_reason.is_complete() {
        tracing::info!("Crawl completed successfully");
    } else {
        tracing::warn!(
            "Crawl ended early ({}); items beyond the failed list page were not reached",
            report.stop_reason
        );
    }
    println!("{}", report);
    Ok(())
}
