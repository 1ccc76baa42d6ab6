//! Ripple-Rank main entry point
//!
//! This is the command-line interface for the Ripple-Rank crawler.

use anyhow::{bail, Context};
use clap::Parser;
use ripple_rank::classify::UrlClass;
use ripple_rank::config::{load_config_with_hash, Config};
use ripple_rank::crawler::{canonicalize, run_crawl};
use ripple_rank::output::{
    load_statistics, print_statistics, write_outputs, CrawlMetrics, CrawlReport,
};
use ripple_rank::storage::open_store;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Ripple-Rank: a priority crawler that ranks the link graph it discovers
///
/// Ripple-Rank crawls outward from a seed URL up to a maximum depth, fetching
/// the most promising pages first, and ranks every page it visited by how the
/// crawled pages link to each other.
#[derive(Parser, Debug)]
#[command(name = "ripple-rank")]
#[command(version)]
#[command(about = "A priority crawler that ranks the link graph it discovers", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// URL to start crawling from
    #[arg(long, value_name = "URL", required_unless_present = "stats")]
    seed: Option<String>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and classify the seed without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.stats {
        return handle_stats(&config);
    }

    let Some(seed) = cli.seed.as_deref() else {
        bail!("--seed is required unless --stats is given");
    };

    if cli.dry_run {
        handle_dry_run(&config, seed)
    } else {
        handle_crawl(&config, seed, cli.json).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("ripple_rank=info,warn"),
            1 => EnvFilter::new("ripple_rank=debug,info"),
            2 => EnvFilter::new("ripple_rank=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows how the seed would be scheduled
fn handle_dry_run(config: &Config, seed: &str) -> anyhow::Result<()> {
    println!("=== Ripple-Rank Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Pool size: {}", config.crawler.pool_size);
    println!("  Rate limit: {} fetches/sec", config.crawler.rate_limit);
    println!("  Poll interval: {}ms", config.crawler.poll_interval_ms);
    match config.crawler.max_visited_urls {
        Some(cap) => println!("  Visited cap: {}", cap),
        None => println!("  Visited cap: none"),
    }

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);
    println!(
        "  Request timeout: {}s",
        config.user_agent.request_timeout_secs
    );

    println!("\nRank:");
    println!("  Max iterations: {}", config.rank.max_iterations);
    println!(
        "  Convergence threshold: {:e}",
        config.rank.convergence_threshold
    );

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    if let Some(path) = &config.output.report_path {
        println!("  Report: {}", path);
    }
    if let Some(path) = &config.output.summary_path {
        println!("  Summary: {}", path);
    }
    if let Some(path) = &config.output.metrics_path {
        println!("  Metrics: {}", path);
    }

    let seed = canonicalize(seed).with_context(|| format!("invalid seed {}", seed))?;
    let class = UrlClass::of(&seed);

    println!("\nSeed:");
    println!("  URL: {}", seed);
    println!("  Class: {:?}", class);
    println!("  Priority: {}", class.priority());

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let store = open_store(Path::new(&config.output.database_path))
        .context("failed to open graph store")?;
    let stats = load_statistics(&store)?;

    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, seed: &str, json: bool) -> anyhow::Result<()> {
    let report = match run_crawl(config, seed).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!(
        "Crawl {} with {} pages ranked",
        report.status.as_str(),
        report.total_urls_crawled
    );

    write_outputs(
        &report,
        config.output.report_path.as_deref().map(Path::new),
        config.output.summary_path.as_deref().map(Path::new),
    )
    .context("failed to write crawl outputs")?;

    if let Some(path) = config.output.metrics_path.as_deref() {
        CrawlMetrics::new(&report, seed, &config.crawler)
            .append_to(Path::new(path))
            .with_context(|| format!("failed to append metrics to {}", path))?;
        tracing::info!("Metrics appended to {}", path);
    }

    if json {
        println!("{}", report.to_json()?);
    } else {
        print_report(&report);
    }

    Ok(())
}

/// Prints the ranked pages as a plain table
fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===\n");
    println!("Status: {}", report.status.as_str());
    println!("Finished: {}", report.timestamp);
    println!("Pages crawled: {}", report.total_urls_crawled);
    println!("Duration: {:.2}s", report.duration_ms as f64 / 1000.0);
    println!(
        "Blacklisted URLs seen: {}, low-priority URLs seen: {}",
        report.blacklisted_urls.len(),
        report.low_priority_urls.len()
    );
    println!();

    println!("{:>4}  {:>10}  {:>9}  URL", "#", "Rank", "In-degree");
    for (position, entry) in report.data.iter().enumerate() {
        println!(
            "{:>4}  {:>10.6}  {:>9}  {}",
            position + 1,
            entry.rank,
            entry.in_degree,
            entry.url
        );
    }
}
