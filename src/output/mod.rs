//! Output module for crawl reports and summaries
//!
//! This module handles:
//! - The structured crawl report and its JSON form
//! - Generating markdown summaries of crawl results
//! - Appending per-crawl performance metrics to a CSV file
//! - Reading statistics back from the graph store

mod markdown;
mod metrics;
mod report;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use metrics::CrawlMetrics;
pub use report::{CrawlReport, CrawlStatus, RankedUrl};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Writes the report and summary files named in the output configuration
///
/// # Arguments
///
/// * `report` - The finished crawl report
/// * `report_path` - Where to write the JSON report, if anywhere
/// * `summary_path` - Where to write the markdown summary, if anywhere
pub fn write_outputs(
    report: &CrawlReport,
    report_path: Option<&std::path::Path>,
    summary_path: Option<&std::path::Path>,
) -> OutputResult<()> {
    if let Some(path) = report_path {
        report.write_json(path)?;
        tracing::info!("Report written to {}", path.display());
    }

    if let Some(path) = summary_path {
        generate_markdown_summary(report, path)?;
        tracing::info!("Summary written to {}", path.display());
    }

    Ok(())
}
