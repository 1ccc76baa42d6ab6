//! Per-crawl performance metrics
//!
//! Each finished crawl appends one CSV row to the metrics file, so repeated
//! runs with different pool sizes and depths can be compared side by side.
//! The header is written only when the file is new or empty.

use crate::config::CrawlerConfig;
use crate::output::{CrawlReport, OutputResult};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

const HEADER: &str =
    "finished_at,seed_url,pool_size,max_depth,total_urls_crawled,duration_ms,urls_per_second";

/// Performance figures for one crawl
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlMetrics {
    pub finished_at: String,
    pub seed_url: String,
    pub pool_size: u32,
    pub max_depth: u32,
    pub total_urls_crawled: usize,
    pub duration_ms: u64,
}

impl CrawlMetrics {
    pub fn new(report: &CrawlReport, seed_url: &str, config: &CrawlerConfig) -> Self {
        Self {
            finished_at: report.timestamp.clone(),
            seed_url: seed_url.to_string(),
            pool_size: config.pool_size,
            max_depth: config.max_depth,
            total_urls_crawled: report.total_urls_crawled,
            duration_ms: report.duration_ms,
        }
    }

    pub fn urls_per_second(&self) -> f64 {
        if self.duration_ms == 0 {
            0.0
        } else {
            self.total_urls_crawled as f64 * 1000.0 / self.duration_ms as f64
        }
    }

    fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{:.2}",
            csv_field(&self.finished_at),
            csv_field(&self.seed_url),
            self.pool_size,
            self.max_depth,
            self.total_urls_crawled,
            self.duration_ms,
            self.urls_per_second()
        )
    }

    /// Appends this crawl as one row of the CSV file at `path`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Row appended
    /// * `Err(OutputError)` - The file could not be opened or written
    pub fn append_to(&self, path: &Path) -> OutputResult<()> {
        let needs_header = fs::metadata(path).map_or(true, |meta| meta.len() == 0);

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if needs_header {
            writeln!(file, "{}", HEADER)?;
        }
        writeln!(file, "{}", self.to_csv_row())?;

        Ok(())
    }
}

/// Quotes a field if it holds a separator, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
