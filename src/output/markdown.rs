//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a crawl report:
//! run information, the ranked pages and the classifier side-lists.

use crate::output::{CrawlReport, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Maximum number of ranked pages listed in the summary
const MAX_RANKED_ROWS: usize = 50;

/// Maximum number of entries listed per side-list
const MAX_SIDE_LIST_ROWS: usize = 20;

/// Generates a markdown summary of a crawl report
///
/// # Arguments
///
/// * `report` - The finished crawl report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(report: &CrawlReport, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(report);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_summary(report: &CrawlReport) -> String {
    let mut md = String::new();

    md.push_str("# Ripple-Rank Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Finished**: {}\n", report.timestamp));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        report.duration_ms as f64 / 1000.0
    ));
    md.push_str(&format!("- **Status**: {}\n", report.status.as_str()));
    md.push_str(&format!(
        "- **Pages Crawled**: {}\n\n",
        report.total_urls_crawled
    ));

    // Ranked pages
    md.push_str("## Ranked Pages\n\n");
    if report.data.is_empty() {
        md.push_str("No pages were recorded.\n\n");
    } else {
        md.push_str("| # | URL | Rank | In-degree |\n");
        md.push_str("|---|-----|------|-----------|\n");
        for (position, entry) in report.data.iter().take(MAX_RANKED_ROWS).enumerate() {
            md.push_str(&format!(
                "| {} | {} | {:.6} | {} |\n",
                position + 1,
                entry.url,
                entry.rank,
                entry.in_degree
            ));
        }
        if report.data.len() > MAX_RANKED_ROWS {
            md.push_str(&format!(
                "\n... and {} more\n",
                report.data.len() - MAX_RANKED_ROWS
            ));
        }
        md.push('\n');
    }

    push_url_section(&mut md, "Blacklisted URLs", &report.blacklisted_urls);
    push_url_section(&mut md, "Low-Priority URLs", &report.low_priority_urls);

    md
}

fn push_url_section(md: &mut String, title: &str, urls: &[String]) {
    if urls.is_empty() {
        return;
    }

    md.push_str(&format!("## {}\n\n", title));
    md.push_str(&format!("Total: {}\n\n", urls.len()));
    for url in urls.iter().take(MAX_SIDE_LIST_ROWS) {
        md.push_str(&format!("- {}\n", url));
    }
    if urls.len() > MAX_SIDE_LIST_ROWS {
        md.push_str(&format!(
            "\n... and {} more\n",
            urls.len() - MAX_SIDE_LIST_ROWS
        ));
    }
    md.push('\n');
}
