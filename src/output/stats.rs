//! Statistics generation from the graph store
//!
//! This module provides functionality for extracting and displaying the
//! graph left behind by the last crawl.

use crate::storage::GraphStore;
use crate::Result;

/// Number of top-ranked pages loaded for display
pub const TOP_RANKED_LIMIT: usize = 20;

/// Graph store statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStatistics {
    /// Number of recorded pages
    pub total_nodes: u64,

    /// Number of recorded links
    pub total_edges: u64,

    /// Highest ranked pages, best first
    pub top_ranked: Vec<(String, f64)>,
}

impl CrawlStatistics {
    /// Average number of outbound links per recorded page
    pub fn average_out_degree(&self) -> f64 {
        if self.total_nodes == 0 {
            0.0
        } else {
            self.total_edges as f64 / self.total_nodes as f64
        }
    }
}

/// Loads statistics from the graph store
///
/// # Arguments
///
/// * `store` - The graph store to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(RippleError)` - Failed to query statistics
pub fn load_statistics(store: &dyn GraphStore) -> Result<CrawlStatistics> {
    Ok(CrawlStatistics {
        total_nodes: store.count_nodes()?,
        total_edges: store.count_edges()?,
        top_ranked: store.top_ranked(TOP_RANKED_LIMIT)?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages recorded: {}", stats.total_nodes);
    println!("  Links recorded: {}", stats.total_edges);
    println!(
        "  Average outbound links per page: {:.2}",
        stats.average_out_degree()
    );
    println!();

    if stats.top_ranked.is_empty() {
        println!("No ranked pages yet.");
        return;
    }

    println!("Top {} Ranked Pages:", stats.top_ranked.len());
    for (position, (url, rank)) in stats.top_ranked.iter().enumerate() {
        println!("  {:>3}. {:.6}  {}", position + 1, rank, url);
    }
}
