//! Structured crawl report
//!
//! The report is what a crawl returns to its caller: the crawl status, when it
//! finished, how many pages were recorded and every recorded page with its rank
//! and in-degree, highest rank first.

use crate::output::{OutputError, OutputResult};
use crate::rank::{in_degree, RankTable};
use crate::storage::Adjacency;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// How a crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrawlStatus {
    /// The frontier drained naturally
    Success,

    /// The visited-URL cap stopped dispatching early
    Capped,
}

impl CrawlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Capped => "capped",
        }
    }
}

/// One ranked page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedUrl {
    pub url: String,
    pub rank: f64,

    /// Number of recorded pages linking here
    pub in_degree: usize,
}

/// Result of one crawl
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlReport {
    pub status: CrawlStatus,

    /// RFC 3339 time the report was built
    pub timestamp: String,

    /// Number of pages recorded as nodes
    pub total_urls_crawled: usize,

    /// Wall time of the whole crawl including ranking
    pub duration_ms: u64,

    /// Recorded pages sorted by rank descending
    pub data: Vec<RankedUrl>,

    /// URLs matched by the blacklist or social-media rules, in discovery order
    pub blacklisted_urls: Vec<String>,

    /// URLs matched by the media or advertising rules, in discovery order
    pub low_priority_urls: Vec<String>,
}

impl CrawlReport {
    /// Builds a report from the finished graph and its ranks
    ///
    /// # Arguments
    ///
    /// * `status` - How the crawl ended
    /// * `nodes` - Every recorded page
    /// * `graph` - Outbound adjacency of the recorded pages
    /// * `ranks` - Ranks computed over `nodes` and `graph`
    pub fn build(
        status: CrawlStatus,
        nodes: &[String],
        graph: &Adjacency,
        ranks: &RankTable,
    ) -> Self {
        let data = ranks
            .sorted()
            .into_iter()
            .map(|(url, rank)| RankedUrl {
                url: url.to_string(),
                rank,
                in_degree: in_degree(url, nodes, graph),
            })
            .collect();

        Self {
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
            total_urls_crawled: nodes.len(),
            duration_ms: 0,
            data,
            blacklisted_urls: Vec::new(),
            low_priority_urls: Vec::new(),
        }
    }

    pub fn with_side_lists(mut self, blacklisted: Vec<String>, low_priority: Vec<String>) -> Self {
        self.blacklisted_urls = blacklisted;
        self.low_priority_urls = low_priority;
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Looks up the rank of a recorded page
    pub fn rank_of(&self, url: &str) -> Option<f64> {
        self.data
            .iter()
            .find(|entry| entry.url == url)
            .map(|entry| entry.rank)
    }

    /// Sum of all ranks (1.0 for any non-empty crawl)
    pub fn total_rank(&self) -> f64 {
        self.data.iter().map(|entry| entry.rank).sum()
    }

    /// Serializes the report as pretty-printed JSON
    pub fn to_json(&self) -> OutputResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| OutputError::Format(e.to_string()))
    }

    /// Writes the report as JSON to `path`
    pub fn write_json(&self, path: &Path) -> OutputResult<()> {
        let json = self.to_json()?;
        fs::write(path, json)?;
        Ok(())
    }
}
