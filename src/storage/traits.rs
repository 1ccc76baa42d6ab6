//! Storage traits and error types
//!
//! This module defines the trait interface for graph store backends and
//! associated error types.

use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors that can occur during graph store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for graph store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Outbound adjacency: source URL to the set of URLs it links to
pub type Adjacency = HashMap<String, HashSet<String>>;

/// Trait for graph store implementations
///
/// The crawler writes one node per fetched page and one edge per outbound
/// link, then reads the whole graph back once the crawl has finished.
/// Nodes and edges have set semantics: writing the same one twice is a no-op.
pub trait GraphStore: Send {
    /// Removes every node, edge and rank
    fn clear(&mut self) -> StoreResult<()>;

    /// Records a fetched page
    fn upsert_node(&mut self, url: &str) -> StoreResult<()>;

    /// Records a link from `from` to `to`
    ///
    /// The target does not need to be a node; links to pages that were never
    /// fetched are kept so out-degree reflects the page as it was seen.
    fn upsert_edge(&mut self, from: &str, to: &str) -> StoreResult<()>;

    /// Lists every node URL
    fn list_nodes(&self) -> StoreResult<Vec<String>>;

    /// Lists the outbound adjacency of every node that has links
    fn list_graph(&self) -> StoreResult<Adjacency>;

    /// Stores the computed rank of a node
    fn write_rank(&mut self, url: &str, rank: f64) -> StoreResult<()>;

    // ===== Statistics =====

    fn count_nodes(&self) -> StoreResult<u64>;

    fn count_edges(&self) -> StoreResult<u64>;

    /// Returns up to `limit` ranked nodes, highest rank first
    fn top_ranked(&self, limit: usize) -> StoreResult<Vec<(String, f64)>>;
}
