//! Storage module for persisting the crawl graph
//!
//! This module handles all database operations for the crawler:
//! - SQLite database initialization and schema management
//! - Node and edge persistence during the crawl
//! - Graph snapshots for rank computation
//! - Rank write-back and ranked lookups

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteGraphStore;
pub use traits::{Adjacency, GraphStore, StoreError, StoreResult};

use std::path::Path;
use std::sync::{Arc, Mutex};

/// Graph store shared between the scheduler and its workers
pub type SharedStore = Arc<Mutex<dyn GraphStore>>;

/// Initializes or opens the SQLite graph store at `path`
pub fn open_store(path: &Path) -> StoreResult<SqliteGraphStore> {
    SqliteGraphStore::new(path)
}
