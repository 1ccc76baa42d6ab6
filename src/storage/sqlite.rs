//! SQLite graph store implementation
//!
//! This module provides a SQLite-based implementation of the GraphStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Adjacency, GraphStore, StoreResult};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite graph store backend
pub struct SqliteGraphStore {
    conn: Connection,
}

impl SqliteGraphStore {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl GraphStore for SqliteGraphStore {
    fn clear(&mut self) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM links", [])?;
        tx.execute("DELETE FROM pages", [])?;
        tx.commit()?;
        Ok(())
    }

    fn upsert_node(&mut self, url: &str) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT OR IGNORE INTO pages (url, created_at) VALUES (?1, ?2)",
            params![url, now],
        )?;
        Ok(())
    }

    fn upsert_edge(&mut self, from: &str, to: &str) -> StoreResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO links (from_url, to_url) VALUES (?1, ?2)",
            params![from, to],
        )?;
        Ok(())
    }

    fn list_nodes(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT url FROM pages ORDER BY url")?;
        let nodes = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(nodes)
    }

    fn list_graph(&self) -> StoreResult<Adjacency> {
        let mut stmt = self.conn.prepare("SELECT from_url, to_url FROM links")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut graph = Adjacency::new();
        for row in rows {
            let (from, to) = row?;
            graph.entry(from).or_default().insert(to);
        }
        Ok(graph)
    }

    fn write_rank(&mut self, url: &str, rank: f64) -> StoreResult<()> {
        self.conn.execute(
            "UPDATE pages SET page_rank = ?1 WHERE url = ?2",
            params![rank, url],
        )?;
        Ok(())
    }

    fn count_nodes(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_edges(&self) -> StoreResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn top_ranked(&self, limit: usize) -> StoreResult<Vec<(String, f64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, page_rank FROM pages WHERE page_rank IS NOT NULL
             ORDER BY page_rank DESC, url ASC LIMIT ?1",
        )?;
        let ranked = stmt
            .query_map(params![limit as i64], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<(String, f64)>, _>>()?;
        Ok(ranked)
    }
}
