//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Ripple-Rank graph store.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Fetched pages
CREATE TABLE IF NOT EXISTS pages (
    url TEXT PRIMARY KEY,
    page_rank REAL,
    created_at TEXT NOT NULL
);

-- Outbound links, targets need not be fetched pages
CREATE TABLE IF NOT EXISTS links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_url TEXT NOT NULL,
    to_url TEXT NOT NULL,
    UNIQUE(from_url, to_url)
);

CREATE INDEX IF NOT EXISTS idx_links_from ON links(from_url);
CREATE INDEX IF NOT EXISTS idx_links_to ON links(to_url);
CREATE INDEX IF NOT EXISTS idx_pages_rank ON pages(page_rank);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
