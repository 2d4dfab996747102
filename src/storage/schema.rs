//! Checkpoint database schema
//!
//! The frontier is stored as two flat URL tables. Queue order is the
//! `position` column; priority classes are recomputed on restore.

/// SQL schema for the checkpoint database
pub const SCHEMA_SQL: &str = r#"
-- Track harvest runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- One row per committed checkpoint
CREATE TABLE IF NOT EXISTS checkpoints (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    saved_at TEXT NOT NULL,
    records_total INTEGER NOT NULL
);

-- Frontier: every URL already dequeued
CREATE TABLE IF NOT EXISTS frontier_visited (
    url TEXT PRIMARY KEY
);

-- Frontier: pending URLs in serving order
CREATE TABLE IF NOT EXISTS frontier_queue (
    position INTEGER PRIMARY KEY,
    url TEXT NOT NULL UNIQUE
);

-- Terminal state of every dequeued URL
CREATE TABLE IF NOT EXISTS page_outcomes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    url TEXT NOT NULL,
    state TEXT NOT NULL,
    records INTEGER NOT NULL DEFAULT 0,
    detail TEXT,
    processed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_page_outcomes_state ON page_outcomes(state);
CREATE INDEX IF NOT EXISTS idx_page_outcomes_url ON page_outcomes(url);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
