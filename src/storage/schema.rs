//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Lecture-Harvester database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track harvest runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT,
    status TEXT NOT NULL,
    no_audio INTEGER NOT NULL DEFAULT 0,
    missing_key_field INTEGER NOT NULL DEFAULT 0,
    disallowed INTEGER NOT NULL DEFAULT 0,
    already_present INTEGER NOT NULL DEFAULT 0,
    overwritten INTEGER NOT NULL DEFAULT 0,
    no_duration INTEGER NOT NULL DEFAULT 0,
    saved INTEGER NOT NULL DEFAULT 0
);

-- Imported lectures, keyed by lecturer|day|start
CREATE TABLE IF NOT EXISTS lectures (
    identity_key TEXT PRIMARY KEY,
    source TEXT NOT NULL,
    content_hash BLOB NOT NULL,
    scraped TEXT NOT NULL,
    title TEXT,
    type_title TEXT,
    lesson_type TEXT,
    lecturer TEXT NOT NULL,
    function TEXT,
    date TEXT NOT NULL,
    start_time TEXT NOT NULL,
    end_time TEXT NOT NULL,
    duration_sec INTEGER NOT NULL,
    audio_link TEXT NOT NULL,
    language TEXT NOT NULL,
    chair TEXT,
    video_link TEXT,
    scheduled INTEGER NOT NULL DEFAULT 0,
    converted INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_lectures_converted ON lectures(converted);
CREATE INDEX IF NOT EXISTS idx_lectures_language ON lectures(language);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
