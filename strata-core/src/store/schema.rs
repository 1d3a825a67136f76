use rusqlite::{Connection, Result as SqlResult};

/// Schema version for the project store.
pub const SCHEMA_VERSION: i32 = 1;

/// Create all tables if missing.
pub fn create_tables(conn: &Connection) -> SqlResult<()> {
    conn.execute_batch(SCHEMA_SQL)
}

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    meta_json TEXT NOT NULL
);

-- One row per bundle file. Exactly one of text/blob is set.
CREATE TABLE IF NOT EXISTS files (
    project_id TEXT NOT NULL,
    path TEXT NOT NULL,
    text TEXT,
    blob BLOB,
    PRIMARY KEY (project_id, path)
);
";
