use rusqlite::Connection;

use crate::error::StorageError;

fn apply_pragmas(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
    ",
    )
}

/// Schema for the local adapter: one key-value table. The task collection
/// lives under a single key as a JSON array, mirroring a browser storage
/// slot.
pub fn init_local_schema(conn: &Connection) -> Result<(), StorageError> {
    apply_pragmas(conn)?;
    conn.execute_batch(LOCAL_SCHEMA_SQL)?;
    Ok(())
}

const LOCAL_SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS slots (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

/// Schema for the reference remote store: one relational row per task,
/// subtasks nested as a JSON column.
pub fn init_remote_schema(conn: &Connection) -> Result<(), StorageError> {
    apply_pragmas(conn)?;
    conn.execute_batch(REMOTE_SCHEMA_SQL)?;
    Ok(())
}

const REMOTE_SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS todos (
    id BLOB PRIMARY KEY CHECK (length(id) = 16),
    owner_id TEXT NOT NULL,
    title TEXT NOT NULL,
    position INTEGER NOT NULL,
    is_complete INTEGER NOT NULL DEFAULT 0,
    subtasks TEXT NOT NULL DEFAULT '[]',
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_todos_position ON todos (position);
";
