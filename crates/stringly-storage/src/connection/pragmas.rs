//! PRAGMA configuration applied to the store connection.
//!
//! The store never outlives one run, so durability is traded for speed:
//! in-memory journal, no fsync, temp structures in memory.

use rusqlite::Connection;
use stringly_core::errors::StorageError;

/// Apply all performance pragmas to a connection.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = MEMORY;
        PRAGMA synchronous = OFF;
        PRAGMA cache_size = -64000;
        PRAGMA temp_store = MEMORY;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .map_err(|e| StorageError::SqliteError {
        message: format!("failed to apply pragmas: {e}"),
    })
}

/// Read back the journal mode (used by tests).
pub fn journal_mode(conn: &Connection) -> Result<String, StorageError> {
    conn.pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| StorageError::SqliteError {
            message: e.to_string(),
        })
}
