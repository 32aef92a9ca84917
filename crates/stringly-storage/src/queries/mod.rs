//! Per-table insert, delete, and aggregate queries.

pub mod call_arguments;
pub mod comparisons;
pub mod validations;

pub use call_arguments::{CallSiteGroup, OccurrenceBasis};
pub use comparisons::VariableGroup;

use rusqlite::Connection;
use stringly_core::errors::StorageError;
use stringly_core::types::PatternInstance;

pub(crate) fn sqlite_err(e: rusqlite::Error) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}

/// Upsert one instance into the table for its kind.
pub fn upsert_instance(conn: &Connection, instance: &PatternInstance) -> Result<(), StorageError> {
    match instance {
        PatternInstance::Validation(v) => validations::upsert_validation(conn, v),
        PatternInstance::Comparison(c) => comparisons::upsert_comparison(conn, c),
        PatternInstance::CallArgument(a) => call_arguments::upsert_call_argument(conn, a),
    }
}

/// Delete every row belonging to `file_path` across all pattern tables.
/// Returns the number of rows removed.
pub fn delete_file(conn: &Connection, file_path: &str) -> Result<usize, StorageError> {
    let mut removed = 0;
    for table in ["validation_patterns", "comparisons", "function_calls"] {
        removed += conn
            .execute(&format!("DELETE FROM {table} WHERE file_path = ?1"), [file_path])
            .map_err(sqlite_err)?;
    }
    Ok(removed)
}

/// Remove all rows from all pattern tables.
pub fn delete_all(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "DELETE FROM validation_patterns;
         DELETE FROM comparisons;
         DELETE FROM function_calls;",
    )
    .map_err(sqlite_err)
}

/// Count rows in a table.
pub fn count_rows(conn: &Connection, table: &str) -> Result<usize, StorageError> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|n| n as usize)
    .map_err(sqlite_err)
}

/// Number of distinct files with at least one stored instance.
pub fn count_distinct_files(conn: &Connection) -> Result<usize, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM (
            SELECT file_path FROM validation_patterns
            UNION SELECT file_path FROM comparisons
            UNION SELECT file_path FROM function_calls
         )",
        [],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n as usize)
    .map_err(sqlite_err)
}
