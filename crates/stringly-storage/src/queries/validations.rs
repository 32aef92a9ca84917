//! `validation_patterns` table: membership tests and equality chains.

use rusqlite::{params, Connection};
use stringly_core::errors::StorageError;
use stringly_core::types::{SourceLocation, ValidationKind, ValidationPattern, ValueSet};

use super::sqlite_err;

/// Insert or replace the validation at `(file_path, line, col)`.
pub fn upsert_validation(conn: &Connection, v: &ValidationPattern) -> Result<(), StorageError> {
    let value_set = serde_json::to_string(&v.value_set).map_err(|e| StorageError::SqliteError {
        message: format!("encode value set: {e}"),
    })?;
    conn.prepare_cached(
        "INSERT INTO validation_patterns
            (file_path, line, col, variable_name, value_set, value_set_hash, value_count, pattern_type)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(file_path, line, col) DO UPDATE SET
           variable_name = excluded.variable_name,
           value_set = excluded.value_set,
           value_set_hash = excluded.value_set_hash,
           value_count = excluded.value_count,
           pattern_type = excluded.pattern_type",
    )
    .map_err(sqlite_err)?
    .execute(params![
        v.location.file_path,
        v.location.line as i64,
        v.location.column as i64,
        v.variable_name,
        value_set,
        v.value_set_hash,
        v.value_set.len() as i64,
        v.pattern_type.as_str(),
    ])
    .map_err(sqlite_err)?;
    Ok(())
}

/// Hashes whose rows span at least `min_distinct_files` distinct files.
pub fn cross_file_hashes(
    conn: &Connection,
    min_distinct_files: usize,
) -> Result<Vec<i64>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT value_set_hash FROM validation_patterns
             GROUP BY value_set_hash
             HAVING COUNT(DISTINCT file_path) >= ?1
             ORDER BY value_set_hash",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([min_distinct_files as i64], |row| row.get::<_, i64>(0))
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

/// All validations sharing `hash`, ordered by location.
pub fn validations_by_hash(
    conn: &Connection,
    hash: i64,
) -> Result<Vec<ValidationPattern>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT file_path, line, col, variable_name, value_set, value_set_hash, pattern_type
             FROM validation_patterns
             WHERE value_set_hash = ?1
             ORDER BY file_path, line, col",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([hash], map_raw_row)
        .map_err(sqlite_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sqlite_err)?;
    rows.into_iter().map(RawValidationRow::decode).collect()
}

/// Every stored validation, ordered by location.
pub fn all_validations(conn: &Connection) -> Result<Vec<ValidationPattern>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT file_path, line, col, variable_name, value_set, value_set_hash, pattern_type
             FROM validation_patterns
             ORDER BY file_path, line, col",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], map_raw_row)
        .map_err(sqlite_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sqlite_err)?;
    rows.into_iter().map(RawValidationRow::decode).collect()
}

struct RawValidationRow {
    file_path: String,
    line: i64,
    col: i64,
    variable_name: Option<String>,
    value_set: String,
    value_set_hash: i64,
    pattern_type: String,
}

fn map_raw_row(row: &rusqlite::Row) -> rusqlite::Result<RawValidationRow> {
    Ok(RawValidationRow {
        file_path: row.get(0)?,
        line: row.get(1)?,
        col: row.get(2)?,
        variable_name: row.get(3)?,
        value_set: row.get(4)?,
        value_set_hash: row.get(5)?,
        pattern_type: row.get(6)?,
    })
}

impl RawValidationRow {
    fn decode(self) -> Result<ValidationPattern, StorageError> {
        let value_set: ValueSet =
            serde_json::from_str(&self.value_set).map_err(|e| StorageError::DbCorrupt {
                details: format!(
                    "value_set at {}:{}:{}: {e}",
                    self.file_path, self.line, self.col
                ),
            })?;
        let pattern_type =
            ValidationKind::parse_str(&self.pattern_type).ok_or_else(|| StorageError::DbCorrupt {
                details: format!("unknown pattern_type {:?}", self.pattern_type),
            })?;
        Ok(ValidationPattern {
            variable_name: self.variable_name,
            value_set,
            value_set_hash: self.value_set_hash,
            pattern_type,
            location: SourceLocation::new(self.file_path, self.line as u32, self.col as u32),
        })
    }
}
