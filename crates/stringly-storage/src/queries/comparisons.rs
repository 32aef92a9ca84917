//! `comparisons` table: single-literal equality tests, grouped by variable.

use rusqlite::{params, Connection};
use stringly_core::errors::StorageError;
use stringly_core::types::{Comparison, ComparisonOperator, SourceLocation};

use super::sqlite_err;

/// A variable compared against several distinct literals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableGroup {
    pub variable_name: String,
    pub distinct_values: usize,
    pub distinct_files: usize,
    pub comparisons: usize,
}

/// Insert or replace the comparison at `(file_path, line, col)`.
pub fn upsert_comparison(conn: &Connection, c: &Comparison) -> Result<(), StorageError> {
    conn.prepare_cached(
        "INSERT INTO comparisons (file_path, line, col, variable_name, compared_value, operator)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(file_path, line, col) DO UPDATE SET
           variable_name = excluded.variable_name,
           compared_value = excluded.compared_value,
           operator = excluded.operator",
    )
    .map_err(sqlite_err)?
    .execute(params![
        c.location.file_path,
        c.location.line as i64,
        c.location.column as i64,
        c.variable_name,
        c.compared_value,
        c.operator.as_str(),
    ])
    .map_err(sqlite_err)?;
    Ok(())
}

/// Variables compared against at least `min_values` distinct literals.
pub fn multi_value_variables(
    conn: &Connection,
    min_values: usize,
) -> Result<Vec<VariableGroup>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT variable_name,
                    COUNT(DISTINCT compared_value),
                    COUNT(DISTINCT file_path),
                    COUNT(*)
             FROM comparisons
             GROUP BY variable_name
             HAVING COUNT(DISTINCT compared_value) >= ?1
             ORDER BY variable_name",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([min_values as i64], |row| {
            Ok(VariableGroup {
                variable_name: row.get(0)?,
                distinct_values: row.get::<_, i64>(1)? as usize,
                distinct_files: row.get::<_, i64>(2)? as usize,
                comparisons: row.get::<_, i64>(3)? as usize,
            })
        })
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

/// All comparisons of one variable, ordered by location.
pub fn comparisons_for(
    conn: &Connection,
    variable_name: &str,
) -> Result<Vec<Comparison>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT file_path, line, col, variable_name, compared_value, operator
             FROM comparisons
             WHERE variable_name = ?1
             ORDER BY file_path, line, col",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([variable_name], |row| {
            Ok((
                SourceLocation::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)? as u32,
                    row.get::<_, i64>(2)? as u32,
                ),
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })
        .map_err(sqlite_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(sqlite_err)?;

    rows.into_iter()
        .map(|(location, variable_name, compared_value, operator)| {
            let operator =
                ComparisonOperator::parse_str(&operator).ok_or_else(|| StorageError::DbCorrupt {
                    details: format!("unknown comparison operator {operator:?}"),
                })?;
            Ok(Comparison {
                variable_name,
                compared_value,
                operator,
                location,
            })
        })
        .collect()
}
