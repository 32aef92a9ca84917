//! `function_calls` table: string literals passed positionally to a callee.

use rusqlite::{params, Connection};
use stringly_core::errors::StorageError;
use stringly_core::types::{FunctionCallArgument, SourceLocation};

use super::sqlite_err;

/// What counts as one occurrence of a call-site group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceBasis {
    /// Distinct files containing the call.
    Files,
    /// Individual call sites.
    Calls,
}

/// A `(callee_name, param_index)` group with its cardinality and spread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSiteGroup {
    pub callee_name: String,
    pub param_index: u32,
    pub distinct_values: usize,
    pub distinct_files: usize,
    pub calls: usize,
}

/// Insert or replace the argument at `(file_path, line, col)`.
pub fn upsert_call_argument(
    conn: &Connection,
    a: &FunctionCallArgument,
) -> Result<(), StorageError> {
    conn.prepare_cached(
        "INSERT INTO function_calls (file_path, line, col, callee_name, param_index, string_value)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(file_path, line, col) DO UPDATE SET
           callee_name = excluded.callee_name,
           param_index = excluded.param_index,
           string_value = excluded.string_value",
    )
    .map_err(sqlite_err)?
    .execute(params![
        a.location.file_path,
        a.location.line as i64,
        a.location.column as i64,
        a.callee_name,
        a.param_index as i64,
        a.string_value,
    ])
    .map_err(sqlite_err)?;
    Ok(())
}

/// Groups whose distinct-value count lies in `[min_values, max_values]` and
/// whose occurrences (per `basis`) reach `min_locations`.
pub fn bounded_cardinality_callsites(
    conn: &Connection,
    min_values: usize,
    max_values: usize,
    min_locations: usize,
    basis: OccurrenceBasis,
) -> Result<Vec<CallSiteGroup>, StorageError> {
    let occurrence = match basis {
        OccurrenceBasis::Files => "COUNT(DISTINCT file_path)",
        OccurrenceBasis::Calls => "COUNT(*)",
    };
    let sql = format!(
        "SELECT callee_name, param_index,
                COUNT(DISTINCT string_value),
                COUNT(DISTINCT file_path),
                COUNT(*)
         FROM function_calls
         GROUP BY callee_name, param_index
         HAVING COUNT(DISTINCT string_value) BETWEEN ?1 AND ?2
            AND {occurrence} >= ?3
         ORDER BY callee_name, param_index"
    );
    let mut stmt = conn.prepare_cached(&sql).map_err(sqlite_err)?;
    let rows = stmt
        .query_map(
            params![min_values as i64, max_values as i64, min_locations as i64],
            |row| {
                Ok(CallSiteGroup {
                    callee_name: row.get(0)?,
                    param_index: row.get::<_, i64>(1)? as u32,
                    distinct_values: row.get::<_, i64>(2)? as usize,
                    distinct_files: row.get::<_, i64>(3)? as usize,
                    calls: row.get::<_, i64>(4)? as usize,
                })
            },
        )
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}

/// All arguments recorded for one `(callee_name, param_index)`.
pub fn call_arguments_for(
    conn: &Connection,
    callee_name: &str,
    param_index: u32,
) -> Result<Vec<FunctionCallArgument>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT file_path, line, col, callee_name, param_index, string_value
             FROM function_calls
             WHERE callee_name = ?1 AND param_index = ?2
             ORDER BY file_path, line, col",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![callee_name, param_index as i64], |row| {
            Ok(FunctionCallArgument {
                location: SourceLocation::new(
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)? as u32,
                    row.get::<_, i64>(2)? as u32,
                ),
                callee_name: row.get(3)?,
                param_index: row.get::<_, i64>(4)? as u32,
                string_value: row.get(5)?,
            })
        })
        .map_err(sqlite_err)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_err)
}
