//! The run-scoped pattern store: one serialized connection, owned by one handle.

pub mod pragmas;

use std::sync::Mutex;

use rusqlite::Connection;
use stringly_core::config::StorageMode;
use stringly_core::errors::StorageError;
use stringly_core::types::{Comparison, FunctionCallArgument, PatternInstance, ValidationPattern};
use tempfile::TempDir;

use self::pragmas::apply_pragmas;
use crate::migrations;
use crate::queries::{self, call_arguments, comparisons, validations, sqlite_err};
use crate::queries::{CallSiteGroup, OccurrenceBasis, VariableGroup};

const SPILL_FILE_NAME: &str = "patterns.db";

/// Row counts, for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub validations: usize,
    pub comparisons: usize,
    pub call_arguments: usize,
    pub files: usize,
}

impl StoreCounts {
    pub fn total(&self) -> usize {
        self.validations + self.comparisons + self.call_arguments
    }
}

/// Transient store holding every instance extracted in one run.
///
/// Writes go through a single mutex-guarded connection. In spill-to-disk
/// mode the database lives in a private temp directory that is deleted when
/// the store is closed or dropped.
pub struct PatternStore {
    // Declared before `spill_dir` so the connection closes before the
    // directory is removed when the store is dropped.
    conn: Mutex<Connection>,
    mode: StorageMode,
    spill_dir: Option<TempDir>,
}

impl PatternStore {
    /// Open an empty store in the given mode.
    pub fn open(mode: StorageMode) -> Result<Self, StorageError> {
        let (conn, spill_dir) = match mode {
            StorageMode::InMemory => {
                let conn = Connection::open_in_memory().map_err(sqlite_err)?;
                (conn, None)
            }
            StorageMode::SpillToDisk => {
                let dir = tempfile::Builder::new()
                    .prefix("stringly-")
                    .tempdir()
                    .map_err(|e| StorageError::SpillFile {
                        path: std::env::temp_dir().display().to_string(),
                        message: e.to_string(),
                    })?;
                let conn = Connection::open(dir.path().join(SPILL_FILE_NAME)).map_err(|e| {
                    StorageError::SqliteError {
                        message: format!("open spill file: {e}"),
                    }
                })?;
                (conn, Some(dir))
            }
        };
        apply_pragmas(&conn)?;
        migrations::run_migrations(&conn)?;

        tracing::debug!(mode = %mode, "opened pattern store");
        Ok(Self {
            conn: Mutex::new(conn),
            mode,
            spill_dir,
        })
    }

    /// Open an in-memory store.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::open(StorageMode::InMemory)
    }

    pub fn mode(&self) -> StorageMode {
        self.mode
    }

    /// Path of the backing database file, `None` when in memory.
    pub fn spill_path(&self) -> Option<std::path::PathBuf> {
        self.spill_dir
            .as_ref()
            .map(|d| d.path().join(SPILL_FILE_NAME))
    }

    /// Run `f` with the serialized connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        let guard = self.conn.lock().map_err(|_| StorageError::SqliteError {
            message: "store lock poisoned".to_string(),
        })?;
        f(&guard)
    }

    /// Run `f` inside one transaction; rolled back if `f` fails.
    pub fn with_transaction<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&Connection) -> Result<T, StorageError>,
    {
        self.with_conn(|conn| {
            let tx = conn.unchecked_transaction().map_err(|e| StorageError::SqliteError {
                message: format!("begin transaction: {e}"),
            })?;
            let result = f(&tx)?;
            tx.commit().map_err(|e| StorageError::SqliteError {
                message: format!("commit: {e}"),
            })?;
            Ok(result)
        })
    }

    /// Upsert one instance; the latest write at a position wins.
    pub fn insert(&self, instance: &PatternInstance) -> Result<(), StorageError> {
        self.with_conn(|conn| queries::upsert_instance(conn, instance))
    }

    /// Upsert many instances in one transaction. Empty input is a no-op.
    pub fn insert_batch(&self, instances: &[PatternInstance]) -> Result<usize, StorageError> {
        if instances.is_empty() {
            return Ok(0);
        }
        self.with_transaction(|conn| {
            for instance in instances {
                queries::upsert_instance(conn, instance)?;
            }
            Ok(instances.len())
        })
    }

    /// Drop every row of `file_path` and insert `instances` in its place,
    /// atomically. Used when a changed file is rescanned.
    pub fn replace_file(
        &self,
        file_path: &str,
        instances: &[PatternInstance],
    ) -> Result<usize, StorageError> {
        self.with_transaction(|conn| {
            queries::delete_file(conn, file_path)?;
            for instance in instances {
                queries::upsert_instance(conn, instance)?;
            }
            Ok(instances.len())
        })
    }

    /// Remove every row of `file_path`. Returns rows removed.
    pub fn remove_file(&self, file_path: &str) -> Result<usize, StorageError> {
        self.with_conn(|conn| queries::delete_file(conn, file_path))
    }

    /// Value-set hashes whose validations span at least `min_distinct_files` files.
    pub fn query_cross_file_duplicates(
        &self,
        min_distinct_files: usize,
    ) -> Result<Vec<i64>, StorageError> {
        self.with_conn(|conn| validations::cross_file_hashes(conn, min_distinct_files))
    }

    pub fn validations_by_hash(&self, hash: i64) -> Result<Vec<ValidationPattern>, StorageError> {
        self.with_conn(|conn| validations::validations_by_hash(conn, hash))
    }

    pub fn all_validations(&self) -> Result<Vec<ValidationPattern>, StorageError> {
        self.with_conn(validations::all_validations)
    }

    /// `(callee, param_index)` groups within the cardinality window.
    pub fn query_bounded_cardinality_callsites(
        &self,
        min_values: usize,
        max_values: usize,
        min_locations: usize,
        basis: OccurrenceBasis,
    ) -> Result<Vec<CallSiteGroup>, StorageError> {
        self.with_conn(|conn| {
            call_arguments::bounded_cardinality_callsites(
                conn,
                min_values,
                max_values,
                min_locations,
                basis,
            )
        })
    }

    pub fn call_arguments_for(
        &self,
        callee_name: &str,
        param_index: u32,
    ) -> Result<Vec<FunctionCallArgument>, StorageError> {
        self.with_conn(|conn| call_arguments::call_arguments_for(conn, callee_name, param_index))
    }

    /// Variables compared against at least `min_values` distinct literals.
    pub fn query_multi_value_variables(
        &self,
        min_values: usize,
    ) -> Result<Vec<VariableGroup>, StorageError> {
        self.with_conn(|conn| comparisons::multi_value_variables(conn, min_values))
    }

    pub fn comparisons_for(&self, variable_name: &str) -> Result<Vec<Comparison>, StorageError> {
        self.with_conn(|conn| comparisons::comparisons_for(conn, variable_name))
    }

    pub fn counts(&self) -> Result<StoreCounts, StorageError> {
        self.with_conn(|conn| {
            Ok(StoreCounts {
                validations: queries::count_rows(conn, "validation_patterns")?,
                comparisons: queries::count_rows(conn, "comparisons")?,
                call_arguments: queries::count_rows(conn, "function_calls")?,
                files: queries::count_distinct_files(conn)?,
            })
        })
    }

    /// Remove all rows so the store can be reused.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.with_conn(queries::delete_all)
    }

    /// Close the connection and delete any spill file.
    ///
    /// Dropping the store releases the same resources; `close` additionally
    /// reports failures.
    pub fn close(self) -> Result<(), StorageError> {
        let PatternStore {
            conn, spill_dir, ..
        } = self;

        let conn = conn.into_inner().map_err(|_| StorageError::SqliteError {
            message: "store lock poisoned".to_string(),
        })?;
        let close_result = conn.close().map_err(|(_, e)| StorageError::SqliteError {
            message: format!("close: {e}"),
        });

        if let Some(dir) = spill_dir {
            let path = dir.path().display().to_string();
            dir.close().map_err(|e| StorageError::SpillFile {
                path,
                message: e.to_string(),
            })?;
        }
        close_result?;
        tracing::debug!("closed pattern store");
        Ok(())
    }
}
