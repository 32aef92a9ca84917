//! Storage-layer errors for the run-scoped SQLite pattern store.

use super::error_code::{self, StringlyErrorCode};

/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Stored row is corrupt: {details}")]
    DbCorrupt { details: String },

    #[error("Spill file error at {path}: {message}")]
    SpillFile { path: String, message: String },

    #[error("Batch writer unavailable: {message}")]
    WriterDisconnected { message: String },
}

impl StringlyErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DbCorrupt { .. } => error_code::DB_CORRUPT,
            Self::MigrationFailed { .. } => error_code::MIGRATION_FAILED,
            Self::WriterDisconnected { .. } => error_code::WRITER_DISCONNECTED,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
