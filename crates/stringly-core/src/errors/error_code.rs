//! StringlyErrorCode trait for structured error reporting.

/// Every error enum implements this to expose a stable, machine-readable
/// code alongside its human-readable message.
pub trait StringlyErrorCode {
    /// Returns the error code string (e.g., "STORAGE_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted error string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const SCAN_ERROR: &str = "SCAN_ERROR";
pub const PARSE_ERROR: &str = "PARSE_ERROR";
pub const UNSUPPORTED_LANGUAGE: &str = "UNSUPPORTED_LANGUAGE";
pub const DETECTION_ERROR: &str = "DETECTION_ERROR";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const INVALID_STORAGE_MODE: &str = "INVALID_STORAGE_MODE";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const DB_CORRUPT: &str = "DB_CORRUPT";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const WRITER_DISCONNECTED: &str = "WRITER_DISCONNECTED";
