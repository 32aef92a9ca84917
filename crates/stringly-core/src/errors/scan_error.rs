//! Scanner errors.

use std::path::PathBuf;

use super::error_code::{self, StringlyErrorCode};

/// Errors that can occur while reading source files for a run.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("IO error scanning {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("File too large: {path} ({size} bytes, max {max})")]
    MaxFileSizeExceeded { path: PathBuf, size: u64, max: u64 },

    #[error("File is not valid UTF-8: {path}")]
    InvalidUtf8 { path: PathBuf },
}

impl StringlyErrorCode for ScanError {
    fn error_code(&self) -> &'static str {
        error_code::SCAN_ERROR
    }
}
