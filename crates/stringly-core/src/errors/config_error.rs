//! Configuration errors.

use super::error_code::{self, StringlyErrorCode};

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Config validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },

    #[error("Invalid config value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Invalid storage mode {value:?}: expected one of memory, tempfile")]
    InvalidStorageMode { value: String },
}

impl StringlyErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidStorageMode { .. } => error_code::INVALID_STORAGE_MODE,
            _ => error_code::CONFIG_ERROR,
        }
    }
}
