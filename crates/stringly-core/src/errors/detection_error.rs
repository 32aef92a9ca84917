//! Detection errors raised by aggregation, filtering, and violation generation.
//!
//! These indicate a logic defect (inconsistent store contents, impossible
//! group shapes) rather than bad input, so they always propagate.

use super::error_code::{self, StringlyErrorCode};

/// Errors that can occur after extraction, while turning groups into findings.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("Malformed {kind} group {key}: {message}")]
    MalformedGroup {
        kind: &'static str,
        key: String,
        message: String,
    },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Detector {id} panicked: {message}")]
    DetectorPanic { id: String, message: String },
}

impl StringlyErrorCode for DetectionError {
    fn error_code(&self) -> &'static str {
        error_code::DETECTION_ERROR
    }
}
