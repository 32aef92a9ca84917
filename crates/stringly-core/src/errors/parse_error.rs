//! Parser errors.

use std::path::PathBuf;

use super::error_code::{self, StringlyErrorCode};

/// Errors that can occur while turning source text into a syntax tree.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Grammar could not be loaded for language: {language}")]
    GrammarNotFound { language: String },

    #[error("Tree-sitter error parsing {path}: {message}")]
    TreeSitterError { path: PathBuf, message: String },

    #[error("Unsupported language: {extension}")]
    UnsupportedLanguage { extension: String },
}

impl StringlyErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnsupportedLanguage { .. } => error_code::UNSUPPORTED_LANGUAGE,
            _ => error_code::PARSE_ERROR,
        }
    }
}
