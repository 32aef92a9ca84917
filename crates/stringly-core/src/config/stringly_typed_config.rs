//! Settings of the cross-file stringly-typed rule.

use serde::{Deserialize, Serialize};

use super::StorageMode;
use crate::constants::{
    DEFAULT_MAX_VALUES_FOR_ENUM, DEFAULT_MIN_OCCURRENCES, DEFAULT_MIN_VALUES_FOR_ENUM,
};
use crate::errors::ConfigError;
use crate::types::Severity;

/// Configuration for the stringly-typed rule.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StringlyTypedConfig {
    /// Run the rule at all. Default: true.
    pub enabled: Option<bool>,
    /// Fewest distinct values a group needs. Default: 2.
    pub min_values_for_enum: Option<usize>,
    /// Most distinct values a group may have. Default: 6.
    pub max_values_for_enum: Option<usize>,
    /// Occurrences (files or instances) a group needs. Default: 2.
    pub min_occurrences: Option<usize>,
    /// Count distinct files instead of instances. Default: true.
    pub require_cross_file: Option<bool>,
    /// Value sets the user declared legitimate; matching groups are never reported.
    #[serde(default)]
    pub allowed_string_sets: Vec<Vec<String>>,
    /// Path globs excluded from scanning and reporting.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Variable-name globs whose comparisons are never reported.
    #[serde(default)]
    pub exclude_variables: Vec<String>,
    /// `memory` or `tempfile`. Default: memory.
    pub storage_mode: Option<String>,
    /// Re-check exact value sets inside a hash group. Default: true.
    pub verify_value_sets: Option<bool>,
    /// `error`, `warning` or `info`. Default: warning.
    pub severity: Option<String>,
}

impl StringlyTypedConfig {
    pub fn effective_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn effective_min_values_for_enum(&self) -> usize {
        self.min_values_for_enum.unwrap_or(DEFAULT_MIN_VALUES_FOR_ENUM)
    }

    pub fn effective_max_values_for_enum(&self) -> usize {
        self.max_values_for_enum.unwrap_or(DEFAULT_MAX_VALUES_FOR_ENUM)
    }

    pub fn effective_min_occurrences(&self) -> usize {
        self.min_occurrences.unwrap_or(DEFAULT_MIN_OCCURRENCES)
    }

    pub fn effective_require_cross_file(&self) -> bool {
        self.require_cross_file.unwrap_or(true)
    }

    pub fn effective_verify_value_sets(&self) -> bool {
        self.verify_value_sets.unwrap_or(true)
    }

    /// Resolve the storage mode string; an unknown value is an error.
    pub fn effective_storage_mode(&self) -> Result<StorageMode, ConfigError> {
        match self.storage_mode.as_deref() {
            Some(mode) => StorageMode::parse_str(mode),
            None => Ok(StorageMode::default()),
        }
    }

    pub fn effective_severity(&self) -> Result<Severity, ConfigError> {
        match self.severity.as_deref() {
            Some(s) => Severity::parse_str(s).ok_or_else(|| ConfigError::InvalidValue {
                field: "stringly_typed.severity".to_string(),
                message: format!("unknown severity {s:?}, expected error, warning or info"),
            }),
            None => Ok(Severity::Warning),
        }
    }

    /// Check value ranges and patterns. Storage mode errors surface unchanged.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let min = self.effective_min_values_for_enum();
        let max = self.effective_max_values_for_enum();
        if min < 2 {
            return Err(ConfigError::ValidationFailed {
                field: "stringly_typed.min_values_for_enum".to_string(),
                message: "must be at least 2".to_string(),
            });
        }
        if max < min {
            return Err(ConfigError::ValidationFailed {
                field: "stringly_typed.max_values_for_enum".to_string(),
                message: format!("must be >= min_values_for_enum ({min})"),
            });
        }
        if self.effective_min_occurrences() == 0 {
            return Err(ConfigError::ValidationFailed {
                field: "stringly_typed.min_occurrences".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        for (field, patterns) in [
            ("stringly_typed.ignore", &self.ignore),
            ("stringly_typed.exclude_variables", &self.exclude_variables),
        ] {
            for pattern in patterns {
                glob::Pattern::new(pattern).map_err(|e| ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("bad glob {pattern:?}: {e}"),
                })?;
            }
        }
        self.effective_storage_mode()?;
        self.effective_severity()?;
        Ok(())
    }
}
