//! Top-level configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{ScanConfig, StringlyTypedConfig};
use crate::constants::PROJECT_CONFIG_FILE;
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`STRINGLY_*`)
/// 3. Project config (`stringly.toml` in project root)
/// 4. User config (`~/.stringly/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StringlyConfig {
    pub scan: ScanConfig,
    pub stringly_typed: StringlyTypedConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub scan_max_file_size: Option<u64>,
    pub scan_threads: Option<usize>,
    pub storage_mode: Option<String>,
    pub min_occurrences: Option<usize>,
    pub require_cross_file: Option<bool>,
}

impl StringlyConfig {
    /// Load configuration with layered resolution, then validate it.
    ///
    /// An invalid `storage_mode` fails here, before any file is scanned.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(
                            path = %user_config_path.display(),
                            error = %e,
                            "ignoring unreadable user config"
                        );
                    }
                }
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(cli) = cli_overrides {
            Self::apply_cli_overrides(&mut config, cli);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(max_file_size) = self.scan.max_file_size {
            if max_file_size == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "scan.max_file_size".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        self.stringly_typed.validate()
    }

    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".stringly").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut StringlyConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: StringlyConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `Some` and non-empty values in `other` win.
    fn merge(base: &mut StringlyConfig, other: &StringlyConfig) {
        if other.scan.max_file_size.is_some() {
            base.scan.max_file_size = other.scan.max_file_size;
        }
        if other.scan.threads.is_some() {
            base.scan.threads = other.scan.threads;
        }

        let (b, o) = (&mut base.stringly_typed, &other.stringly_typed);
        if o.enabled.is_some() {
            b.enabled = o.enabled;
        }
        if o.min_values_for_enum.is_some() {
            b.min_values_for_enum = o.min_values_for_enum;
        }
        if o.max_values_for_enum.is_some() {
            b.max_values_for_enum = o.max_values_for_enum;
        }
        if o.min_occurrences.is_some() {
            b.min_occurrences = o.min_occurrences;
        }
        if o.require_cross_file.is_some() {
            b.require_cross_file = o.require_cross_file;
        }
        if !o.allowed_string_sets.is_empty() {
            b.allowed_string_sets = o.allowed_string_sets.clone();
        }
        if !o.ignore.is_empty() {
            b.ignore = o.ignore.clone();
        }
        if !o.exclude_variables.is_empty() {
            b.exclude_variables = o.exclude_variables.clone();
        }
        if o.storage_mode.is_some() {
            b.storage_mode = o.storage_mode.clone();
        }
        if o.verify_value_sets.is_some() {
            b.verify_value_sets = o.verify_value_sets;
        }
        if o.severity.is_some() {
            b.severity = o.severity.clone();
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `STRINGLY_SCAN_MAX_FILE_SIZE`, `STRINGLY_STORAGE_MODE`, etc.
    fn apply_env_overrides(config: &mut StringlyConfig) {
        if let Ok(val) = std::env::var("STRINGLY_SCAN_MAX_FILE_SIZE") {
            if let Ok(v) = val.parse::<u64>() {
                config.scan.max_file_size = Some(v);
            }
        }
        if let Ok(val) = std::env::var("STRINGLY_SCAN_THREADS") {
            if let Ok(v) = val.parse::<usize>() {
                config.scan.threads = Some(v);
            }
        }
        if let Ok(val) = std::env::var("STRINGLY_ENABLED") {
            if let Ok(v) = val.parse::<bool>() {
                config.stringly_typed.enabled = Some(v);
            }
        }
        if let Ok(val) = std::env::var("STRINGLY_MIN_OCCURRENCES") {
            if let Ok(v) = val.parse::<usize>() {
                config.stringly_typed.min_occurrences = Some(v);
            }
        }
        if let Ok(val) = std::env::var("STRINGLY_REQUIRE_CROSS_FILE") {
            if let Ok(v) = val.parse::<bool>() {
                config.stringly_typed.require_cross_file = Some(v);
            }
        }
        // Passed through verbatim so a typo still fails validation.
        if let Ok(val) = std::env::var("STRINGLY_STORAGE_MODE") {
            config.stringly_typed.storage_mode = Some(val);
        }
    }

    /// Apply CLI overrides (highest priority).
    pub fn apply_cli_overrides(config: &mut StringlyConfig, cli: &CliOverrides) {
        if let Some(v) = cli.scan_max_file_size {
            config.scan.max_file_size = Some(v);
        }
        if let Some(v) = cli.scan_threads {
            config.scan.threads = Some(v);
        }
        if let Some(ref v) = cli.storage_mode {
            config.stringly_typed.storage_mode = Some(v.clone());
        }
        if let Some(v) = cli.min_occurrences {
            config.stringly_typed.min_occurrences = Some(v);
        }
        if let Some(v) = cli.require_cross_file {
            config.stringly_typed.require_cross_file = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
