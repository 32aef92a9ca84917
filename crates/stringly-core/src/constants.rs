//! Shared constants for the stringly-typed pattern engine.

/// Base rule identifier; per-kind ids append a suffix.
pub const DEFAULT_RULE_ID: &str = "stringly-typed";

/// Project-level config file name, looked up in the scan root.
pub const PROJECT_CONFIG_FILE: &str = "stringly.toml";

/// Environment variable read by `init_tracing`.
pub const LOG_ENV_VAR: &str = "STRINGLY_LOG";

/// Maximum file size in bytes for scanning (default: 1MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576;

/// Default number of threads (0 = auto-detect).
pub const DEFAULT_THREADS: usize = 0;

/// Smallest value set worth replacing with an enum.
pub const DEFAULT_MIN_VALUES_FOR_ENUM: usize = 2;

/// Largest value set still considered a closed domain.
pub const DEFAULT_MAX_VALUES_FOR_ENUM: usize = 6;

/// Default minimum occurrences for a group to be reported.
pub const DEFAULT_MIN_OCCURRENCES: usize = 2;

/// Cross-file validation duplicates never fire below this many files.
pub const MIN_DISTINCT_FILES_FOR_DUPLICATE: usize = 2;

/// Sibling locations listed in a violation message before "and N more".
pub const MAX_CROSS_REFERENCES: usize = 5;

// ---- Batch writer ----

/// Batch writer batch size.
pub const BATCH_WRITE_SIZE: usize = 500;

/// Batch writer channel capacity.
pub const BATCH_CHANNEL_CAPACITY: usize = 1024;

/// Batch writer recv timeout in milliseconds.
pub const BATCH_RECV_TIMEOUT_MS: u64 = 100;
