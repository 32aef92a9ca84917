//! Backing mode of the run-scoped pattern store.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageMode {
    /// SQLite in process memory. Fastest.
    #[default]
    InMemory,
    /// SQLite file in a private temp directory, removed at close.
    SpillToDisk,
}

impl StorageMode {
    /// Parse a user-supplied mode string.
    ///
    /// Accepts `memory`/`in_memory` and `tempfile`/`spill_to_disk`/`disk`.
    pub fn parse_str(s: &str) -> Result<Self, ConfigError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "in_memory" | "in-memory" => Ok(Self::InMemory),
            "tempfile" | "spill_to_disk" | "spill-to-disk" | "disk" => Ok(Self::SpillToDisk),
            _ => Err(ConfigError::InvalidStorageMode {
                value: s.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InMemory => "memory",
            Self::SpillToDisk => "tempfile",
        }
    }
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
