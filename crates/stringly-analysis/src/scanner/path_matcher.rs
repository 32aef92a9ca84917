//! Path-glob matching for the `ignore` setting.

use glob::{MatchOptions, Pattern};
use stringly_core::errors::ConfigError;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A compiled set of path globs.
#[derive(Debug, Clone, Default)]
pub struct PathMatcher {
    patterns: Vec<Pattern>,
}

impl PathMatcher {
    pub fn new<S: AsRef<str>>(globs: &[S]) -> Result<Self, ConfigError> {
        let patterns = globs
            .iter()
            .map(|g| {
                Pattern::new(g.as_ref()).map_err(|e| ConfigError::InvalidValue {
                    field: "stringly_typed.ignore".to_string(),
                    message: format!("bad glob {:?}: {e}", g.as_ref()),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// True when any glob matches `path` (normalized to `/` separators).
    pub fn is_match(&self, path: &str) -> bool {
        if self.patterns.is_empty() {
            return false;
        }
        let normalized = path.replace('\\', "/");
        let trimmed = normalized.trim_start_matches("./");
        self.patterns
            .iter()
            .any(|p| p.matches_with(trimmed, MATCH_OPTIONS))
    }
}
