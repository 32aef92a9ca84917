//! Variables whose string comparisons probe the runtime, not a domain.

use glob::Pattern;
use stringly_core::errors::ConfigError;

pub const PLATFORM_VARIABLES: &[&str] = &[
    "sys.platform",
    "sys.byteorder",
    "sys.implementation.name",
    "os.name",
    "os.sep",
    "os.linesep",
    "os.pathsep",
    "platform.system",
    "process.platform",
    "process.arch",
    "process.env.NODE_ENV",
    "navigator.platform",
    "navigator.userAgent",
    "__name__",
];

/// Static platform probes plus user-configured globs.
#[derive(Debug, Clone, Default)]
pub struct VariableMatcher {
    globs: Vec<Pattern>,
}

impl VariableMatcher {
    pub fn new(globs: &[String]) -> Result<Self, ConfigError> {
        let globs = globs
            .iter()
            .map(|g| {
                Pattern::new(g).map_err(|e| ConfigError::InvalidValue {
                    field: "stringly_typed.exclude_variables".to_string(),
                    message: format!("bad glob {g:?}: {e}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { globs })
    }

    pub fn is_excluded(&self, variable: &str) -> bool {
        PLATFORM_VARIABLES.contains(&variable) || self.globs.iter().any(|g| g.matches(variable))
    }
}
