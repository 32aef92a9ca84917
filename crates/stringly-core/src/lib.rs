//! # stringly-core
//!
//! Foundation crate for the stringly-typed pattern engine.
//! Defines the pattern data model, errors, config, tracing, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::{StorageMode, StringlyConfig, StringlyTypedConfig};
pub use errors::error_code::StringlyErrorCode;
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::{PatternInstance, SourceLocation, ValueSet, Violation};
