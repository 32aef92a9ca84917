//! # stringly-analysis
//!
//! Cross-file detection of stringly-typed code: variables and call-site
//! arguments that are compared against, or passed, a small closed set of
//! string literals where a named enum should exist.
//!
//! Extractors (per file) → PatternStore → Aggregator → ContextFilter →
//! violations.

pub mod aggregation;
pub mod extractors;
pub mod filter;
pub mod parsers;
pub mod pipeline;
pub mod scanner;
pub mod violations;

pub use aggregation::{Aggregator, CandidateGroup};
pub use extractors::{extract_source, extractor_for, PatternExtractor};
pub use filter::{ContextFilter, Suppression};
pub use pipeline::{RunReport, SourceFile, StringlyTypedEngine};
pub use scanner::Language;
pub use violations::generate_violations;
