//! Shared data model: pattern instances, value sets, and violations.

pub mod collections;
pub mod patterns;
pub mod violation;

pub use patterns::{
    Comparison, ComparisonOperator, FunctionCallArgument, PatternInstance, PatternKind,
    SourceLocation, ValidationKind, ValidationPattern, ValueSet,
};
pub use violation::{Severity, Violation};
