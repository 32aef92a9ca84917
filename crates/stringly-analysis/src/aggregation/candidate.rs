//! Candidate groups: one closed set of literals plus every instance that
//! contributed to it.

use stringly_core::types::{
    Comparison, FunctionCallArgument, SourceLocation, ValidationPattern, ValueSet,
};
use stringly_core::FxHashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateGroup {
    /// The same literal set validated in several files.
    RepeatedValidation {
        value_set: ValueSet,
        instances: Vec<ValidationPattern>,
    },
    /// A `(callee, param_index)` slot that only ever receives a few literals.
    CallSite {
        callee_name: String,
        param_index: u32,
        values: ValueSet,
        instances: Vec<FunctionCallArgument>,
    },
    /// One variable compared against a few literals across the codebase.
    ScatteredComparison {
        variable_name: String,
        values: ValueSet,
        instances: Vec<Comparison>,
    },
}

impl CandidateGroup {
    pub fn values(&self) -> &ValueSet {
        match self {
            Self::RepeatedValidation { value_set, .. } => value_set,
            Self::CallSite { values, .. } | Self::ScatteredComparison { values, .. } => values,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::RepeatedValidation { .. } => "repeated_validation",
            Self::CallSite { .. } => "call_site",
            Self::ScatteredComparison { .. } => "scattered_comparison",
        }
    }

    /// Human-readable key for logs and error messages.
    pub fn key(&self) -> String {
        match self {
            Self::RepeatedValidation { value_set, .. } => value_set.to_string(),
            Self::CallSite {
                callee_name,
                param_index,
                ..
            } => format!("{callee_name}#{param_index}"),
            Self::ScatteredComparison { variable_name, .. } => variable_name.clone(),
        }
    }

    /// Locations of every instance, in store order.
    pub fn locations(&self) -> Vec<&SourceLocation> {
        match self {
            Self::RepeatedValidation { instances, .. } => {
                instances.iter().map(|i| &i.location).collect()
            }
            Self::CallSite { instances, .. } => instances.iter().map(|i| &i.location).collect(),
            Self::ScatteredComparison { instances, .. } => {
                instances.iter().map(|i| &i.location).collect()
            }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::RepeatedValidation { instances, .. } => instances.len(),
            Self::CallSite { instances, .. } => instances.len(),
            Self::ScatteredComparison { instances, .. } => instances.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn distinct_files(&self) -> usize {
        self.locations()
            .into_iter()
            .map(|l| l.file_path.as_str())
            .collect::<FxHashSet<_>>()
            .len()
    }

    /// Drop instances whose file matches `ignored`, recomputing the values
    /// of call-site and comparison groups from what is left.
    pub fn drop_files(&mut self, ignored: impl Fn(&str) -> bool) {
        match self {
            Self::RepeatedValidation { instances, .. } => {
                instances.retain(|i| !ignored(&i.location.file_path));
            }
            Self::CallSite {
                values, instances, ..
            } => {
                instances.retain(|i| !ignored(&i.location.file_path));
                *values = instances.iter().map(|i| i.string_value.as_str()).collect();
            }
            Self::ScatteredComparison {
                values, instances, ..
            } => {
                instances.retain(|i| !ignored(&i.location.file_path));
                *values = instances.iter().map(|i| i.compared_value.as_str()).collect();
            }
        }
    }
}
