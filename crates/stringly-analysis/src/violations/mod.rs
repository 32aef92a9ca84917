//! Violation generation: accepted groups → one violation per instance.

pub mod suggestion;

use stringly_core::config::StringlyTypedConfig;
use stringly_core::constants::MAX_CROSS_REFERENCES;
use stringly_core::errors::PipelineError;
use stringly_core::types::{Severity, SourceLocation, Violation};
use stringly_storage::PatternStore;

use crate::aggregation::{Aggregator, CandidateGroup};
use crate::filter::ContextFilter;
use crate::scanner::{Language, PathMatcher};

pub const REPEATED_VALIDATION: &str = "repeated-validation";
pub const LIMITED_VALUES: &str = "limited-values";
pub const SCATTERED_COMPARISON: &str = "scattered-comparison";

/// Aggregate, filter, and project the whole store. Call once, after every
/// file of the run has been written.
pub fn generate_violations(
    store: &PatternStore,
    rule_id: &str,
    config: &StringlyTypedConfig,
) -> Result<Vec<Violation>, PipelineError> {
    if !config.effective_enabled() {
        return Ok(Vec::new());
    }
    let severity = config.effective_severity()?;
    let ignore = PathMatcher::new(&config.ignore)?;
    let filter = ContextFilter::from_config(config)?;

    let aggregator = Aggregator::from_config(config).with_ignore(ignore);
    let groups = filter.retain(aggregator.collect(store)?);

    let generator = ViolationGenerator::new(rule_id, severity);
    let mut violations: Vec<Violation> = groups
        .iter()
        .flat_map(|group| generator.project(group))
        .collect();
    violations.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    tracing::info!(groups = groups.len(), violations = violations.len(), "violations generated");
    Ok(violations)
}

/// Projects one group into per-instance violations.
pub struct ViolationGenerator {
    rule_id: String,
    severity: Severity,
}

impl ViolationGenerator {
    pub fn new(rule_id: &str, severity: Severity) -> Self {
        Self {
            rule_id: rule_id.to_string(),
            severity,
        }
    }

    pub fn project(&self, group: &CandidateGroup) -> Vec<Violation> {
        let values = group.values();
        let count = values.len();
        let files = group.distinct_files();
        let (suffix, hint, summary) = match group {
            CandidateGroup::RepeatedValidation { instances, .. } => {
                let variable = instances.iter().find_map(|i| i.variable_name.as_deref());
                let subject = match variable {
                    Some(v) => format!("`{v}`"),
                    None => "A value".to_string(),
                };
                (
                    REPEATED_VALIDATION,
                    variable,
                    format!(
                        "{subject} is validated against the same {count} string values {values} \
                         in {files} files"
                    ),
                )
            }
            CandidateGroup::CallSite {
                callee_name,
                param_index,
                ..
            } => (
                LIMITED_VALUES,
                Some(callee_name.as_str()),
                format!(
                    "`{callee_name}` parameter {param_index} only ever receives {count} distinct \
                     string values {values}"
                ),
            ),
            CandidateGroup::ScatteredComparison { variable_name, .. } => (
                SCATTERED_COMPARISON,
                Some(variable_name.as_str()),
                format!(
                    "`{variable_name}` is compared against {count} string literals {values} \
                     in {files} files"
                ),
            ),
        };
        let rule_id = format!("{}.{suffix}", self.rule_id);
        let type_name = suggestion::type_name_hint(hint);

        let locations = group.locations();
        locations
            .iter()
            .enumerate()
            .map(|(i, location)| Violation {
                rule_id: rule_id.clone(),
                file_path: location.file_path.clone(),
                line: location.line,
                column: location.column,
                message: format!("{summary}{}", cross_references(&locations, i)),
                severity: self.severity,
                suggestion: Some(suggestion::suggestion(
                    Language::from_path(&location.file_path),
                    &type_name,
                    values,
                )),
            })
            .collect()
    }
}

/// `; also at a.py:3, b.py:9 and 2 more`, excluding the instance itself.
fn cross_references(locations: &[&SourceLocation], own: usize) -> String {
    let others: Vec<String> = locations
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != own)
        .map(|(_, l)| l.to_string())
        .collect();
    if others.is_empty() {
        return String::new();
    }
    let shown = others.len().min(MAX_CROSS_REFERENCES);
    let mut text = format!("; also at {}", others[..shown].join(", "));
    if others.len() > shown {
        text.push_str(&format!(" and {} more", others.len() - shown));
    }
    text
}
