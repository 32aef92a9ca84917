//! Context filter: drops candidate groups that match the syntax of a closed
//! set but not its meaning.
//!
//! Checks run in a fixed order and the first hit suppresses the group:
//! callee denylist, default-value positions, variable exclusions, then value
//! shapes. Value shapes suppress only when every value matches.

pub mod callees;
pub mod values;
pub mod variables;

use stringly_core::config::StringlyTypedConfig;
use stringly_core::errors::ConfigError;

use crate::aggregation::CandidateGroup;

pub use callees::CalleeMatcher;
pub use variables::VariableMatcher;

/// Why a group was suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppression {
    /// Callee is in the denylist; carries the category.
    Callee(&'static str),
    /// Argument sits at a callee's default-value position.
    ParameterPosition,
    /// Compared variable is a runtime probe or user-excluded.
    Variable,
    /// Every value has an excluded shape.
    ValueShape,
}

pub struct ContextFilter {
    callees: &'static CalleeMatcher,
    variables: VariableMatcher,
}

impl ContextFilter {
    pub fn from_config(config: &StringlyTypedConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            callees: CalleeMatcher::denylist(),
            variables: VariableMatcher::new(&config.exclude_variables)?,
        })
    }

    pub fn suppression(&self, group: &CandidateGroup) -> Option<Suppression> {
        if let CandidateGroup::CallSite {
            callee_name,
            param_index,
            ..
        } = group
        {
            if let Some(category) = self.callees.category_of(callee_name) {
                return Some(Suppression::Callee(category));
            }
            if callees::is_exempt_position(callee_name, *param_index) {
                return Some(Suppression::ParameterPosition);
            }
        }
        if let CandidateGroup::ScatteredComparison { variable_name, .. } = group {
            if self.variables.is_excluded(variable_name) {
                return Some(Suppression::Variable);
            }
        }
        if values::all_excluded(group.values()) {
            return Some(Suppression::ValueShape);
        }
        None
    }

    /// Keep the groups no check suppresses.
    pub fn retain(&self, groups: Vec<CandidateGroup>) -> Vec<CandidateGroup> {
        let before = groups.len();
        let kept: Vec<CandidateGroup> = groups
            .into_iter()
            .filter(|group| match self.suppression(group) {
                Some(reason) => {
                    tracing::debug!(kind = group.kind_name(), key = %group.key(), ?reason, "suppressed");
                    false
                }
                None => true,
            })
            .collect();
        tracing::info!(before, after = kept.len(), "context filter applied");
        kept
    }
}
