//! Aggregation: store-level groups → enum candidates.
//!
//! Runs once, after every file of the run has been written to the store.
//! Each group must pass the same acceptance policy regardless of kind:
//! the distinct-value window, the occurrence threshold, and the allow-list.
//! Instances from ignored paths are dropped before that policy runs.

pub mod candidate;

pub use candidate::CandidateGroup;

use std::collections::BTreeMap;

use stringly_core::config::StringlyTypedConfig;
use stringly_core::constants::MIN_DISTINCT_FILES_FOR_DUPLICATE;
use stringly_core::errors::{DetectionError, PipelineError};
use stringly_core::types::{ValidationPattern, ValueSet};
use stringly_storage::{OccurrenceBasis, PatternStore};

use crate::scanner::PathMatcher;

/// Upper bound passed to the store when ignored paths may shrink a group.
const UNBOUNDED_VALUES: usize = i32::MAX as usize;

/// Applies the acceptance policy to the store's raw groups.
#[derive(Debug, Clone)]
pub struct Aggregator {
    min_values: usize,
    max_values: usize,
    min_occurrences: usize,
    require_cross_file: bool,
    verify_value_sets: bool,
    allowed_string_sets: Vec<Vec<String>>,
    ignore: PathMatcher,
}

impl Aggregator {
    pub fn from_config(config: &StringlyTypedConfig) -> Self {
        Self {
            min_values: config.effective_min_values_for_enum(),
            max_values: config.effective_max_values_for_enum(),
            min_occurrences: config.effective_min_occurrences(),
            require_cross_file: config.effective_require_cross_file(),
            verify_value_sets: config.effective_verify_value_sets(),
            allowed_string_sets: config.allowed_string_sets.clone(),
            ignore: PathMatcher::default(),
        }
    }

    /// Leave instances under these paths out of every group.
    pub fn with_ignore(mut self, ignore: PathMatcher) -> Self {
        self.ignore = ignore;
        self
    }

    /// Every accepted group of every kind. Store failures and inconsistent
    /// groups propagate.
    pub fn collect(&self, store: &PatternStore) -> Result<Vec<CandidateGroup>, PipelineError> {
        let mut groups = self.validation_groups(store)?;
        let validations = groups.len();
        groups.extend(self.call_site_groups(store)?);
        let call_sites = groups.len() - validations;
        groups.extend(self.comparison_groups(store)?);
        let comparisons = groups.len() - validations - call_sites;

        tracing::info!(validations, call_sites, comparisons, "aggregation complete");
        Ok(groups)
    }

    fn validation_groups(&self, store: &PatternStore) -> Result<Vec<CandidateGroup>, PipelineError> {
        let mut groups = Vec::new();
        for hash in store.query_cross_file_duplicates(MIN_DISTINCT_FILES_FOR_DUPLICATE)? {
            let rows = store.validations_by_hash(hash)?;
            for (value_set, instances) in self.partition(hash, rows)? {
                let mut group = CandidateGroup::RepeatedValidation {
                    value_set,
                    instances,
                };
                self.drop_ignored(&mut group);
                let files = group.distinct_files();
                if files < MIN_DISTINCT_FILES_FOR_DUPLICATE {
                    continue;
                }
                if self.accepts(&group, self.occurrences(files, group.len())) {
                    groups.push(group);
                }
            }
        }
        Ok(groups)
    }

    /// Split one hash bucket by exact value set. With verification off the
    /// whole bucket is trusted to share the first row's set.
    fn partition(
        &self,
        hash: i64,
        rows: Vec<ValidationPattern>,
    ) -> Result<Vec<(ValueSet, Vec<ValidationPattern>)>, DetectionError> {
        let Some(first) = rows.first() else {
            return Err(malformed(
                "repeated_validation",
                hash.to_string(),
                "hash reported as duplicated but has no rows",
            ));
        };
        if !self.verify_value_sets {
            return Ok(vec![(first.value_set.clone(), rows)]);
        }

        let mut by_set: BTreeMap<ValueSet, Vec<ValidationPattern>> = BTreeMap::new();
        for row in rows {
            by_set.entry(row.value_set.clone()).or_default().push(row);
        }
        if by_set.len() > 1 {
            tracing::warn!(hash, sets = by_set.len(), "value-set hash collision, splitting group");
        }
        Ok(by_set.into_iter().collect())
    }

    fn call_site_groups(&self, store: &PatternStore) -> Result<Vec<CandidateGroup>, PipelineError> {
        let basis = if self.require_cross_file {
            OccurrenceBasis::Files
        } else {
            OccurrenceBasis::Calls
        };
        // Ignored instances can pull an oversized group back into the window,
        // so the store's upper bound only applies when nothing is ignored.
        let max_values = if self.ignore.is_empty() {
            self.max_values
        } else {
            UNBOUNDED_VALUES
        };
        let mut groups = Vec::new();
        for row in store.query_bounded_cardinality_callsites(
            self.min_values,
            max_values,
            self.min_occurrences,
            basis,
        )? {
            let instances = store.call_arguments_for(&row.callee_name, row.param_index)?;
            let values: ValueSet = instances.iter().map(|a| a.string_value.as_str()).collect();
            let mut group = CandidateGroup::CallSite {
                callee_name: row.callee_name,
                param_index: row.param_index,
                values,
                instances,
            };
            check_cardinality(&group, row.distinct_values)?;
            self.drop_ignored(&mut group);
            if self.accepts(&group, self.occurrences(group.distinct_files(), group.len())) {
                groups.push(group);
            }
        }
        Ok(groups)
    }

    fn comparison_groups(&self, store: &PatternStore) -> Result<Vec<CandidateGroup>, PipelineError> {
        let mut groups = Vec::new();
        for row in store.query_multi_value_variables(self.min_values)? {
            let instances = store.comparisons_for(&row.variable_name)?;
            let values: ValueSet = instances.iter().map(|c| c.compared_value.as_str()).collect();
            let mut group = CandidateGroup::ScatteredComparison {
                variable_name: row.variable_name,
                values,
                instances,
            };
            check_cardinality(&group, row.distinct_values)?;
            self.drop_ignored(&mut group);
            if self.accepts(&group, self.occurrences(group.distinct_files(), group.len())) {
                groups.push(group);
            }
        }
        Ok(groups)
    }

    fn drop_ignored(&self, group: &mut CandidateGroup) {
        if self.ignore.is_empty() {
            return;
        }
        let before = group.len();
        group.drop_files(|path| self.ignore.is_match(path));
        if group.len() < before {
            tracing::debug!(
                kind = group.kind_name(),
                key = %group.key(),
                dropped = before - group.len(),
                "ignored instances left out of group"
            );
        }
    }

    fn occurrences(&self, files: usize, instances: usize) -> usize {
        if self.require_cross_file {
            files
        } else {
            instances
        }
    }

    /// Window, then occurrences, then the allow-list.
    fn accepts(&self, group: &CandidateGroup, occurrences: usize) -> bool {
        let distinct = group.values().len();
        if distinct < self.min_values || distinct > self.max_values {
            return false;
        }
        if occurrences < self.min_occurrences {
            return false;
        }
        if self.is_allowed(group.values()) {
            tracing::debug!(kind = group.kind_name(), key = %group.key(), "allow-listed value set");
            return false;
        }
        true
    }

    fn is_allowed(&self, values: &ValueSet) -> bool {
        self.allowed_string_sets
            .iter()
            .any(|allowed| values.equals_unordered(allowed))
    }
}

/// The store's distinct count and the re-fetched rows must agree.
fn check_cardinality(group: &CandidateGroup, expected: usize) -> Result<(), DetectionError> {
    if group.is_empty() {
        return Err(malformed(group.kind_name(), group.key(), "group has no rows"));
    }
    if group.values().len() != expected {
        return Err(malformed(
            group.kind_name(),
            group.key(),
            &format!(
                "store reported {expected} distinct values, rows hold {}",
                group.values().len()
            ),
        ));
    }
    Ok(())
}

fn malformed(kind: &'static str, key: String, message: &str) -> DetectionError {
    DetectionError::MalformedGroup {
        kind,
        key,
        message: message.to_string(),
    }
}
