//! Property tests: arbitrary literals survive the store unchanged.

use proptest::prelude::*;
use stringly_core::types::{
    FunctionCallArgument, PatternInstance, SourceLocation, ValidationKind, ValidationPattern,
    ValueSet,
};
use stringly_storage::{OccurrenceBasis, PatternStore};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn validation_value_sets_round_trip(values in prop::collection::btree_set("\\PC{0,20}", 2..6)) {
        let store = PatternStore::open_in_memory().unwrap();
        let set: ValueSet = values.iter().cloned().collect();
        let instance: PatternInstance = ValidationPattern::new(
            None,
            set.clone(),
            ValidationKind::EqualityChain,
            SourceLocation::new("f.ts", 1, 0),
        )
        .into();
        store.insert(&instance).unwrap();

        let back = store.validations_by_hash(set.content_hash()).unwrap();
        prop_assert_eq!(back.len(), 1);
        prop_assert_eq!(&back[0].value_set, &set);
    }

    #[test]
    fn distinct_call_values_are_counted_exactly(values in prop::collection::btree_set("[a-z ,:;\"']{1,12}", 1..6)) {
        let store = PatternStore::open_in_memory().unwrap();
        let instances: Vec<PatternInstance> = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                FunctionCallArgument {
                    callee_name: "f".into(),
                    param_index: 0,
                    string_value: v.clone(),
                    location: SourceLocation::new(format!("f{i}.py"), 1, 0),
                }
                .into()
            })
            .collect();
        store.insert_batch(&instances).unwrap();

        let groups = store
            .query_bounded_cardinality_callsites(1, 100, 1, OccurrenceBasis::Calls)
            .unwrap();
        prop_assert_eq!(groups.len(), 1);
        prop_assert_eq!(groups[0].distinct_values, values.len());
    }
}
