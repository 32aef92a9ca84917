//! Property tests for value-set normalization and hashing.

use proptest::prelude::*;
use stringly_core::types::{
    PatternInstance, SourceLocation, ValidationKind, ValidationPattern, ValueSet,
};

proptest! {
    #[test]
    fn hash_is_order_independent(mut values in prop::collection::vec(".{0,12}", 1..8)) {
        let forward: ValueSet = values.iter().cloned().collect();
        values.reverse();
        let backward: ValueSet = values.iter().cloned().collect();
        prop_assert_eq!(forward.content_hash(), backward.content_hash());
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn duplicates_do_not_change_hash(values in prop::collection::vec("[a-z,:; ]{1,10}", 1..6)) {
        let once: ValueSet = values.iter().cloned().collect();
        let twice: ValueSet = values.iter().chain(values.iter()).cloned().collect();
        prop_assert_eq!(once.content_hash(), twice.content_hash());
    }

    #[test]
    fn every_input_value_survives_intact(values in prop::collection::vec("\\PC{0,16}", 1..6)) {
        let set: ValueSet = values.iter().cloned().collect();
        for v in &values {
            prop_assert!(set.contains(v));
        }
    }
}

#[test]
fn validation_pattern_derives_hash_from_set() {
    let set: ValueSet = ["prod", "dev"].into_iter().collect();
    let expected = set.content_hash();
    let v = ValidationPattern::new(
        Some("mode".into()),
        set,
        ValidationKind::Membership,
        SourceLocation::new("a.py", 3, 4),
    );
    assert_eq!(v.value_set_hash, expected);

    let instance = PatternInstance::from(v);
    assert_eq!(instance.file_path(), "a.py");
    assert_eq!(instance.location().line, 3);
    assert_eq!(instance.kind().name(), "validation");
}

#[test]
fn serde_keeps_values_with_punctuation() {
    let set: ValueSet = ["a, b", "say \"hi\"", "line\nbreak", "naïve"].into_iter().collect();
    let json = serde_json::to_string(&set).unwrap();
    let back: ValueSet = serde_json::from_str(&json).unwrap();
    assert_eq!(back, set);
    assert_eq!(back.len(), 4);
}
