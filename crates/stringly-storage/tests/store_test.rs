//! PatternStore tests: upsert semantics, aggregate queries, lifecycle.

use stringly_core::config::StorageMode;
use stringly_core::types::{
    Comparison, ComparisonOperator, FunctionCallArgument, PatternInstance, SourceLocation,
    ValidationKind, ValidationPattern, ValueSet,
};
use stringly_storage::{OccurrenceBasis, PatternStore};

fn validation(file: &str, line: u32, values: &[&str]) -> PatternInstance {
    ValidationPattern::new(
        Some("status".into()),
        values.iter().copied().collect(),
        ValidationKind::Membership,
        SourceLocation::new(file, line, 4),
    )
    .into()
}

fn comparison(file: &str, line: u32, variable: &str, value: &str) -> PatternInstance {
    Comparison {
        variable_name: variable.into(),
        compared_value: value.into(),
        operator: ComparisonOperator::Eq,
        location: SourceLocation::new(file, line, 0),
    }
    .into()
}

fn call_arg(file: &str, line: u32, callee: &str, index: u32, value: &str) -> PatternInstance {
    FunctionCallArgument {
        callee_name: callee.into(),
        param_index: index,
        string_value: value.into(),
        location: SourceLocation::new(file, line, 10 + index),
    }
    .into()
}

fn setup_store() -> PatternStore {
    PatternStore::open_in_memory().unwrap()
}

// ---- Upsert semantics ----

#[test]
fn second_insert_at_same_position_replaces_first() {
    let store = setup_store();
    store.insert(&comparison("a.py", 1, "mode", "dev")).unwrap();
    store.insert(&comparison("a.py", 1, "mode", "prod")).unwrap();

    let rows = store.comparisons_for("mode").unwrap();
    assert_eq!(rows.len(), 1, "same (file, line, col) must hold one row");
    assert_eq!(rows[0].compared_value, "prod", "latest insert wins");
    assert_eq!(store.counts().unwrap().comparisons, 1);
}

#[test]
fn insert_is_idempotent() {
    let once = setup_store();
    let twice = setup_store();
    let instance = validation("a.py", 3, &["x", "y"]);

    once.insert(&instance).unwrap();
    twice.insert(&instance).unwrap();
    twice.insert(&instance).unwrap();

    assert_eq!(once.counts().unwrap(), twice.counts().unwrap());
    assert_eq!(once.all_validations().unwrap(), twice.all_validations().unwrap());
}

#[test]
fn empty_batch_is_noop() {
    let store = setup_store();
    assert_eq!(store.insert_batch(&[]).unwrap(), 0);
    assert_eq!(store.counts().unwrap().total(), 0);
}

#[test]
fn batch_inserts_all_kinds() {
    let store = setup_store();
    let n = store
        .insert_batch(&[
            validation("a.py", 1, &["a", "b"]),
            comparison("a.py", 2, "kind", "x"),
            call_arg("a.py", 3, "db.set_mode", 0, "prod"),
        ])
        .unwrap();
    assert_eq!(n, 3);
    let counts = store.counts().unwrap();
    assert_eq!(counts.validations, 1);
    assert_eq!(counts.comparisons, 1);
    assert_eq!(counts.call_arguments, 1);
    assert_eq!(counts.files, 1);
}

// ---- Round trip ----

#[test]
fn value_set_round_trip_preserves_exact_content() {
    let store = setup_store();
    let tricky = [
        "SELECT a, b, c FROM t",
        "key: value",
        "say \"hi\"",
        "it's",
        "line1\nline2",
        "日本語",
        "emoji 🚀",
        "",
    ];
    store.insert(&validation("a.py", 1, &tricky)).unwrap();

    let rows = store.all_validations().unwrap();
    assert_eq!(rows.len(), 1);
    let expected: ValueSet = tricky.iter().copied().collect();
    assert_eq!(rows[0].value_set, expected);
    assert_eq!(rows[0].value_set.len(), tricky.len());
    assert_eq!(rows[0].value_set_hash, expected.content_hash());
}

#[test]
fn value_order_does_not_change_grouping() {
    let store = setup_store();
    store.insert(&validation("a.py", 1, &["x", "y", "z"])).unwrap();
    store.insert(&validation("b.py", 1, &["z", "x", "y"])).unwrap();

    let hashes = store.query_cross_file_duplicates(2).unwrap();
    assert_eq!(hashes.len(), 1);
    assert_eq!(store.validations_by_hash(hashes[0]).unwrap().len(), 2);
}

#[test]
fn comma_literal_counts_as_one_distinct_value() {
    let store = setup_store();
    store
        .insert(&call_arg("a.py", 1, "run", 0, "SELECT a, b, c FROM t"))
        .unwrap();
    store.insert(&call_arg("b.py", 1, "run", 0, "other")).unwrap();

    let groups = store
        .query_bounded_cardinality_callsites(2, 2, 2, OccurrenceBasis::Files)
        .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].distinct_values, 2, "commas must not split a literal");
}

// ---- Cross-file duplicates ----

#[test]
fn same_hash_in_one_file_is_not_a_cross_file_duplicate() {
    let store = setup_store();
    store.insert(&validation("a.py", 1, &["a", "b"])).unwrap();
    store.insert(&validation("a.py", 9, &["b", "a"])).unwrap();

    assert!(store.query_cross_file_duplicates(2).unwrap().is_empty());
    assert_eq!(store.query_cross_file_duplicates(1).unwrap().len(), 1);
}

#[test]
fn cross_file_threshold_respected() {
    let store = setup_store();
    for file in ["a.py", "b.py", "c.py"] {
        store.insert(&validation(file, 1, &["on", "off"])).unwrap();
    }
    store.insert(&validation("a.py", 5, &["left", "right"])).unwrap();
    store.insert(&validation("b.py", 5, &["left", "right"])).unwrap();

    assert_eq!(store.query_cross_file_duplicates(2).unwrap().len(), 2);
    assert_eq!(store.query_cross_file_duplicates(3).unwrap().len(), 1);
    assert!(store.query_cross_file_duplicates(4).unwrap().is_empty());
}

// ---- Call-site groups ----

#[test]
fn bounded_cardinality_window_and_basis() {
    let store = setup_store();
    store.insert(&call_arg("a.py", 1, "db.set_mode", 0, "prod")).unwrap();
    store.insert(&call_arg("a.py", 2, "db.set_mode", 0, "dev")).unwrap();

    // Two calls in one file.
    let by_files = store
        .query_bounded_cardinality_callsites(2, 6, 2, OccurrenceBasis::Files)
        .unwrap();
    assert!(by_files.is_empty());
    let by_calls = store
        .query_bounded_cardinality_callsites(2, 6, 2, OccurrenceBasis::Calls)
        .unwrap();
    assert_eq!(by_calls.len(), 1);
    assert_eq!(by_calls[0].calls, 2);
    assert_eq!(by_calls[0].distinct_files, 1);

    // Window excludes it when max < distinct values.
    assert!(store
        .query_bounded_cardinality_callsites(3, 6, 1, OccurrenceBasis::Calls)
        .unwrap()
        .is_empty());
}

#[test]
fn param_index_separates_groups() {
    let store = setup_store();
    store.insert(&call_arg("a.py", 1, "f", 0, "a")).unwrap();
    store.insert(&call_arg("b.py", 1, "f", 1, "b")).unwrap();

    let groups = store
        .query_bounded_cardinality_callsites(1, 6, 1, OccurrenceBasis::Calls)
        .unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(store.call_arguments_for("f", 1).unwrap().len(), 1);
}

// ---- Comparison groups ----

#[test]
fn multi_value_variables_counts_distinct_literals() {
    let store = setup_store();
    store.insert(&comparison("a.py", 1, "self.status", "active")).unwrap();
    store.insert(&comparison("a.py", 2, "self.status", "active")).unwrap();
    store.insert(&comparison("b.py", 1, "self.status", "inactive")).unwrap();
    store.insert(&comparison("b.py", 2, "other", "x")).unwrap();

    let groups = store.query_multi_value_variables(2).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].variable_name, "self.status");
    assert_eq!(groups[0].distinct_values, 2);
    assert_eq!(groups[0].distinct_files, 2);
    assert_eq!(groups[0].comparisons, 3);
}

// ---- Incremental rescan ----

#[test]
fn replace_file_swaps_only_that_file() {
    let store = setup_store();
    store.insert(&comparison("a.py", 1, "mode", "dev")).unwrap();
    store.insert(&comparison("a.py", 2, "mode", "test")).unwrap();
    store.insert(&comparison("b.py", 1, "mode", "prod")).unwrap();

    store
        .replace_file("a.py", &[comparison("a.py", 7, "mode", "staging")])
        .unwrap();

    let values: Vec<String> = store
        .comparisons_for("mode")
        .unwrap()
        .into_iter()
        .map(|c| c.compared_value)
        .collect();
    assert_eq!(values, vec!["staging", "prod"]);
}

#[test]
fn remove_file_clears_every_table() {
    let store = setup_store();
    store
        .insert_batch(&[
            validation("a.py", 1, &["a", "b"]),
            comparison("a.py", 2, "kind", "x"),
            call_arg("a.py", 3, "f", 0, "v"),
            call_arg("b.py", 3, "f", 0, "w"),
        ])
        .unwrap();
    assert_eq!(store.remove_file("a.py").unwrap(), 3);
    let counts = store.counts().unwrap();
    assert_eq!(counts.total(), 1);
    assert_eq!(counts.files, 1);
}

// ---- Lifecycle ----

#[test]
fn clear_allows_reuse() {
    let store = setup_store();
    store.insert(&validation("a.py", 1, &["a", "b"])).unwrap();
    store.clear().unwrap();
    assert_eq!(store.counts().unwrap().total(), 0);
    store.insert(&validation("a.py", 1, &["a", "b"])).unwrap();
    assert_eq!(store.counts().unwrap().validations, 1);
}

#[test]
fn in_memory_store_has_no_spill_path() {
    let store = setup_store();
    assert_eq!(store.mode(), StorageMode::InMemory);
    assert!(store.spill_path().is_none());
    store.close().unwrap();
}

#[test]
fn spill_file_removed_on_close() {
    let store = PatternStore::open(StorageMode::SpillToDisk).unwrap();
    let path = store.spill_path().unwrap();
    store.insert(&validation("a.py", 1, &["a", "b"])).unwrap();
    assert!(path.exists(), "spill database should exist while open");
    let dir = path.parent().unwrap().to_path_buf();

    store.close().unwrap();
    assert!(!path.exists());
    assert!(!dir.exists(), "spill directory should be removed on close");
}

#[test]
fn spill_file_removed_on_drop() {
    let path = {
        let store = PatternStore::open(StorageMode::SpillToDisk).unwrap();
        store.insert(&comparison("a.py", 1, "m", "x")).unwrap();
        store.spill_path().unwrap()
    };
    assert!(!path.exists(), "dropping the store must release the spill file");
}

#[test]
fn spill_mode_answers_same_queries() {
    let store = PatternStore::open(StorageMode::SpillToDisk).unwrap();
    store.insert(&validation("a.py", 1, &["on", "off"])).unwrap();
    store.insert(&validation("b.py", 1, &["off", "on"])).unwrap();
    assert_eq!(store.query_cross_file_duplicates(2).unwrap().len(), 1);
    store.close().unwrap();
}
