//! Configuration loading, layering, and validation tests.

use stringly_core::config::{CliOverrides, StorageMode, StringlyConfig};
use stringly_core::errors::{ConfigError, StringlyErrorCode};
use stringly_core::types::Severity;

// ---- Defaults ----

#[test]
fn defaults_match_documented_values() {
    let config = StringlyConfig::default();
    let st = &config.stringly_typed;
    assert!(st.effective_enabled());
    assert_eq!(st.effective_min_values_for_enum(), 2);
    assert_eq!(st.effective_max_values_for_enum(), 6);
    assert_eq!(st.effective_min_occurrences(), 2);
    assert!(st.effective_require_cross_file());
    assert!(st.effective_verify_value_sets());
    assert_eq!(st.effective_storage_mode().unwrap(), StorageMode::InMemory);
    assert_eq!(st.effective_severity().unwrap(), Severity::Warning);
    assert_eq!(config.scan.effective_max_file_size(), 1_048_576);
    assert!(config.validate().is_ok());
}

// ---- TOML parsing ----

#[test]
fn parses_full_stringly_typed_section() {
    let config = StringlyConfig::from_toml(
        r#"
        [scan]
        max_file_size = 2048

        [stringly_typed]
        min_values_for_enum = 3
        max_values_for_enum = 8
        min_occurrences = 4
        require_cross_file = false
        allowed_string_sets = [["active", "inactive"], ["on", "off"]]
        ignore = ["tests/**", "**/*_pb2.py"]
        storage_mode = "tempfile"
        severity = "error"
        "#,
    )
    .unwrap();

    let st = &config.stringly_typed;
    assert_eq!(config.scan.effective_max_file_size(), 2048);
    assert_eq!(st.effective_min_values_for_enum(), 3);
    assert_eq!(st.effective_max_values_for_enum(), 8);
    assert_eq!(st.effective_min_occurrences(), 4);
    assert!(!st.effective_require_cross_file());
    assert_eq!(st.allowed_string_sets.len(), 2);
    assert_eq!(st.ignore, vec!["tests/**", "**/*_pb2.py"]);
    assert_eq!(st.effective_storage_mode().unwrap(), StorageMode::SpillToDisk);
    assert_eq!(st.effective_severity().unwrap(), Severity::Error);
    assert!(config.validate().is_ok());
}

#[test]
fn unknown_keys_are_ignored() {
    let config = StringlyConfig::from_toml(
        r#"
        [stringly_typed]
        future_option = 1
        "#,
    )
    .unwrap();
    assert!(config.validate().is_ok());
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = StringlyConfig::from_toml("[stringly_typed\nmin = ").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn to_toml_round_trips() {
    let config = StringlyConfig::from_toml(
        r#"
        [stringly_typed]
        min_occurrences = 3
        allowed_string_sets = [["a, b", "c"]]
        "#,
    )
    .unwrap();
    let text = config.to_toml().unwrap();
    let back = StringlyConfig::from_toml(&text).unwrap();
    assert_eq!(back.stringly_typed.min_occurrences, Some(3));
    assert_eq!(
        back.stringly_typed.allowed_string_sets,
        vec![vec!["a, b".to_string(), "c".to_string()]]
    );
}

// ---- Validation ----

#[test]
fn invalid_storage_mode_is_fatal_with_dedicated_code() {
    let config = StringlyConfig::from_toml(
        r#"
        [stringly_typed]
        storage_mode = "postgres"
        "#,
    )
    .unwrap();
    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidStorageMode { ref value } if value == "postgres"));
    assert_eq!(err.error_code(), "INVALID_STORAGE_MODE");
    assert!(err.coded_string().starts_with("[INVALID_STORAGE_MODE]"));
}

#[test]
fn storage_mode_aliases() {
    for s in ["memory", "in_memory", "IN-MEMORY"] {
        assert_eq!(StorageMode::parse_str(s).unwrap(), StorageMode::InMemory, "{s}");
    }
    for s in ["tempfile", "spill_to_disk", "disk"] {
        assert_eq!(StorageMode::parse_str(s).unwrap(), StorageMode::SpillToDisk, "{s}");
    }
    assert!(StorageMode::parse_str("").is_err());
}

#[test]
fn enum_window_must_be_ordered() {
    let config = StringlyConfig::from_toml(
        r#"
        [stringly_typed]
        min_values_for_enum = 5
        max_values_for_enum = 3
        "#,
    )
    .unwrap();
    match config.validate() {
        Err(ConfigError::ValidationFailed { field, .. }) => {
            assert_eq!(field, "stringly_typed.max_values_for_enum")
        }
        other => panic!("expected ValidationFailed, got {other:?}"),
    }
}

#[test]
fn min_values_below_two_rejected() {
    let config = StringlyConfig::from_toml("[stringly_typed]\nmin_values_for_enum = 1\n").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn zero_min_occurrences_rejected() {
    let config = StringlyConfig::from_toml("[stringly_typed]\nmin_occurrences = 0\n").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn bad_ignore_glob_rejected() {
    let config = StringlyConfig::from_toml("[stringly_typed]\nignore = [\"src/[\"]\n").unwrap();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { ref field, .. }) if field == "stringly_typed.ignore"
    ));
}

#[test]
fn unknown_severity_rejected() {
    let config = StringlyConfig::from_toml("[stringly_typed]\nseverity = \"fatal\"\n").unwrap();
    assert!(config.validate().is_err());
}

// ---- Layered loading ----

#[test]
fn load_reads_project_file_and_cli_wins() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("stringly.toml"),
        "[stringly_typed]\nmin_occurrences = 5\nstorage_mode = \"tempfile\"\n",
    )
    .unwrap();

    let cli = CliOverrides {
        min_occurrences: Some(3),
        ..Default::default()
    };
    let config = StringlyConfig::load(dir.path(), Some(&cli)).unwrap();
    assert_eq!(config.stringly_typed.effective_min_occurrences(), 3);
    assert_eq!(
        config.stringly_typed.effective_storage_mode().unwrap(),
        StorageMode::SpillToDisk
    );
}

#[test]
fn load_rejects_invalid_storage_mode_from_project_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("stringly.toml"),
        "[stringly_typed]\nstorage_mode = \"redis\"\n",
    )
    .unwrap();
    let err = StringlyConfig::load(dir.path(), None).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidStorageMode { .. }));
}

#[test]
fn load_without_project_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = StringlyConfig::load(dir.path(), None).unwrap();
    assert!(config.stringly_typed.effective_enabled());
}
