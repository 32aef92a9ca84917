//! End-to-end runs through `StringlyTypedEngine`.

use stringly_analysis::{SourceFile, StringlyTypedEngine};
use stringly_core::config::StorageMode;
use stringly_core::errors::{ConfigError, PipelineError, ScanError};
use stringly_core::types::{Severity, Violation};
use stringly_core::StringlyConfig;

fn engine(toml: &str) -> StringlyTypedEngine {
    let config = StringlyConfig::from_toml(toml).unwrap();
    StringlyTypedEngine::new(config).unwrap()
}

fn run(toml: &str, files: &[(&str, &str)]) -> Vec<Violation> {
    let sources: Vec<SourceFile> = files.iter().map(|(p, s)| SourceFile::new(*p, *s)).collect();
    engine(toml).run(&sources).unwrap().violations
}

fn rule_ids(violations: &[Violation]) -> Vec<&str> {
    violations.iter().map(|v| v.rule_id.as_str()).collect()
}

// ---- Scenarios ----

#[test]
fn scenario_a_limited_values_across_two_files() {
    let violations = run(
        "",
        &[
            ("file1.py", "db.set_mode(\"prod\")\n"),
            ("file2.py", "db.set_mode(\"dev\")\n"),
        ],
    );
    assert_eq!(violations.len(), 2);
    assert_eq!(
        rule_ids(&violations),
        vec!["stringly-typed.limited-values", "stringly-typed.limited-values"]
    );
    assert_eq!(violations[0].file_path, "file1.py");
    assert!(violations[0].message.contains("file2.py:1"), "{}", violations[0].message);
    assert_eq!(violations[1].file_path, "file2.py");
    assert!(violations[1].message.contains("file1.py:1"), "{}", violations[1].message);
    assert!(violations[0].message.contains("db.set_mode"));
}

#[test]
fn scenario_b_default_value_position_is_exempt() {
    let violations = run(
        "",
        &[
            ("a.py", "cache.get(\"key\", \"default\")\n"),
            ("b.py", "cache.get(\"key\", \"fallback\")\n"),
            ("c.py", "cache.get(\"key\", \"none\")\n"),
        ],
    );
    assert!(violations.is_empty(), "{violations:?}");
}

#[test]
fn scenario_c_allow_list_wins() {
    let files = [
        ("a.py", "if status == \"active\":\n    go()\n"),
        ("b.py", "if status == \"inactive\":\n    stop()\n"),
    ];
    let allowed = "[stringly_typed]\nallowed_string_sets = [[\"inactive\", \"active\"]]\n";
    assert!(run(allowed, &files).is_empty());

    let reported = run("", &files);
    assert_eq!(
        rule_ids(&reported),
        vec![
            "stringly-typed.scattered-comparison",
            "stringly-typed.scattered-comparison"
        ]
    );
}

#[test]
fn scenario_d_numeric_values_are_filtered() {
    let violations = run(
        "",
        &[
            ("a.py", "response.status(\"200\")\n"),
            ("b.py", "response.status(\"201\")\n"),
            ("c.py", "response.status(\"404\")\n"),
        ],
    );
    assert!(violations.is_empty(), "{violations:?}");
}

// ---- Thresholds and windows ----

#[test]
fn repeated_validation_needs_two_files() {
    let same_file = run("", &[("a.py", "x in {'a', 'b'}\ny in {'b', 'a'}\n")]);
    assert!(same_file.is_empty());

    let cross_file = run(
        "",
        &[
            ("a.py", "ok = x in {'a', 'b'}\n"),
            ("b.ts", "const ok = ['b', 'a'].includes(y);\n"),
        ],
    );
    assert_eq!(
        rule_ids(&cross_file),
        vec![
            "stringly-typed.repeated-validation",
            "stringly-typed.repeated-validation"
        ]
    );
    assert!(cross_file[1].message.contains("a.py:1"));
}

#[test]
fn min_occurrences_counts_files_when_cross_file() {
    let files = [
        ("a.py", "ok = x in {'a', 'b'}\n"),
        ("b.py", "ok = x in {'a', 'b'}\n"),
    ];
    let strict = "[stringly_typed]\nmin_occurrences = 3\n";
    assert!(run(strict, &files).is_empty());

    let three = [
        ("a.py", "ok = x in {'a', 'b'}\n"),
        ("b.py", "ok = x in {'a', 'b'}\n"),
        ("c.py", "ok = x in {'a', 'b'}\n"),
    ];
    assert_eq!(run(strict, &three).len(), 3);
}

#[test]
fn same_file_calls_count_without_cross_file() {
    let files = [("a.py", "job.set_level('low')\njob.set_level('high')\n")];
    assert!(run("", &files).is_empty());

    let relaxed = "[stringly_typed]\nrequire_cross_file = false\n";
    assert_eq!(run(relaxed, &files).len(), 2);
}

#[test]
fn too_many_values_is_free_text() {
    let sources: Vec<(String, String)> = (0..7)
        .map(|i| (format!("f{i}.py"), format!("label.assign('value{i}')\n")))
        .collect();
    let files: Vec<(&str, &str)> = sources.iter().map(|(p, s)| (p.as_str(), s.as_str())).collect();
    assert!(run("", &files).is_empty());

    let wide = "[stringly_typed]\nmax_values_for_enum = 7\n";
    assert_eq!(run(wide, &files).len(), 7);
}

#[test]
fn too_few_values_is_not_an_enum() {
    let files = [("a.py", "q.set_kind('a')\n"), ("b.py", "q.set_kind('b')\n")];
    let narrow = "[stringly_typed]\nmin_values_for_enum = 3\n";
    assert!(run(narrow, &files).is_empty());
}

// ---- Filtering ----

#[test]
fn value_shape_needs_every_value() {
    let verbs = [
        ("a.py", "client.send('GET')\n"),
        ("b.py", "client.send('POST')\n"),
    ];
    assert!(run("", &verbs).is_empty());

    let mixed = [
        ("a.py", "client.send('GET')\n"),
        ("b.py", "client.send('POST')\n"),
        ("c.py", "client.send('archive')\n"),
    ];
    assert_eq!(run("", &mixed).len(), 3);
}

#[test]
fn denylisted_callee_is_suppressed() {
    let files = [
        ("a.py", "logger.info('starting')\n"),
        ("b.py", "logger.info('stopping')\n"),
    ];
    assert!(run("", &files).is_empty());
}

#[test]
fn platform_probe_and_excluded_variables() {
    let files = [
        ("a.py", "if sys.platform == 'win32':\n    pass\n"),
        ("b.py", "if sys.platform == 'darwin':\n    pass\n"),
        ("c.py", "if event.kind == 'a':\n    pass\n"),
        ("d.py", "if event.kind == 'b':\n    pass\n"),
    ];
    assert_eq!(run("", &files).len(), 2);
    let excluded = "[stringly_typed]\nexclude_variables = [\"event.*\"]\n";
    assert!(run(excluded, &files).is_empty());
}

#[test]
fn comma_literal_counts_once() {
    let violations = run(
        "",
        &[
            ("a.py", "repo.run_sql(\"SELECT a, b, c FROM t\")\n"),
            ("b.py", "repo.run_sql(\"SELECT d FROM t\")\n"),
        ],
    );
    assert_eq!(violations.len(), 2);
    assert!(violations[0].message.contains("2 distinct"), "{}", violations[0].message);
    assert!(violations[0].message.contains("SELECT a, b, c FROM t"));
}

// ---- Output ----

#[test]
fn severity_and_suggestion_follow_config_and_language() {
    let violations = run(
        "[stringly_typed]\nseverity = \"error\"\n",
        &[
            ("a.py", "db.set_mode('prod')\n"),
            ("b.ts", "db.set_mode('dev');\n"),
        ],
    );
    assert_eq!(violations.len(), 2);
    assert!(violations.iter().all(|v| v.severity == Severity::Error));
    let py = violations[0].suggestion.as_deref().unwrap();
    assert!(py.contains("class Mode(str, Enum)"), "{py}");
    let ts = violations[1].suggestion.as_deref().unwrap();
    assert!(ts.contains("type Mode = \"dev\" | \"prod\";"), "{ts}");
}

#[test]
fn output_is_sorted_by_location() {
    let violations = run(
        "",
        &[
            ("z.py", "a.set_x('1a')\nb.set_y('p')\n"),
            ("m.py", "b.set_y('q')\na.set_x('2b')\n"),
        ],
    );
    let keys: Vec<(String, u32)> = violations
        .iter()
        .map(|v| (v.file_path.clone(), v.line))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(keys.len(), 4);
}

#[test]
fn ignore_globs_skip_files() {
    let files = [
        ("src/a.py", "db.set_mode('prod')\n"),
        ("src/b.py", "db.set_mode('dev')\n"),
        ("tests/c.py", "db.set_mode('test')\n"),
    ];
    let violations = run("[stringly_typed]\nignore = [\"tests/**\"]\n", &files);
    assert_eq!(violations.len(), 2);
    assert!(violations.iter().all(|v| v.file_path.starts_with("src/")));
}

#[test]
fn disabled_rule_reports_nothing() {
    let files = [("a.py", "db.set_mode('prod')\n"), ("b.py", "db.set_mode('dev')\n")];
    assert!(run("[stringly_typed]\nenabled = false\n", &files).is_empty());
}

#[test]
fn custom_rule_id_prefixes_kinds() {
    let sources = [
        SourceFile::new("a.py", "db.set_mode('prod')\n"),
        SourceFile::new("b.py", "db.set_mode('dev')\n"),
    ];
    let report = engine("").with_rule_id("py.stringly").run(&sources).unwrap();
    assert!(report
        .violations
        .iter()
        .all(|v| v.rule_id == "py.stringly.limited-values"));
}

// ---- Lifecycle and errors ----

#[test]
fn malformed_file_does_not_abort_the_run() {
    let sources = [
        SourceFile::new("a.py", "db.set_mode('prod')\n"),
        SourceFile::new("b.py", "def broken(:\n    ))) ((\n"),
        SourceFile::new("c.py", "db.set_mode('dev')\n"),
        SourceFile::new("README.md", "# docs"),
    ];
    let report = engine("").run(&sources).unwrap();
    assert_eq!(report.violations.len(), 2);
    assert_eq!(report.files_scanned, 3);
    assert_eq!(report.files_skipped, 1);
    assert_eq!(report.instances, 2);
    assert_eq!(report.store_counts.call_arguments, 2);
}

#[test]
fn spill_to_disk_matches_in_memory() {
    let files = [
        ("a.py", "db.set_mode('prod')\nok = m in {'x', 'y'}\n"),
        ("b.ts", "db.set_mode('dev'); const ok = ['y', 'x'].includes(m);\n"),
    ];
    let spill = engine("[stringly_typed]\nstorage_mode = \"tempfile\"\n");
    assert_eq!(spill.storage_mode(), StorageMode::SpillToDisk);

    let sources: Vec<SourceFile> = files.iter().map(|(p, s)| SourceFile::new(*p, *s)).collect();
    let on_disk = spill.run(&sources).unwrap().violations;
    let in_memory = run("", &files);
    assert_eq!(on_disk, in_memory);
    assert_eq!(on_disk.len(), 4);
}

#[test]
fn invalid_storage_mode_fails_before_scanning() {
    let config = StringlyConfig::from_toml("[stringly_typed]\nstorage_mode = \"redis\"\n").unwrap();
    let err = StringlyTypedEngine::new(config).err().unwrap();
    assert!(
        matches!(err, PipelineError::Config(ConfigError::InvalidStorageMode { .. })),
        "{err:?}"
    );
}

#[test]
fn run_paths_reports_unreadable_files_as_non_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.py");
    let b = dir.path().join("b.py");
    let big = dir.path().join("big.py");
    let missing = dir.path().join("missing.py");
    std::fs::write(&a, "db.set_mode('prod')\n").unwrap();
    std::fs::write(&b, "db.set_mode('dev')\n").unwrap();
    std::fs::write(&big, "x = 1\n".repeat(100)).unwrap();

    let engine = engine("[scan]\nmax_file_size = 64\n");
    let result = engine
        .run_paths(dir.path(), &[a, b, big, missing])
        .unwrap();
    assert_eq!(result.data.violations.len(), 2);
    assert_eq!(result.data.violations[0].file_path, "a.py");
    assert_eq!(result.error_count(), 2);
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(e, PipelineError::Scan(ScanError::MaxFileSizeExceeded { .. }))));
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(e, PipelineError::Scan(ScanError::IoError { .. }))));
    assert_eq!(result.data.files_skipped, 2);
}

#[test]
fn run_root_walks_and_skips_vendored_directories() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::create_dir_all(root.join("src")).unwrap();
    std::fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
    std::fs::write(root.join("src/a.py"), "db.set_mode('prod')\n").unwrap();
    std::fs::write(root.join("src/b.js"), "db.set_mode('dev');\n").unwrap();
    std::fs::write(root.join("node_modules/pkg/c.js"), "db.set_mode('vendored');\n").unwrap();

    let result = engine("[scan]\nthreads = 2\n").run_root(root).unwrap();
    assert!(result.is_clean());
    let paths: Vec<&str> = result.data.violations.iter().map(|v| v.file_path.as_str()).collect();
    assert_eq!(paths, vec!["src/a.py", "src/b.js"]);
}

#[test]
fn run_root_reports_oversized_files() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    std::fs::write(root.join("a.py"), "db.set_mode('prod')\n").unwrap();
    std::fs::write(root.join("b.py"), "db.set_mode('dev')\n").unwrap();
    std::fs::write(root.join("big.py"), "x = 1\n".repeat(100)).unwrap();

    let result = engine("[scan]\nmax_file_size = 64\n").run_root(root).unwrap();
    assert_eq!(result.data.violations.len(), 2);
    assert_eq!(result.error_count(), 1);
    assert!(matches!(
        &result.errors[0],
        PipelineError::Scan(ScanError::MaxFileSizeExceeded { .. })
    ));
    assert_eq!(result.data.files_scanned, 2);
    assert_eq!(result.data.files_skipped, 1);
}

#[test]
fn runs_with_tracing_installed() {
    stringly_core::tracing::init_tracing();
    stringly_core::tracing::init_tracing();
    let files = [("a.py", "db.set_mode('prod')\n"), ("b.py", "db.set_mode('dev')\n")];
    assert_eq!(run("", &files).len(), 2);
}
