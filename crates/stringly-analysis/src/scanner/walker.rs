//! Parallel file discovery using the `ignore` crate's `WalkParallel`.
//!
//! Honors `.gitignore` and `.stringlyignore`, skips well-known vendored and
//! build directories, and keeps only files with a pattern extractor.

use std::path::{Path, PathBuf};

use crossbeam_channel as channel;
use stringly_core::config::ScanConfig;

use super::language_detect::Language;
use super::path_matcher::PathMatcher;

/// Directories never worth scanning.
pub const DEFAULT_IGNORES: &[&str] = &[
    "node_modules",
    ".git",
    "dist",
    "build",
    "target",
    ".next",
    "__pycache__",
    ".pytest_cache",
    "coverage",
    "vendor",
    ".venv",
    "venv",
    ".tox",
    ".mypy_cache",
];

/// Walk `root` and return supported source files, sorted by path.
///
/// `ignore` globs are matched against paths relative to `root`.
pub fn discover_files(root: &Path, config: &ScanConfig, ignore: &PathMatcher) -> Vec<PathBuf> {
    let (tx, rx) = channel::unbounded();

    let mut builder = ignore::WalkBuilder::new(root);
    builder
        .hidden(false)
        .git_ignore(true)
        .git_exclude(true)
        .add_custom_ignore_filename(".stringlyignore");
    if config.effective_threads() > 0 {
        builder.threads(config.effective_threads());
    }

    let mut overrides = ignore::overrides::OverrideBuilder::new(root);
    for pattern in DEFAULT_IGNORES {
        for glob in [format!("!{pattern}/**"), format!("!{pattern}")] {
            if let Err(e) = overrides.add(&glob) {
                tracing::debug!(glob = %glob, error = %e, "skipping default ignore");
            }
        }
    }
    match overrides.build() {
        Ok(built) => {
            builder.overrides(built);
        }
        Err(e) => tracing::debug!(error = %e, "default ignores unavailable"),
    }

    builder.build_parallel().run(|| {
        let tx = tx.clone();
        Box::new(move |entry| {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => return ignore::WalkState::Continue,
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                return ignore::WalkState::Continue;
            }
            let path = entry.path();
            if Language::from_extension(path.extension().and_then(|e| e.to_str())).is_some() {
                let _ = tx.send(path.to_path_buf());
            }
            ignore::WalkState::Continue
        })
    });
    drop(tx);

    let mut files: Vec<PathBuf> = rx
        .into_iter()
        .filter(|p| !ignore.is_match(&relative_path(root, p)))
        .collect();
    files.sort();
    tracing::debug!(root = %root.display(), files = files.len(), "discovered source files");
    files
}

/// `path` relative to `root` with `/` separators, for reporting and globbing.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
