//! One stringly-typed run, end to end.
//!
//! 1. Validate config and resolve the storage mode (fatal, before any work).
//! 2. Extract every file in parallel; writes go through one `BatchWriter`.
//! 3. Shut the writer down. This is the phase barrier.
//! 4. Aggregate, filter, generate.
//! 5. Close the store, on success and on failure.

use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use stringly_core::config::{StorageMode, StringlyConfig};
use stringly_core::constants::DEFAULT_RULE_ID;
use stringly_core::errors::{PipelineError, PipelineResult, ScanError, StorageError};
use stringly_core::types::Violation;
use stringly_storage::{BatchCommand, BatchWriter, PatternStore, StoreCounts, WriteStats};

use crate::extractors::extract_source;
use crate::scanner::walker::relative_path;
use crate::scanner::{discover_files, Language, PathMatcher};
use crate::violations::generate_violations;

/// One in-memory source file. `path` is what violations report.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: String,
    pub source: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Outcome of one run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub violations: Vec<Violation>,
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub instances: usize,
    pub write_stats: WriteStats,
    pub store_counts: StoreCounts,
}

pub struct StringlyTypedEngine {
    config: StringlyConfig,
    rule_id: String,
    storage_mode: StorageMode,
    ignore: PathMatcher,
}

impl StringlyTypedEngine {
    /// Validate `config` up front. An invalid storage mode fails here,
    /// before any file is read.
    pub fn new(config: StringlyConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        let storage_mode = config.stringly_typed.effective_storage_mode()?;
        let ignore = PathMatcher::new(&config.stringly_typed.ignore)?;
        Ok(Self {
            config,
            rule_id: DEFAULT_RULE_ID.to_string(),
            storage_mode,
            ignore,
        })
    }

    pub fn with_rule_id(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = rule_id.into();
        self
    }

    pub fn config(&self) -> &StringlyConfig {
        &self.config
    }

    pub fn storage_mode(&self) -> StorageMode {
        self.storage_mode
    }

    /// Run over sources already in memory.
    pub fn run(&self, files: &[SourceFile]) -> Result<RunReport, PipelineError> {
        if !self.config.stringly_typed.effective_enabled() {
            tracing::debug!("stringly-typed rule disabled");
            return Ok(RunReport::default());
        }

        let selected: Vec<&SourceFile> = files.iter().filter(|f| self.selects(&f.path)).collect();
        let files_skipped = files.len() - selected.len();

        let store = PatternStore::open(self.storage_mode)?;
        let writer = BatchWriter::new(store)?;
        let extracted = self.extract_all(&selected, &writer);
        let (store, write_stats) = writer.shutdown()?;

        let analysis = extracted.map_err(PipelineError::from).and_then(|instances| {
            let store_counts = store.counts()?;
            tracing::info!(
                files = store_counts.files,
                validations = store_counts.validations,
                comparisons = store_counts.comparisons,
                call_arguments = store_counts.call_arguments,
                "extraction complete"
            );
            let violations = generate_violations(&store, &self.rule_id, &self.config.stringly_typed)?;
            Ok((instances, store_counts, violations))
        });
        let closed = store.close();
        let (instances, store_counts, violations) = analysis?;
        closed?;

        Ok(RunReport {
            violations,
            files_scanned: selected.len(),
            files_skipped,
            instances,
            write_stats,
            store_counts,
        })
    }

    /// Read `paths` (relative to `root` for reporting) and run. Unreadable
    /// and oversized files are skipped and reported as non-fatal errors.
    pub fn run_paths(
        &self,
        root: &Path,
        paths: &[PathBuf],
    ) -> Result<PipelineResult<RunReport>, PipelineError> {
        let max = self.config.scan.effective_max_file_size();
        let mut errors = Vec::new();
        let mut sources = Vec::with_capacity(paths.len());
        for path in paths {
            match read_source(path, max) {
                Ok(source) => sources.push(SourceFile::new(relative_path(root, path), source)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping file");
                    errors.push(PipelineError::from(e));
                }
            }
        }

        let mut report = self.run(&sources)?;
        report.files_skipped += errors.len();
        Ok(PipelineResult {
            data: report,
            errors,
        })
    }

    /// Discover supported files under `root` and run.
    pub fn run_root(&self, root: &Path) -> Result<PipelineResult<RunReport>, PipelineError> {
        let paths = discover_files(root, &self.config.scan, &self.ignore);
        tracing::info!(root = %root.display(), files = paths.len(), "starting stringly-typed run");
        self.run_paths(root, &paths)
    }

    fn selects(&self, path: &str) -> bool {
        Language::from_path(path).is_some() && !self.ignore.is_match(path)
    }

    /// Extract in parallel; every batch goes to the single writer thread.
    fn extract_all(
        &self,
        files: &[&SourceFile],
        writer: &BatchWriter,
    ) -> Result<usize, StorageError> {
        let sender = writer.sender();
        let extract = || {
            files
                .par_iter()
                .map(|file| -> Result<usize, StorageError> {
                    let instances = extract_source(&file.path, &file.source);
                    let count = instances.len();
                    if count > 0 {
                        sender
                            .send(BatchCommand::InsertInstances(instances))
                            .map_err(|_| StorageError::WriterDisconnected {
                                message: "batch writer stopped during extraction".to_string(),
                            })?;
                    }
                    Ok(count)
                })
                .try_reduce(|| 0, |a, b| Ok(a + b))
        };

        let threads = self.config.scan.effective_threads();
        if threads == 0 {
            return extract();
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("stringly-extract-{i}"))
            .build()
        {
            Ok(pool) => pool.install(extract),
            Err(e) => {
                tracing::warn!(threads, error = %e, "thread pool unavailable, using global pool");
                extract()
            }
        }
    }
}

fn read_source(path: &Path, max: u64) -> Result<String, ScanError> {
    let io_err = |source: io::Error| ScanError::IoError {
        path: path.to_path_buf(),
        source,
    };
    let size = std::fs::metadata(path).map_err(io_err)?.len();
    if size > max {
        return Err(ScanError::MaxFileSizeExceeded {
            path: path.to_path_buf(),
            size,
            max,
        });
    }
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::InvalidData => ScanError::InvalidUtf8 {
            path: path.to_path_buf(),
        },
        _ => io_err(e),
    })
}
