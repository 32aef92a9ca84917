//! Dedicated writer thread fed by a bounded crossbeam channel.
//! Buffered commands are committed in single transactions.
//!
//! The writer owns the store while extraction runs. `shutdown` drains the
//! channel, commits, and hands the store back, so aggregation can only start
//! after every queued write has landed.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use rusqlite::Connection;
use stringly_core::constants::{BATCH_CHANNEL_CAPACITY, BATCH_RECV_TIMEOUT_MS, BATCH_WRITE_SIZE};
use stringly_core::errors::StorageError;

use super::commands::BatchCommand;
use crate::connection::PatternStore;
use crate::queries;

const FLUSH_TIMEOUT: Duration = Duration::from_millis(BATCH_RECV_TIMEOUT_MS);

/// Statistics from the batch writer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteStats {
    pub instance_rows: usize,
    pub replaced_files: usize,
    pub removed_files: usize,
    pub removed_rows: usize,
    pub flushes: usize,
}

type WriterOutcome = (PatternStore, Result<WriteStats, StorageError>);

/// Accepts commands over a channel and applies them on one thread.
pub struct BatchWriter {
    tx: Sender<BatchCommand>,
    handle: Option<JoinHandle<WriterOutcome>>,
}

impl BatchWriter {
    /// Move `store` onto a new writer thread.
    pub fn new(store: PatternStore) -> Result<Self, StorageError> {
        let (tx, rx) = bounded(BATCH_CHANNEL_CAPACITY);

        let handle = thread::Builder::new()
            .name("stringly-batch-writer".to_string())
            .spawn(move || {
                let result = writer_loop(&store, rx);
                (store, result)
            })
            .map_err(|e| StorageError::WriterDisconnected {
                message: format!("failed to spawn writer thread: {e}"),
            })?;

        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    /// A cloneable handle for producer threads.
    pub fn sender(&self) -> Sender<BatchCommand> {
        self.tx.clone()
    }

    /// Send a command to the writer thread.
    pub fn send(&self, cmd: BatchCommand) -> Result<(), StorageError> {
        self.tx.send(cmd).map_err(|_| StorageError::WriterDisconnected {
            message: "batch writer channel disconnected".to_string(),
        })
    }

    /// Flush pending writes without waiting.
    pub fn flush(&self) -> Result<(), StorageError> {
        self.send(BatchCommand::Flush)
    }

    /// Flush pending writes and block until they are committed.
    pub fn flush_sync(&self) -> Result<(), StorageError> {
        let (tx, rx) = std::sync::mpsc::sync_channel(0);
        self.send(BatchCommand::FlushSync(tx))?;
        rx.recv().map_err(|_| StorageError::WriterDisconnected {
            message: "batch writer thread did not respond to flush_sync".to_string(),
        })
    }

    /// Stop the writer, commit everything queued, and return the store.
    ///
    /// On a write failure the store is dropped (releasing any spill file)
    /// and the error is returned.
    pub fn shutdown(mut self) -> Result<(PatternStore, WriteStats), StorageError> {
        let _ = self.tx.send(BatchCommand::Shutdown);
        let handle = self.handle.take().ok_or_else(|| StorageError::WriterDisconnected {
            message: "batch writer already shut down".to_string(),
        })?;
        let (store, result) = handle.join().map_err(|_| StorageError::WriterDisconnected {
            message: "batch writer thread panicked".to_string(),
        })?;
        let stats = result?;
        tracing::debug!(
            rows = stats.instance_rows,
            flushes = stats.flushes,
            "batch writer shut down"
        );
        Ok((store, stats))
    }
}

impl Drop for BatchWriter {
    fn drop(&mut self) {
        let _ = self.tx.send(BatchCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn writer_loop(
    store: &PatternStore,
    rx: Receiver<BatchCommand>,
) -> Result<WriteStats, StorageError> {
    let mut buffer: Vec<BatchCommand> = Vec::with_capacity(BATCH_WRITE_SIZE);
    let mut stats = WriteStats::default();

    loop {
        match rx.recv_timeout(FLUSH_TIMEOUT) {
            Ok(BatchCommand::Shutdown) => {
                flush_buffer(store, &mut buffer, &mut stats)?;
                break;
            }
            Ok(BatchCommand::Flush) => {
                flush_buffer(store, &mut buffer, &mut stats)?;
            }
            Ok(BatchCommand::FlushSync(done_tx)) => {
                flush_buffer(store, &mut buffer, &mut stats)?;
                let _ = done_tx.send(());
            }
            Ok(cmd) => {
                buffer.push(cmd);
                if buffer.len() >= BATCH_WRITE_SIZE {
                    flush_buffer(store, &mut buffer, &mut stats)?;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if !buffer.is_empty() {
                    flush_buffer(store, &mut buffer, &mut stats)?;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                flush_buffer(store, &mut buffer, &mut stats)?;
                break;
            }
        }
    }

    Ok(stats)
}

fn flush_buffer(
    store: &PatternStore,
    buffer: &mut Vec<BatchCommand>,
    stats: &mut WriteStats,
) -> Result<(), StorageError> {
    if buffer.is_empty() {
        return Ok(());
    }

    // Stats are only applied once the transaction commits.
    let batch_stats = store.with_transaction(|conn| apply_commands(conn, buffer.as_slice()))?;
    buffer.clear();

    stats.instance_rows += batch_stats.instance_rows;
    stats.replaced_files += batch_stats.replaced_files;
    stats.removed_files += batch_stats.removed_files;
    stats.removed_rows += batch_stats.removed_rows;
    stats.flushes += 1;
    Ok(())
}

fn apply_commands(conn: &Connection, buffer: &[BatchCommand]) -> Result<WriteStats, StorageError> {
    let mut batch_stats = WriteStats::default();
    for cmd in buffer {
        match cmd {
            BatchCommand::InsertInstances(instances) => {
                for instance in instances {
                    queries::upsert_instance(conn, instance)?;
                }
                batch_stats.instance_rows += instances.len();
            }
            BatchCommand::ReplaceFile {
                file_path,
                instances,
            } => {
                batch_stats.removed_rows += queries::delete_file(conn, file_path)?;
                for instance in instances {
                    queries::upsert_instance(conn, instance)?;
                }
                batch_stats.instance_rows += instances.len();
                batch_stats.replaced_files += 1;
            }
            BatchCommand::RemoveFile(file_path) => {
                batch_stats.removed_rows += queries::delete_file(conn, file_path)?;
                batch_stats.removed_files += 1;
            }
            BatchCommand::Flush | BatchCommand::FlushSync(_) | BatchCommand::Shutdown => {}
        }
    }
    Ok(batch_stats)
}
