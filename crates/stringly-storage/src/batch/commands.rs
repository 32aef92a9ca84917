//! Commands accepted by the batch writer thread.

use std::sync::mpsc::SyncSender;

use stringly_core::types::PatternInstance;

pub enum BatchCommand {
    /// Upsert instances (latest write at a position wins).
    InsertInstances(Vec<PatternInstance>),
    /// Replace everything stored for one file.
    ReplaceFile {
        file_path: String,
        instances: Vec<PatternInstance>,
    },
    /// Delete everything stored for one file.
    RemoveFile(String),
    /// Commit buffered commands.
    Flush,
    /// Commit buffered commands and acknowledge on the channel.
    FlushSync(SyncSender<()>),
    /// Commit buffered commands and stop the thread.
    Shutdown,
}

impl std::fmt::Debug for BatchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsertInstances(rows) => write!(f, "InsertInstances({})", rows.len()),
            Self::ReplaceFile {
                file_path,
                instances,
            } => write!(f, "ReplaceFile({file_path}, {})", instances.len()),
            Self::RemoveFile(path) => write!(f, "RemoveFile({path})"),
            Self::Flush => f.write_str("Flush"),
            Self::FlushSync(_) => f.write_str("FlushSync"),
            Self::Shutdown => f.write_str("Shutdown"),
        }
    }
}
