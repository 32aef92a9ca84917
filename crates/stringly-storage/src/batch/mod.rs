//! Single-writer batching: extraction threads send, one thread writes.

pub mod commands;
pub mod writer;

pub use commands::BatchCommand;
pub use writer::{BatchWriter, WriteStats};
