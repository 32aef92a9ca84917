//! # stringly-storage
//!
//! Transient SQLite store for one run: every extracted pattern instance is
//! upserted here, then aggregated once extraction has finished.

pub mod batch;
pub mod connection;
pub mod migrations;
pub mod queries;

pub use batch::{BatchCommand, BatchWriter, WriteStats};
pub use connection::{PatternStore, StoreCounts};
pub use queries::{CallSiteGroup, OccurrenceBasis, VariableGroup};
