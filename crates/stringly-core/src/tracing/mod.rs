//! Tracing setup for the engine.

pub mod setup;

pub use setup::init_tracing;
