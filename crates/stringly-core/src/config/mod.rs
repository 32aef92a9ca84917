//! Configuration system.
//! TOML-based, layered resolution: CLI > env > project > user > defaults.

pub mod scan_config;
pub mod storage_mode;
pub mod stringly_config;
pub mod stringly_typed_config;

pub use scan_config::ScanConfig;
pub use storage_mode::StorageMode;
pub use stringly_config::{CliOverrides, StringlyConfig};
pub use stringly_typed_config::StringlyTypedConfig;
