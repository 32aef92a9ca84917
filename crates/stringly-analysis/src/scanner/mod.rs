//! Scanner subsystem: language detection, ignore globs, directory walking.

pub mod language_detect;
pub mod path_matcher;
pub mod walker;

pub use language_detect::Language;
pub use path_matcher::PathMatcher;
pub use walker::discover_files;
