//! Per-language pattern extractors.
//!
//! Each extractor walks one parsed file and yields the validation,
//! comparison, and call-argument instances it contains. Extractors never
//! fail: unparsable input produces an empty result.

pub mod literals;
pub mod names;
pub mod python;
pub mod typescript;

use stringly_core::types::{PatternInstance, SourceLocation};
use tree_sitter::Node;

use crate::parsers::{self, ParsedFile};
use crate::scanner::Language;

pub use python::PythonExtractor;
pub use typescript::TypeScriptExtractor;

/// Turns one parsed file into pattern instances.
pub trait PatternExtractor: Send + Sync {
    /// Languages this extractor understands.
    fn languages(&self) -> &'static [Language];

    /// All instances in `file`, in source order.
    fn find_patterns(&self, file: &ParsedFile) -> Vec<PatternInstance>;
}

static PYTHON: PythonExtractor = PythonExtractor;
static TYPESCRIPT: TypeScriptExtractor = TypeScriptExtractor;

/// The extractor registered for `language`.
pub fn extractor_for(language: Language) -> &'static dyn PatternExtractor {
    match language {
        Language::Python => &PYTHON,
        Language::TypeScript | Language::JavaScript => &TYPESCRIPT,
    }
}

/// Parse and extract one file. Unsupported or unparsable files yield nothing.
pub fn extract_source(path: &str, source: &str) -> Vec<PatternInstance> {
    let Some(language) = Language::from_path(path) else {
        return Vec::new();
    };
    match parsers::parse_source(path, source, language) {
        Ok(file) => {
            let instances = extractor_for(language).find_patterns(&file);
            tracing::debug!(path, language = %language, instances = instances.len(), "extracted");
            instances
        }
        Err(e) => {
            tracing::warn!(path, error = %e, "parse failed, skipping file");
            Vec::new()
        }
    }
}

/// 1-indexed line, 0-indexed column of `node` in `file`.
pub(crate) fn location_of(file: &ParsedFile, node: Node<'_>) -> SourceLocation {
    let pos = node.start_position();
    SourceLocation::new(file.path.clone(), pos.row as u32 + 1, pos.column as u32)
}

/// Strip any number of wrapping parentheses.
pub(crate) fn unwrap_parens(mut node: Node<'_>) -> Node<'_> {
    while node.kind() == "parenthesized_expression" {
        match node.named_child(0) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// Named children other than comments.
pub(crate) fn operands<'t>(node: Node<'t>) -> impl Iterator<Item = Node<'t>> {
    (0..node.named_child_count())
        .filter_map(move |i| node.named_child(i))
        .filter(|n| n.kind() != "comment")
}
