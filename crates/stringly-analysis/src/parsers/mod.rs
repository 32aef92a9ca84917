//! Tree-sitter parsing for the supported languages.

pub mod error_tolerant;

use std::cell::RefCell;

use stringly_core::errors::ParseError;
use tree_sitter::{Node, Parser, Tree};

use crate::scanner::language_detect::{extension_of, Language};

thread_local! {
    static PARSER: RefCell<Parser> = RefCell::new(Parser::new());
}

/// One parsed source file. Extractors only ever see this.
pub struct ParsedFile {
    pub path: String,
    pub language: Language,
    pub source: String,
    pub tree: Tree,
    /// ERROR or MISSING nodes in the tree; their subtrees are not extracted.
    pub error_count: u32,
}

impl ParsedFile {
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text of `node`, empty when it is not valid UTF-8.
    pub fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }
}

/// Parse `source` as `language`, using a thread-local parser instance.
pub fn parse_source(
    path: &str,
    source: impl Into<String>,
    language: Language,
) -> Result<ParsedFile, ParseError> {
    let source = source.into();
    let grammar = language.ts_language_for_ext(extension_of(path));

    let tree = PARSER.with(|cell| {
        let mut parser = cell.borrow_mut();
        parser
            .set_language(&grammar)
            .map_err(|e| ParseError::GrammarNotFound {
                language: format!("{language}: {e}"),
            })?;
        parser
            .parse(&source, None)
            .ok_or_else(|| ParseError::TreeSitterError {
                path: path.into(),
                message: "parser returned no tree".to_string(),
            })
    })?;

    let error_count = error_tolerant::count_errors(tree.root_node());
    if error_count > 0 {
        tracing::debug!(path, error_count, "partial parse");
    }

    Ok(ParsedFile {
        path: path.to_string(),
        language,
        source,
        tree,
        error_count,
    })
}

/// Parse a file whose language is inferred from its extension.
pub fn parse_path(path: &str, source: impl Into<String>) -> Result<ParsedFile, ParseError> {
    let language = Language::from_path(path).ok_or_else(|| ParseError::UnsupportedLanguage {
        extension: extension_of(path).unwrap_or("").to_string(),
    })?;
    parse_source(path, source, language)
}

/// Pre-order walk of every named node outside ERROR subtrees.
///
/// Iterative, so deeply nested expressions cannot overflow the stack.
pub fn walk_named<'t>(root: Node<'t>, mut visit: impl FnMut(Node<'t>)) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() {
            continue;
        }
        if node.is_named() {
            visit(node);
        }
        let count = node.child_count();
        for i in (0..count).rev() {
            if let Some(child) = node.child(i) {
                stack.push(child);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_path_infers_language() {
        let file = parse_path("web/app.tsx", "const a = <b>{c}</b>;").unwrap();
        assert_eq!(file.language, Language::TypeScript);
        assert_eq!(file.error_count, 0);

        let err = parse_path("notes.rb", "puts 1").err().unwrap();
        assert!(matches!(err, ParseError::UnsupportedLanguage { .. }));
    }

    #[test]
    fn broken_source_still_parses() {
        let file = parse_path("bad.py", "def f(:\n    return 'x'\n").unwrap();
        assert!(file.error_count > 0);
        let mut kinds = Vec::new();
        walk_named(file.root(), |n| kinds.push(n.kind()));
        assert!(!kinds.contains(&"ERROR"));
    }
}
