//! Dotted access-chain names for variables and callees.

use stringly_core::types::collections::SmallVec8;
use tree_sitter::Node;

use crate::parsers::ParsedFile;

/// Receiver segment used when the receiver is itself a call result.
pub const CALL_PLACEHOLDER: &str = "<call>";
/// Receiver segment used for any other non-name expression.
pub const EXPR_PLACEHOLDER: &str = "<expr>";

/// Node kinds of one language's access chains.
struct ChainKinds {
    names: &'static [&'static str],
    member: &'static str,
    object_field: &'static str,
    property_field: &'static str,
    call: &'static str,
    parens: &'static str,
}

const PYTHON: ChainKinds = ChainKinds {
    names: &["identifier"],
    member: "attribute",
    object_field: "object",
    property_field: "attribute",
    call: "call",
    parens: "parenthesized_expression",
};

const JS: ChainKinds = ChainKinds {
    names: &["identifier", "this", "super"],
    member: "member_expression",
    object_field: "object",
    property_field: "property",
    call: "call_expression",
    parens: "parenthesized_expression",
};

/// `self.status`-style chain, or `None` if any receiver is not a name.
pub fn python_dotted_name(file: &ParsedFile, node: Node<'_>) -> Option<String> {
    chain(file, node, &PYTHON, false)
}

/// Callee chain with placeholders for non-name receivers.
pub fn python_callee_name(file: &ParsedFile, node: Node<'_>) -> String {
    chain(file, node, &PYTHON, true).unwrap_or_else(|| EXPR_PLACEHOLDER.to_string())
}

pub fn js_dotted_name(file: &ParsedFile, node: Node<'_>) -> Option<String> {
    chain(file, node, &JS, false)
}

pub fn js_callee_name(file: &ParsedFile, node: Node<'_>) -> String {
    chain(file, node, &JS, true).unwrap_or_else(|| EXPR_PLACEHOLDER.to_string())
}

fn chain(file: &ParsedFile, node: Node<'_>, kinds: &ChainKinds, lenient: bool) -> Option<String> {
    let mut segments: SmallVec8<&str> = SmallVec8::new();
    let mut current = node;
    loop {
        let kind = current.kind();
        if kinds.names.contains(&kind) {
            segments.push(file.text(current));
            break;
        }
        if kind == kinds.member {
            let property = current.child_by_field_name(kinds.property_field)?;
            segments.push(file.text(property));
            current = current.child_by_field_name(kinds.object_field)?;
            continue;
        }
        if kind == kinds.parens && lenient {
            current = current.named_child(0)?;
            continue;
        }
        if !lenient {
            return None;
        }
        segments.push(if kind == kinds.call {
            CALL_PLACEHOLDER
        } else {
            EXPR_PLACEHOLDER
        });
        break;
    }
    segments.reverse();
    Some(segments.join("."))
}
