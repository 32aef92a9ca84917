//! Python extractor.

use stringly_core::types::collections::{SmallVec4, SmallVec8};
use stringly_core::types::{
    Comparison, ComparisonOperator, FunctionCallArgument, PatternInstance, ValidationKind,
    ValidationPattern, ValueSet,
};
use stringly_core::FxHashSet;
use tree_sitter::Node;

use super::literals::python_string_value;
use super::names::{python_callee_name, python_dotted_name};
use super::{location_of, operands, unwrap_parens, PatternExtractor};
use crate::parsers::{walk_named, ParsedFile};
use crate::scanner::Language;

pub struct PythonExtractor;

impl PatternExtractor for PythonExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::Python]
    }

    fn find_patterns(&self, file: &ParsedFile) -> Vec<PatternInstance> {
        let mut visitor = Visitor {
            file,
            out: Vec::new(),
            consumed: FxHashSet::default(),
        };
        walk_named(file.root(), |node| match node.kind() {
            "boolean_operator" => visitor.boolean_chain(node),
            "comparison_operator" => visitor.comparison(node),
            "call" => visitor.call(node),
            _ => {}
        });
        visitor.out
    }
}

struct Visitor<'f> {
    file: &'f ParsedFile,
    out: Vec<PatternInstance>,
    /// Comparisons already folded into an equality chain.
    consumed: FxHashSet<usize>,
}

impl Visitor<'_> {
    /// `x == "a" or x == "b"`, and the negated `x != "a" and x != "b"`.
    fn boolean_chain(&mut self, node: Node<'_>) {
        let Some(op) = bool_op(node) else { return };
        let expected = match op {
            "or" => "==",
            "and" => "!=",
            _ => return,
        };
        if enclosing_bool_op(node) == Some(op) {
            return;
        }

        let mut terms: SmallVec8<Node<'_>> = SmallVec8::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let current = unwrap_parens(current);
            if current.kind() == "boolean_operator" && bool_op(current) == Some(op) {
                let (Some(left), Some(right)) = (
                    current.child_by_field_name("left"),
                    current.child_by_field_name("right"),
                ) else {
                    return;
                };
                stack.push(right);
                stack.push(left);
            } else {
                terms.push(current);
            }
        }

        let mut variable: Option<String> = None;
        let mut values = ValueSet::new();
        for term in &terms {
            let Some((name, value, operator)) = self.equality(*term) else {
                return;
            };
            if operator != expected {
                return;
            }
            match &variable {
                Some(v) if *v != name => return,
                Some(_) => {}
                None => variable = Some(name),
            }
            values.insert(value);
        }
        if values.len() < 2 {
            return;
        }

        self.consumed.extend(terms.iter().map(|t| t.id()));
        self.out.push(
            ValidationPattern::new(
                variable,
                values,
                ValidationKind::EqualityChain,
                location_of(self.file, node),
            )
            .into(),
        );
    }

    fn comparison(&mut self, node: Node<'_>) {
        let Some((left, op, right)) = binary_comparison(node) else {
            return;
        };
        match op {
            "in" | "not in" => self.membership(node, left, right),
            "==" | "!=" => {
                if self.consumed.contains(&node.id()) {
                    return;
                }
                let Some((variable_name, compared_value, _)) = self.equality(node) else {
                    return;
                };
                if is_type_identity_check(&variable_name, &compared_value) {
                    return;
                }
                let operator = if op == "==" {
                    ComparisonOperator::Eq
                } else {
                    ComparisonOperator::Ne
                };
                self.out.push(
                    Comparison {
                        variable_name,
                        compared_value,
                        operator,
                        location: location_of(self.file, node),
                    }
                    .into(),
                );
            }
            _ => {}
        }
    }

    fn membership(&mut self, node: Node<'_>, left: Node<'_>, right: Node<'_>) {
        let container = unwrap_parens(right);
        if !matches!(container.kind(), "set" | "list" | "tuple") {
            return;
        }
        let mut values = ValueSet::new();
        for element in operands(container) {
            let Some(value) = self.string_value(element) else {
                return;
            };
            values.insert(value);
        }
        if values.len() < 2 {
            return;
        }
        let variable = python_dotted_name(self.file, unwrap_parens(left));
        self.out.push(
            ValidationPattern::new(
                variable,
                values,
                ValidationKind::Membership,
                location_of(self.file, node),
            )
            .into(),
        );
    }

    fn call(&mut self, node: Node<'_>) {
        let (Some(function), Some(arguments)) = (
            node.child_by_field_name("function"),
            node.child_by_field_name("arguments"),
        ) else {
            return;
        };
        if arguments.kind() != "argument_list" {
            return;
        }
        let callee_name = python_callee_name(self.file, function);

        let mut param_index = 0u32;
        for arg in operands(arguments) {
            match arg.kind() {
                "keyword_argument" => continue,
                "list_splat" | "dictionary_splat" => break,
                _ => {}
            }
            let literal = unwrap_parens(arg);
            if let Some(string_value) = self.string_value(literal) {
                self.out.push(
                    FunctionCallArgument {
                        callee_name: callee_name.clone(),
                        param_index,
                        string_value,
                        location: location_of(self.file, literal),
                    }
                    .into(),
                );
            }
            param_index += 1;
        }
    }

    /// `(variable, literal, operator)` for `name == "lit"` in either order.
    fn equality(&self, node: Node<'_>) -> Option<(String, String, &'static str)> {
        if node.kind() != "comparison_operator" {
            return None;
        }
        let (left, op, right) = binary_comparison(node)?;
        if !matches!(op, "==" | "!=") {
            return None;
        }
        let (left, right) = (unwrap_parens(left), unwrap_parens(right));
        if let Some(value) = self.string_value(right) {
            return Some((python_dotted_name(self.file, left)?, value, op));
        }
        let value = self.string_value(left)?;
        Some((python_dotted_name(self.file, right)?, value, op))
    }

    fn string_value(&self, node: Node<'_>) -> Option<String> {
        if node.kind() != "string" {
            return None;
        }
        python_string_value(self.file.text(node))
    }
}

fn bool_op(node: Node<'_>) -> Option<&'static str> {
    node.child_by_field_name("operator").map(|op| op.kind())
}

/// Operator of the nearest enclosing boolean expression, looking through parens.
fn enclosing_bool_op(node: Node<'_>) -> Option<&'static str> {
    let mut parent = node.parent()?;
    while parent.kind() == "parenthesized_expression" {
        parent = parent.parent()?;
    }
    if parent.kind() == "boolean_operator" {
        bool_op(parent)
    } else {
        None
    }
}

/// Two operands and one operator; chained comparisons (`a < b < c`) are skipped.
fn binary_comparison(node: Node<'_>) -> Option<(Node<'_>, &'static str, Node<'_>)> {
    let mut sides: SmallVec4<Node<'_>> = SmallVec4::new();
    let mut ops: SmallVec4<&'static str> = SmallVec4::new();
    for i in 0..node.child_count() {
        let Some(child) = node.child(i) else { continue };
        if child.is_named() {
            if child.kind() != "comment" {
                sides.push(child);
            }
        } else {
            ops.push(child.kind());
        }
    }
    match (sides.as_slice(), ops.as_slice()) {
        ([left, right], [op]) => Some((*left, *op, *right)),
        _ => None,
    }
}

fn is_type_identity_check(variable: &str, value: &str) -> bool {
    (variable == "__name__" && value == "__main__") || variable.ends_with("__class__.__name__")
}
