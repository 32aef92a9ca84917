//! TypeScript / JavaScript extractor. One grammar family covers `.ts`,
//! `.tsx`, and plain JavaScript files.

use stringly_core::types::collections::SmallVec8;
use stringly_core::types::{
    Comparison, ComparisonOperator, FunctionCallArgument, PatternInstance, ValidationKind,
    ValidationPattern, ValueSet,
};
use stringly_core::FxHashSet;
use tree_sitter::Node;

use super::literals::js_string_value;
use super::names::{js_callee_name, js_dotted_name};
use super::{location_of, operands, PatternExtractor};
use crate::parsers::{walk_named, ParsedFile};
use crate::scanner::Language;

pub struct TypeScriptExtractor;

impl PatternExtractor for TypeScriptExtractor {
    fn languages(&self) -> &'static [Language] {
        &[Language::TypeScript, Language::JavaScript]
    }

    fn find_patterns(&self, file: &ParsedFile) -> Vec<PatternInstance> {
        let mut visitor = Visitor {
            file,
            out: Vec::new(),
            consumed: FxHashSet::default(),
        };
        walk_named(file.root(), |node| match node.kind() {
            "binary_expression" => visitor.binary(node),
            "call_expression" => visitor.call(node),
            "new_expression" => visitor.constructor_call(node),
            _ => {}
        });
        visitor.out
    }
}

struct Visitor<'f> {
    file: &'f ParsedFile,
    out: Vec<PatternInstance>,
    consumed: FxHashSet<usize>,
}

impl Visitor<'_> {
    fn binary(&mut self, node: Node<'_>) {
        match binary_op(node) {
            Some(op @ ("||" | "&&")) => self.boolean_chain(node, op),
            Some("===" | "==" | "!==" | "!=") => self.comparison(node),
            _ => {}
        }
    }

    /// `x === "a" || x === "b"`, and the negated `x !== "a" && x !== "b"`.
    fn boolean_chain(&mut self, node: Node<'_>, op: &'static str) {
        if enclosing_binary_op(node) == Some(op) {
            return;
        }
        let negated = op == "&&";

        let mut terms: SmallVec8<Node<'_>> = SmallVec8::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let current = unwrap_expression(current);
            if current.kind() == "binary_expression" && binary_op(current) == Some(op) {
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
            if (operator == ComparisonOperator::Ne) != negated {
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
        if self.consumed.contains(&node.id()) {
            return;
        }
        let Some((variable_name, compared_value, operator)) = self.equality(node) else {
            return;
        };
        if variable_name.ends_with("constructor.name") {
            return;
        }
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

    fn call(&mut self, node: Node<'_>) {
        let Some(function) = node.child_by_field_name("function") else {
            return;
        };
        self.membership(node, function);

        let Some(arguments) = node.child_by_field_name("arguments") else {
            return;
        };
        if arguments.kind() != "arguments" {
            return;
        }
        let callee_name = js_callee_name(self.file, function);
        self.arguments(&callee_name, arguments);
    }

    /// `new Foo("a")` records its arguments against the constructor name.
    fn constructor_call(&mut self, node: Node<'_>) {
        let (Some(constructor), Some(arguments)) = (
            node.child_by_field_name("constructor"),
            node.child_by_field_name("arguments"),
        ) else {
            return;
        };
        let callee_name = js_callee_name(self.file, constructor);
        self.arguments(&callee_name, arguments);
    }

    fn arguments(&mut self, callee_name: &str, arguments: Node<'_>) {
        let mut param_index = 0u32;
        for arg in operands(arguments) {
            if arg.kind() == "spread_element" {
                break;
            }
            let literal = unwrap_expression(arg);
            if let Some(string_value) = self.string_value(literal) {
                self.out.push(
                    FunctionCallArgument {
                        callee_name: callee_name.to_string(),
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

    /// `["a", "b"].includes(x)` and `new Set(["a", "b"]).has(x)`.
    fn membership(&mut self, node: Node<'_>, function: Node<'_>) {
        if function.kind() != "member_expression" {
            return;
        }
        let (Some(object), Some(property)) = (
            function.child_by_field_name("object"),
            function.child_by_field_name("property"),
        ) else {
            return;
        };
        let object = unwrap_expression(object);
        let array = match (self.file.text(property), object.kind()) {
            ("includes", "array") => Some(object),
            ("has", "new_expression") => self.set_literal(object),
            _ => None,
        };
        let Some(array) = array else { return };

        let mut values = ValueSet::new();
        for element in operands(array) {
            let Some(value) = self.string_value(unwrap_expression(element)) else {
                return;
            };
            values.insert(value);
        }
        if values.len() < 2 {
            return;
        }

        let variable = node
            .child_by_field_name("arguments")
            .and_then(|args| operands(args).next())
            .and_then(|arg| js_dotted_name(self.file, unwrap_expression(arg)));
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

    /// The array literal inside `new Set([...])`.
    fn set_literal<'t>(&self, node: Node<'t>) -> Option<Node<'t>> {
        let constructor = node.child_by_field_name("constructor")?;
        if self.file.text(constructor) != "Set" {
            return None;
        }
        let args = node.child_by_field_name("arguments")?;
        let mut args = operands(args);
        let first = unwrap_expression(args.next()?);
        (first.kind() == "array" && args.next().is_none()).then_some(first)
    }

    /// `(variable, literal, operator)` for `name === "lit"` in either order.
    fn equality(&self, node: Node<'_>) -> Option<(String, String, ComparisonOperator)> {
        if node.kind() != "binary_expression" {
            return None;
        }
        let operator = match binary_op(node)? {
            "===" | "==" => ComparisonOperator::Eq,
            "!==" | "!=" => ComparisonOperator::Ne,
            _ => return None,
        };
        let left = unwrap_expression(node.child_by_field_name("left")?);
        let right = unwrap_expression(node.child_by_field_name("right")?);
        if is_typeof(left) || is_typeof(right) {
            return None;
        }
        if left.kind() == "template_string" || right.kind() == "template_string" {
            return None;
        }
        if let Some(value) = self.string_value(right) {
            return Some((js_dotted_name(self.file, left)?, value, operator));
        }
        let value = self.string_value(left)?;
        Some((js_dotted_name(self.file, right)?, value, operator))
    }

    fn string_value(&self, node: Node<'_>) -> Option<String> {
        if node.kind() != "string" {
            return None;
        }
        js_string_value(self.file.text(node))
    }
}

fn binary_op(node: Node<'_>) -> Option<&'static str> {
    node.child_by_field_name("operator").map(|op| op.kind())
}

fn enclosing_binary_op(node: Node<'_>) -> Option<&'static str> {
    let mut parent = node.parent()?;
    while parent.kind() == "parenthesized_expression" {
        parent = parent.parent()?;
    }
    if parent.kind() == "binary_expression" {
        binary_op(parent)
    } else {
        None
    }
}

/// Look through parentheses and type-only wrappers (`x as T`, `x!`).
fn unwrap_expression(mut node: Node<'_>) -> Node<'_> {
    while matches!(
        node.kind(),
        "parenthesized_expression" | "as_expression" | "satisfies_expression" | "non_null_expression"
    ) {
        match node.named_child(0) {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

fn is_typeof(node: Node<'_>) -> bool {
    node.kind() == "unary_expression"
        && node
            .child_by_field_name("operator")
            .is_some_and(|op| op.kind() == "typeof")
}
