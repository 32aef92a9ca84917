//! Fix suggestions: a named enum (Python) or string-literal union (TS/JS).

use stringly_core::types::ValueSet;
use stringly_core::FxHashSet;

use crate::extractors::names::{CALL_PLACEHOLDER, EXPR_PLACEHOLDER};
use crate::scanner::Language;

const FALLBACK_TYPE_NAME: &str = "Value";

/// Suggestion text for replacing `values` with a named type.
pub fn suggestion(language: Option<Language>, type_name: &str, values: &ValueSet) -> String {
    let count = values.len();
    match language {
        Some(Language::Python) => {
            let members = member_names(values)
                .into_iter()
                .zip(values.iter())
                .map(|(member, value)| format!("{member} = {value:?}"))
                .collect::<Vec<_>>()
                .join("; ");
            format!(
                "Define an Enum with {count} members and use it instead of raw strings: \
                 class {type_name}(str, Enum): {members}"
            )
        }
        Some(Language::TypeScript | Language::JavaScript) => {
            let union = values
                .iter()
                .map(|v| format!("{v:?}"))
                .collect::<Vec<_>>()
                .join(" | ");
            format!(
                "Define a string-literal union with {count} members and use it instead of raw \
                 strings: type {type_name} = {union};"
            )
        }
        None => format!("Define a named enum with {count} members: {values}"),
    }
}

/// PascalCase type name from the last segment of a variable or callee,
/// without a leading `set`/`get` verb.
pub fn type_name_hint(dotted: Option<&str>) -> String {
    let Some(last) = dotted.and_then(|d| d.rsplit('.').next()) else {
        return FALLBACK_TYPE_NAME.to_string();
    };
    if last == CALL_PLACEHOLDER || last == EXPR_PLACEHOLDER {
        return FALLBACK_TYPE_NAME.to_string();
    }
    let words = split_words(last);
    let words = match words.first().map(String::as_str) {
        Some("set" | "get" | "is" | "with") if words.len() > 1 => &words[1..],
        _ => &words[..],
    };
    let name: String = words.iter().map(|w| capitalize(w)).collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        FALLBACK_TYPE_NAME.to_string()
    } else {
        name
    }
}

/// UPPER_SNAKE member names, one per value in sorted order, made unique.
fn member_names(values: &ValueSet) -> Vec<String> {
    let mut seen = FxHashSet::default();
    values
        .iter()
        .map(|value| {
            let words = split_words(value);
            let mut name = words
                .iter()
                .map(|w| w.to_ascii_uppercase())
                .collect::<Vec<_>>()
                .join("_");
            if name.is_empty() {
                name = "EMPTY".to_string();
            } else if name.starts_with(|c: char| c.is_ascii_digit()) {
                name.insert(0, '_');
            }
            let base = name.clone();
            let mut n = 2;
            while !seen.insert(name.clone()) {
                name = format!("{base}_{n}");
                n += 1;
            }
            name
        })
        .collect()
}

/// Split on non-alphanumerics and lower→upper case boundaries, lowercased.
fn split_words(s: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in s.chars() {
        if !c.is_ascii_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_ascii_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        current.push(c.to_ascii_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
