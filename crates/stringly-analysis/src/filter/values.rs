//! Value shapes that never make a meaningful enum on their own.

use std::sync::LazyLock;

use regex::RegexSet;
use stringly_core::types::ValueSet;

/// `(shape, pattern)` pairs. A group is exempt only when every value
/// matches some shape.
pub const VALUE_SHAPES: &[(&str, &str)] = &[
    ("numeric", r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$"),
    ("hex", r"^0[xX][0-9a-fA-F]+$"),
    ("delimiter", r"^[^\w\s]$"),
    ("whitespace", r"^\s*$"),
    ("http_verb", r"^(?i:GET|POST|PUT|PATCH|DELETE|HEAD|OPTIONS|CONNECT|TRACE)$"),
    (
        "strftime",
        r"^[\s\-/:.,T]*%[-_0^#]?[a-zA-Z%](?:%[-_0^#]?[a-zA-Z%]|[\s\-/:.,T])*$",
    ),
    ("cli_flag", r"^-[A-Za-z0-9]$|^--[A-Za-z0-9][\w-]*$"),
    ("file_mode", r"^(?:[rwax][bt]\+?|[rwax]\+[bt]?)$"),
    ("markup", r"^\s*[<\[]"),
];

static SHAPES: LazyLock<Option<RegexSet>> = LazyLock::new(|| {
    match RegexSet::new(VALUE_SHAPES.iter().map(|(_, pattern)| pattern)) {
        Ok(set) => Some(set),
        Err(e) => {
            tracing::warn!(error = %e, "value-shape patterns failed to compile");
            None
        }
    }
});

/// Name of the first shape `value` matches.
pub fn shape_of(value: &str) -> Option<&'static str> {
    let set = SHAPES.as_ref()?;
    let index = set.matches(value).iter().next()?;
    VALUE_SHAPES.get(index).map(|(name, _)| *name)
}

/// True when the set is non-empty and every value has an excluded shape.
pub fn all_excluded(values: &ValueSet) -> bool {
    !values.is_empty() && values.iter().all(|v| shape_of(v).is_some())
}
