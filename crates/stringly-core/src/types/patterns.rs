//! Pattern instances produced by the per-language extractors.
//!
//! `PatternInstance` is a closed sum of the three shapes the engine tracks.
//! Each instance is pinned to exactly one `(file_path, line, column)`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::Xxh3;

/// Precise source position of an instance.
///
/// `line` is 1-indexed (matching the host parser's reporting), `column` is
/// 0-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file_path: String,
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(file_path: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            file_path: file_path.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_path, self.line)
    }
}

/// Normalized set of string literals: deduplicated and sorted.
///
/// Values are kept whole. A literal such as `"SELECT a, b FROM t"` is one
/// member, never three.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueSet(BTreeSet<String>);

impl ValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        self.0.insert(value.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.contains(value)
    }

    /// Values in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Order-independent content hash.
    ///
    /// Each value is length-prefixed before hashing so `{"ab", "c"}` and
    /// `{"a", "bc"}` cannot produce the same byte stream.
    pub fn content_hash(&self) -> i64 {
        let mut hasher = Xxh3::new();
        hasher.update(&(self.0.len() as u64).to_le_bytes());
        for value in &self.0 {
            hasher.update(&(value.len() as u64).to_le_bytes());
            hasher.update(value.as_bytes());
        }
        hasher.digest() as i64
    }

    /// True when this set equals `candidate` after normalization.
    pub fn equals_unordered(&self, candidate: &[String]) -> bool {
        let other: BTreeSet<&str> = candidate.iter().map(String::as_str).collect();
        other.len() == self.0.len() && self.iter().all(|v| other.contains(v))
    }
}

impl<S: Into<String>> FromIterator<S> for ValueSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for ValueSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value:?}")?;
        }
        f.write_str("}")
    }
}

/// How a validation expressed its literal set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    /// `x in {"a", "b"}` or `["a", "b"].includes(x)`.
    Membership,
    /// `x == "a" or x == "b"`.
    EqualityChain,
}

impl ValidationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Membership => "membership",
            Self::EqualityChain => "equality_chain",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "membership" => Some(Self::Membership),
            "equality_chain" => Some(Self::EqualityChain),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    Eq,
    Ne,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "eq" => Some(Self::Eq),
            "ne" => Some(Self::Ne),
            _ => None,
        }
    }
}

/// One check of a variable against a literal set of two or more strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationPattern {
    pub variable_name: Option<String>,
    pub value_set: ValueSet,
    pub value_set_hash: i64,
    pub pattern_type: ValidationKind,
    pub location: SourceLocation,
}

impl ValidationPattern {
    /// Build a validation, deriving `value_set_hash` from `value_set`.
    pub fn new(
        variable_name: Option<String>,
        value_set: ValueSet,
        pattern_type: ValidationKind,
        location: SourceLocation,
    ) -> Self {
        let value_set_hash = value_set.content_hash();
        Self {
            variable_name,
            value_set,
            value_set_hash,
            pattern_type,
            location,
        }
    }
}

/// One `==`/`!=` test of a name or attribute chain against one literal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub variable_name: String,
    pub compared_value: String,
    pub operator: ComparisonOperator,
    pub location: SourceLocation,
}

/// One string literal passed positionally at one call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionCallArgument {
    pub callee_name: String,
    pub param_index: u32,
    pub string_value: String,
    pub location: SourceLocation,
}

/// Discriminant of a `PatternInstance`, used for logging and stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternKind {
    Validation,
    Comparison,
    CallArgument,
}

impl PatternKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Comparison => "comparison",
            Self::CallArgument => "call_argument",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternInstance {
    Validation(ValidationPattern),
    Comparison(Comparison),
    CallArgument(FunctionCallArgument),
}

impl PatternInstance {
    pub fn location(&self) -> &SourceLocation {
        match self {
            Self::Validation(v) => &v.location,
            Self::Comparison(c) => &c.location,
            Self::CallArgument(a) => &a.location,
        }
    }

    pub fn file_path(&self) -> &str {
        &self.location().file_path
    }

    pub fn kind(&self) -> PatternKind {
        match self {
            Self::Validation(_) => PatternKind::Validation,
            Self::Comparison(_) => PatternKind::Comparison,
            Self::CallArgument(_) => PatternKind::CallArgument,
        }
    }
}

impl From<ValidationPattern> for PatternInstance {
    fn from(v: ValidationPattern) -> Self {
        Self::Validation(v)
    }
}

impl From<Comparison> for PatternInstance {
    fn from(c: Comparison) -> Self {
        Self::Comparison(c)
    }
}

impl From<FunctionCallArgument> for PatternInstance {
    fn from(a: FunctionCallArgument) -> Self {
        Self::CallArgument(a)
    }
}
