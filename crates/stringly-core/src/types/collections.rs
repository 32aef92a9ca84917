//! Re-exports of performance-oriented collection types.

pub use rustc_hash::{FxHashMap, FxHashSet};
pub use smallvec::SmallVec;
pub use std::collections::{BTreeMap, BTreeSet};

/// SmallVec for operand lists of a single boolean chain (usually <4).
pub type SmallVec4<T> = SmallVec<[T; 4]>;

/// SmallVec for dotted name segments (usually <8).
pub type SmallVec8<T> = SmallVec<[T; 8]>;
