//! Identifiers into the semantic tree arena.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a declaration in a [`SemanticTree`](crate::SemanticTree).
///
/// Semantic declarations reference each other (members, supertypes, type
/// parameter owners) only through these ids, so self-referential and
/// mutually recursive declarations need no shared ownership.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SemDeclId(pub u32);

impl SemDeclId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SemDeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Reference to the `index`-th type parameter declared by `owner`.
///
/// A type parameter's bounds may mention the parameter itself
/// (`T : Comparable<T>`); the reference is by position, never by value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeParamRef {
    pub owner: SemDeclId,
    pub index: u32,
}

impl TypeParamRef {
    #[inline]
    pub const fn new(owner: SemDeclId, index: u32) -> Self {
        Self { owner, index }
    }
}

impl fmt::Display for TypeParamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.owner, self.index)
    }
}
