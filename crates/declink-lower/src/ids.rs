//! Identifiers owned by the lowering session.

use declink_semantic::SemDeclId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a linkable declaration within one session.
///
/// Allocated sequentially by the declaration storage; id 0 is never handed
/// out.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkDeclId(pub u32);

impl LinkDeclId {
    pub const FIRST_VALID: u32 = 1;
}

impl fmt::Display for LinkDeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Identity of a type parameter, allocated by the classifier cache when its
/// owning declaration is registered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeParameterId(pub u32);

impl fmt::Display for TypeParameterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Storage key: a semantic declaration seen from an owning class context.
///
/// Keys are normalized before use: `context` is the declaration's own owner
/// unless the declaration is inherited into a subclass as a fake override.
/// Top-level declarations have no context.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclKey {
    pub decl: SemDeclId,
    pub context: Option<SemDeclId>,
}

impl DeclKey {
    pub const fn new(decl: SemDeclId, context: Option<SemDeclId>) -> Self {
        Self { decl, context }
    }
}

impl fmt::Display for DeclKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.context {
            Some(context) => write!(f, "{}@{}", self.decl, context),
            None => write!(f, "{}", self.decl),
        }
    }
}
