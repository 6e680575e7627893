//! Invariant violations raised while lowering.
//!
//! Every variant is fatal for the current compilation unit. Recoverable
//! problems (override conflicts) are diagnostics, not errors.

use crate::ids::{LinkDeclId, TypeParameterId};
use declink_semantic::{SemDeclId, TypeParamRef};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LoweringError {
    #[error("semantic declaration {0} does not exist")]
    UnknownDeclaration(SemDeclId),

    #[error("cannot determine the owning class of {decl} in context {context:?}")]
    UnresolvableOwner {
        decl: SemDeclId,
        context: Option<SemDeclId>,
    },

    #[error("{0} is not a class")]
    NotAClass(SemDeclId),

    #[error("classifier {decl} is not registered")]
    ClassifierNotRegistered { decl: SemDeclId },

    #[error("type parameter {0} does not exist")]
    UnknownTypeParameter(TypeParamRef),

    #[error("type parameter {0} was never registered")]
    UnknownTypeParameterId(TypeParameterId),

    #[error("value parameter {index} of {owner} is not in scope")]
    UnboundValueParameter { owner: SemDeclId, index: u32 },

    #[error("cyclic supertypes through {0}")]
    CyclicSupertypes(SemDeclId),

    #[error("supertype chain of {class} is deeper than {limit}")]
    HierarchyTooDeep { class: SemDeclId, limit: usize },

    #[error("cyclic evaluation of `{field}` on {decl}")]
    CyclicEvaluation {
        decl: LinkDeclId,
        field: &'static str,
    },

    #[error("unsupported operation on {decl}: {operation}")]
    UnsupportedOperation {
        decl: LinkDeclId,
        operation: &'static str,
    },

    #[error("linkable declaration {0} does not exist")]
    UnknownLinkDecl(LinkDeclId),
}

pub type LoweringResult<T> = Result<T, LoweringError>;
