//! Erased signature keys for override matching.
//!
//! Two callables override-match when they agree on name, kind, receiver
//! shape, context receiver count, type parameter count and the erased types
//! of their value parameters, after both have been expressed in the same
//! class through [`Substitution`].

use crate::substitution::Substitution;
use declink_common::{Atom, limits};
use declink_semantic::{CallableKind, CallableView, SemDeclId, SemType, SemanticTree, TypeParamRef};
use smallvec::SmallVec;

/// A parameter type reduced to its class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErasedType {
    Class(SemDeclId),
    /// Unbounded type parameter, or a bound chain that could not be followed.
    Top,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ErasedParam {
    pub ty: ErasedType,
    pub is_vararg: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SignatureKey {
    pub name: Atom,
    pub kind: CallableKind,
    pub receiver: Option<ErasedType>,
    pub context_receivers: u32,
    pub params: SmallVec<[ErasedParam; 4]>,
    pub type_params: u32,
}

/// Compute the key of `callable` after rewriting its types with `subst`.
pub fn signature_key(tree: &SemanticTree, callable: &CallableView<'_>, subst: &Substitution) -> SignatureKey {
    let erase = |ty: &SemType| erase_with(tree, subst, &subst.apply(tree, ty));
    SignatureKey {
        name: callable.name,
        kind: callable.kind,
        receiver: callable.receiver.map(erase),
        context_receivers: callable.context_receivers.len() as u32,
        params: callable
            .value_params
            .iter()
            .map(|p| ErasedParam {
                ty: erase(&p.ty),
                is_vararg: p.is_vararg,
            })
            .collect(),
        type_params: callable.type_params.len() as u32,
    }
}

/// Reduce a type to its class; type parameters erase to the class of their
/// first bound.
pub fn erase(tree: &SemanticTree, ty: &SemType) -> ErasedType {
    erase_with(tree, &Substitution::identity(), ty)
}

/// Like [`erase`], with bounds read through `subst` so a bound naming an
/// ancestor's parameter erases the way the subclass sees it.
fn erase_with(tree: &SemanticTree, subst: &Substitution, ty: &SemType) -> ErasedType {
    let mut param = match ty {
        SemType::Class { class, .. } => return ErasedType::Class(*class),
        SemType::TypeParameter { param, .. } => *param,
        SemType::Error => return ErasedType::Error,
    };
    for _ in 0..limits::MAX_BOUND_CHASE_DEPTH {
        let Some(bound) = first_bound(tree, param) else {
            return ErasedType::Top;
        };
        match subst.apply(tree, bound) {
            SemType::Class { class, .. } => return ErasedType::Class(class),
            SemType::TypeParameter { param: next, .. } => param = next,
            SemType::Error => return ErasedType::Error,
        }
    }
    ErasedType::Top
}

fn first_bound(tree: &SemanticTree, param: TypeParamRef) -> Option<&SemType> {
    tree.type_parameter(param).and_then(|p| p.bounds.first())
}

#[cfg(test)]
#[path = "../tests/signature_tests.rs"]
mod tests;
