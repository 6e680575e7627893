//! Class hierarchy queries over the semantic tree.
//!
//! Frontends reject cyclic hierarchies before lowering, but the lowering core
//! still checks: a cycle would otherwise recurse without bound while scopes
//! are computed.

use crate::error::{LoweringError, LoweringResult};
use crate::substitution::{Substitution, supertype_substitution};
use declink_common::limits;
use declink_semantic::{SemDeclId, SemType, SemTypeArg, SemanticTree, Variance};
use rustc_hash::FxHashSet;

/// Verify that the supertype graph reachable from `class` is acyclic and no
/// deeper than `max_depth`.
pub fn check_acyclic(tree: &SemanticTree, class: SemDeclId, max_depth: usize) -> LoweringResult<()> {
    let mut path = Vec::new();
    let mut done = FxHashSet::default();
    visit(tree, class, max_depth, &mut path, &mut done)
}

fn visit(
    tree: &SemanticTree,
    class: SemDeclId,
    max_depth: usize,
    path: &mut Vec<SemDeclId>,
    done: &mut FxHashSet<SemDeclId>,
) -> LoweringResult<()> {
    if done.contains(&class) {
        return Ok(());
    }
    if path.contains(&class) {
        return Err(LoweringError::CyclicSupertypes(class));
    }
    if path.len() >= max_depth {
        return Err(LoweringError::HierarchyTooDeep {
            class: path.first().copied().unwrap_or(class),
            limit: max_depth,
        });
    }
    let Some(sem_class) = tree.class(class) else {
        return Err(LoweringError::NotAClass(class));
    };
    path.push(class);
    for supertype in &sem_class.supertypes {
        if let Some(super_class) = supertype.class_id() {
            visit(tree, super_class, max_depth, path, done)?;
        }
    }
    path.pop();
    done.insert(class);
    Ok(())
}

/// Direct supertype classes of `class`, in declaration order.
pub fn direct_supertypes(tree: &SemanticTree, class: SemDeclId) -> impl Iterator<Item = (SemDeclId, &SemType)> {
    tree.class(class)
        .into_iter()
        .flat_map(|c| c.supertypes.iter())
        .filter_map(|ty| ty.class_id().map(|id| (id, ty)))
}

/// `true` if `ancestor` is reachable from `class` through supertypes, or is
/// `class` itself.
pub fn is_subclass(tree: &SemanticTree, class: SemDeclId, ancestor: SemDeclId) -> bool {
    if class == ancestor {
        return true;
    }
    let mut stack = vec![class];
    let mut seen = FxHashSet::default();
    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        for (super_class, _) in direct_supertypes(tree, current) {
            if super_class == ancestor {
                return true;
            }
            stack.push(super_class);
        }
    }
    false
}

pub fn is_proper_subclass(tree: &SemanticTree, class: SemDeclId, ancestor: SemDeclId) -> bool {
    class != ancestor && is_subclass(tree, class, ancestor)
}

/// Structural subtype check used to pick the most specific inherited member.
///
/// Class types are compared by walking `sub` up to `sup`'s class and
/// comparing arguments under their declared projection. Type parameters are
/// subtypes of their bounds. Error types are only related to themselves.
pub fn is_subtype(tree: &SemanticTree, sub: &SemType, sup: &SemType) -> bool {
    is_subtype_at(tree, sub, sup, 0)
}

fn is_subtype_at(tree: &SemanticTree, sub: &SemType, sup: &SemType, depth: usize) -> bool {
    if depth > limits::MAX_SUBTYPE_DEPTH {
        return false;
    }
    if sub == sup {
        return true;
    }
    if sub.is_nullable() && !sup.is_nullable() {
        return false;
    }
    match (sub, sup) {
        (SemType::Error, _) | (_, SemType::Error) => false,
        (SemType::TypeParameter { param: a, .. }, SemType::TypeParameter { param: b, .. }) if a == b => true,
        (SemType::TypeParameter { param, .. }, _) => tree.type_parameter(*param).is_some_and(|p| {
            p.bounds
                .iter()
                .any(|bound| is_subtype_at(tree, bound, sup, depth + 1))
        }),
        (SemType::Class { .. }, SemType::TypeParameter { .. }) => false,
        (
            SemType::Class { class: sub_class, .. },
            SemType::Class {
                class: sup_class,
                args: sup_args,
                ..
            },
        ) => {
            let Some(path) =
                supertype_substitution(tree, *sub_class, *sup_class, limits::MAX_HIERARCHY_DEPTH)
            else {
                return false;
            };
            // Re-express `sup_class`'s own parameters in terms of `sub`.
            let lifted = path.apply(tree, &tree.this_type(*sup_class));
            let lifted = Substitution::for_supertype(tree, sub).apply(tree, &lifted);
            let SemType::Class { args: sub_args, .. } = lifted else {
                return false;
            };
            sub_args.len() == sup_args.len()
                && sub_args
                    .iter()
                    .zip(sup_args)
                    .all(|(a, b)| arg_contained(tree, a, b, depth + 1))
        }
    }
}

fn arg_contained(tree: &SemanticTree, sub: &SemTypeArg, sup: &SemTypeArg, depth: usize) -> bool {
    match (sub, sup) {
        (_, SemTypeArg::Star) => true,
        (SemTypeArg::Star, SemTypeArg::Type { .. }) => false,
        (SemTypeArg::Type { ty: a, variance: va }, SemTypeArg::Type { ty: b, variance: vb }) => {
            match vb {
                Variance::Out => *va != Variance::In && is_subtype_at(tree, a, b, depth),
                Variance::In => *va != Variance::Out && is_subtype_at(tree, b, a, depth),
                Variance::Invariant => va == vb && a == b,
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/hierarchy_tests.rs"]
mod tests;
