//! Type-parameter substitution over semantic types.
//!
//! Inherited members are expressed in terms of their declaring class's type
//! parameters. Before a member is lowered into a subclass its types are
//! rewritten through the substitution accumulated along the supertype path,
//! so `Box<T>.get(): T` seen from `StringBox : Box<String>` yields `String`.

use declink_common::limits;
use declink_semantic::{SemDeclId, SemType, SemTypeArg, SemanticTree, TypeParamRef, Variance};
use rustc_hash::FxHashMap;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitution {
    map: FxHashMap<TypeParamRef, SemTypeArg>,
}

impl Substitution {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn is_identity(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, param: TypeParamRef) -> Option<&SemTypeArg> {
        self.map.get(&param)
    }

    pub fn insert(&mut self, param: TypeParamRef, arg: SemTypeArg) {
        self.map.insert(param, arg);
    }

    /// Substitution that maps the parameters of `supertype`'s class onto the
    /// arguments given in `supertype`. Missing arguments are left unmapped.
    pub fn for_supertype(tree: &SemanticTree, supertype: &SemType) -> Self {
        let mut subst = Self::identity();
        if let SemType::Class { class, args, .. } = supertype {
            for (param, arg) in tree.type_param_refs(*class).zip(args) {
                subst.insert(param, arg.clone());
            }
        }
        subst
    }

    /// `self ∘ inner`: apply `inner` first, then `self`.
    ///
    /// Used to extend a path `C → S` (self) with `S → A` (inner) into
    /// `C → A`.
    pub fn compose(&self, tree: &SemanticTree, inner: &Substitution) -> Substitution {
        let mut map = FxHashMap::default();
        for (param, arg) in &inner.map {
            map.insert(*param, self.apply_arg(tree, arg));
        }
        for (param, arg) in &self.map {
            map.entry(*param).or_insert_with(|| arg.clone());
        }
        Substitution { map }
    }

    pub fn apply(&self, tree: &SemanticTree, ty: &SemType) -> SemType {
        if self.is_identity() {
            return ty.clone();
        }
        stacker::maybe_grow(limits::STACK_RED_ZONE, limits::STACK_GROWTH_SIZE, || {
            self.apply_inner(tree, ty)
        })
    }

    fn apply_inner(&self, tree: &SemanticTree, ty: &SemType) -> SemType {
        match ty {
            SemType::Class {
                class,
                args,
                nullable,
            } => SemType::Class {
                class: *class,
                args: args.iter().map(|arg| self.apply_arg(tree, arg)).collect(),
                nullable: *nullable,
            },
            SemType::TypeParameter { param, nullable } => match self.map.get(param) {
                None => ty.clone(),
                Some(SemTypeArg::Type { ty: replacement, .. }) => {
                    let nullable = *nullable || replacement.is_nullable();
                    replacement.clone().with_nullability(nullable)
                }
                Some(SemTypeArg::Star) => star_approximation(tree, *param),
            },
            SemType::Error => SemType::Error,
        }
    }

    fn apply_arg(&self, tree: &SemanticTree, arg: &SemTypeArg) -> SemTypeArg {
        match arg {
            SemTypeArg::Star => SemTypeArg::Star,
            SemTypeArg::Type { variance, ty } => {
                // A bare parameter argument takes the projection of what it
                // is replaced with: `Box<T>` under `T := out String`.
                if let SemType::TypeParameter { param, nullable } = ty {
                    match self.map.get(param) {
                        Some(SemTypeArg::Star) => return SemTypeArg::Star,
                        Some(SemTypeArg::Type {
                            variance: inner,
                            ty: replacement,
                        }) => {
                            let variance = if *variance == Variance::Invariant {
                                *inner
                            } else {
                                *variance
                            };
                            let nullable = *nullable || replacement.is_nullable();
                            return SemTypeArg::Type {
                                variance,
                                ty: replacement.clone().with_nullability(nullable),
                            };
                        }
                        None => {}
                    }
                }
                SemTypeArg::Type {
                    variance: *variance,
                    ty: self.apply(tree, ty),
                }
            }
        }
    }
}

/// What a star-projected parameter reads as: its first bound, or nullable
/// `Any` when it has none.
fn star_approximation(tree: &SemanticTree, param: TypeParamRef) -> SemType {
    let bound = tree
        .type_parameter(param)
        .and_then(|p| p.bounds.first())
        .filter(|b| b.type_parameter().is_none());
    match bound {
        Some(bound) => bound.clone().nullable(),
        None => match tree.find_class("Any") {
            Some(any) => SemType::simple(any).nullable(),
            None => SemType::Error,
        },
    }
}

/// Substitution mapping `ancestor`'s parameters into `class`, following the
/// first path in supertype declaration order. `None` when `ancestor` is not
/// reachable. Identity when `class == ancestor`.
///
/// The caller guarantees the hierarchy below `class` is acyclic.
pub fn supertype_substitution(
    tree: &SemanticTree,
    class: SemDeclId,
    ancestor: SemDeclId,
    max_depth: usize,
) -> Option<Substitution> {
    if class == ancestor {
        return Some(Substitution::identity());
    }
    if max_depth == 0 {
        return None;
    }
    let supertypes = &tree.class(class)?.supertypes;
    for supertype in supertypes {
        let Some(super_class) = supertype.class_id() else {
            continue;
        };
        if let Some(rest) = supertype_substitution(tree, super_class, ancestor, max_depth - 1) {
            let step = Substitution::for_supertype(tree, supertype);
            return Some(step.compose(tree, &rest));
        }
    }
    None
}

#[cfg(test)]
#[path = "../tests/substitution_tests.rs"]
mod tests;
