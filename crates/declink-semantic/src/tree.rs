//! The immutable semantic declaration tree.
//!
//! A `SemanticTree` is produced once by the frontend (or deserialized from
//! library metadata) and is never mutated afterwards. The lowering core holds
//! it behind an `Arc` and reads it from any number of threads.

use crate::decls::{CallableView, SemClass, SemDecl, SemFunction, SemProperty, SemTypeParameter};
use crate::ids::{SemDeclId, TypeParamRef};
use crate::types::{SemType, SemTypeArg};
use declink_common::{Atom, Interner};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SemanticTree {
    names: Interner,
    decls: Vec<SemDecl>,
    /// Declarations without an owner, in declaration order.
    top_level: Vec<SemDeclId>,
}

impl SemanticTree {
    pub(crate) fn from_parts(names: Interner, decls: Vec<SemDecl>, top_level: Vec<SemDeclId>) -> Self {
        Self {
            names,
            decls,
            top_level,
        }
    }

    pub fn interner(&self) -> &Interner {
        &self.names
    }

    /// Resolve an interned name.
    pub fn name(&self, atom: Atom) -> &str {
        self.names.resolve(atom)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn contains(&self, id: SemDeclId) -> bool {
        id.index() < self.decls.len()
    }

    /// All declaration ids in arena order.
    pub fn ids(&self) -> impl Iterator<Item = SemDeclId> + '_ {
        (0..self.decls.len() as u32).map(SemDeclId)
    }

    pub fn top_level(&self) -> &[SemDeclId] {
        &self.top_level
    }

    pub fn decl(&self, id: SemDeclId) -> Option<&SemDecl> {
        self.decls.get(id.index())
    }

    pub fn class(&self, id: SemDeclId) -> Option<&SemClass> {
        self.decl(id).and_then(SemDecl::as_class)
    }

    pub fn function(&self, id: SemDeclId) -> Option<&SemFunction> {
        self.decl(id).and_then(SemDecl::as_function)
    }

    pub fn property(&self, id: SemDeclId) -> Option<&SemProperty> {
        self.decl(id).and_then(SemDecl::as_property)
    }

    pub fn callable(&self, id: SemDeclId) -> Option<CallableView<'_>> {
        self.decl(id).and_then(|decl| CallableView::of(id, decl))
    }

    /// All classes, nested ones included, in arena order.
    pub fn classes(&self) -> impl Iterator<Item = SemDeclId> + '_ {
        self.ids().filter(|&id| self.class(id).is_some())
    }

    pub fn owner_of(&self, id: SemDeclId) -> Option<SemDeclId> {
        self.decl(id).and_then(SemDecl::owner)
    }

    pub fn decl_name(&self, id: SemDeclId) -> &str {
        self.decl(id).map(|d| self.name(d.name())).unwrap_or("<unknown>")
    }

    /// `Outer.Inner.member` style name used in diagnostics and dumps.
    pub fn qualified_name(&self, id: SemDeclId) -> String {
        let mut parts = vec![self.decl_name(id)];
        let mut current = self.owner_of(id);
        // Owners form a tree; the bound only guards against malformed input.
        let mut remaining = self.decls.len();
        while let Some(owner) = current {
            if remaining == 0 {
                break;
            }
            remaining -= 1;
            parts.push(self.decl_name(owner));
            current = self.owner_of(owner);
        }
        parts.reverse();
        parts.join(".")
    }

    pub fn type_params_of(&self, id: SemDeclId) -> &[SemTypeParameter] {
        self.decl(id).map(SemDecl::type_params).unwrap_or(&[])
    }

    pub fn type_parameter(&self, param: TypeParamRef) -> Option<&SemTypeParameter> {
        self.type_params_of(param.owner).get(param.index as usize)
    }

    /// Type parameters of `owner` as type references, in order.
    pub fn type_param_refs(&self, owner: SemDeclId) -> impl Iterator<Item = TypeParamRef> + '_ {
        (0..self.type_params_of(owner).len() as u32).map(move |index| TypeParamRef::new(owner, index))
    }

    /// The type of `this` inside `class`: the class applied to its own
    /// type parameters.
    pub fn this_type(&self, class: SemDeclId) -> SemType {
        SemType::class_with(
            class,
            self.type_param_refs(class)
                .map(|param| SemTypeArg::invariant(SemType::param(param)))
                .collect(),
        )
    }

    /// First class with the given simple name, searching all classes.
    pub fn find_class(&self, name: &str) -> Option<SemDeclId> {
        let atom = self.names.lookup(name)?;
        self.classes()
            .find(|&id| self.class(id).is_some_and(|c| c.name == atom))
    }

    /// First member of `class` with the given simple name.
    pub fn find_member(&self, class: SemDeclId, name: &str) -> Option<SemDeclId> {
        let atom = self.names.lookup(name)?;
        self.class(class)?
            .members
            .iter()
            .copied()
            .find(|&m| self.decl(m).is_some_and(|d| d.name() == atom))
    }
}

#[cfg(test)]
#[path = "../tests/tree_tests.rs"]
mod tests;
