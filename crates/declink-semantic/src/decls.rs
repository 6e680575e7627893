//! Semantic declarations: classes, functions and properties.
//!
//! Functions and properties are both "callables" for the purposes of
//! lowering. [`CallableView`] gives the override machinery one uniform
//! signature shape for either kind.

use crate::ids::SemDeclId;
use crate::types::SemType;
use declink_common::Atom;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Where a declaration came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclOrigin {
    /// Written by the user in the current compilation unit.
    #[default]
    Source,
    /// Generated by the frontend (data class members, enum entries, ...).
    FrontendSynthetic,
    /// Loaded from a previously compiled library.
    Library,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Modality {
    #[default]
    Final,
    Open,
    Abstract,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Object,
    /// A holder of static members only (file facades, Java utility
    /// classes). It has no `this` receiver.
    StaticContainer,
}

impl ClassKind {
    pub fn has_this_receiver(self) -> bool {
        !matches!(self, ClassKind::StaticContainer)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclKind {
    Class,
    Function,
    Property,
}

/// Kinds that participate in override resolution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallableKind {
    Function,
    Property,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConstValue {
    Null,
    Bool(bool),
    Int(i64),
    String(Arc<str>),
}

/// A resolved reference as it appears in a default-value expression.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SemSymbol {
    /// The `index`-th value parameter of callable `owner`.
    ValueParameter { owner: SemDeclId, index: u32 },
    /// A property or function declaration.
    Declaration(SemDeclId),
}

/// Default-value expression of a value parameter, already resolved.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SemExpr {
    Const(ConstValue),
    Ref(SemSymbol),
    Call {
        callee: SemDeclId,
        #[serde(default)]
        args: Vec<SemExpr>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemAnnotation {
    /// The annotation class.
    pub class: SemDeclId,
    #[serde(default)]
    pub args: Vec<(Atom, ConstValue)>,
}

/// Provenance of a declaration loaded from another module.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerSource {
    pub module: Atom,
    #[serde(default)]
    pub facade: Option<Atom>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemTypeParameter {
    pub name: Atom,
    /// Resolved upper bounds. May refer back to this very parameter.
    #[serde(default)]
    pub bounds: Vec<SemType>,
    #[serde(default)]
    pub reified: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemValueParameter {
    pub name: Atom,
    pub ty: SemType,
    #[serde(default)]
    pub default: Option<SemExpr>,
    #[serde(default)]
    pub is_vararg: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemClass {
    pub name: Atom,
    /// Enclosing class for nested classes.
    #[serde(default)]
    pub outer: Option<SemDeclId>,
    #[serde(default)]
    pub kind: ClassKind,
    #[serde(default)]
    pub type_params: Vec<SemTypeParameter>,
    /// Direct supertypes in declaration order, expressed in terms of this
    /// class's own type parameters.
    #[serde(default)]
    pub supertypes: Vec<SemType>,
    /// Explicitly declared members in declaration order.
    #[serde(default)]
    pub members: Vec<SemDeclId>,
    #[serde(default)]
    pub annotations: Vec<SemAnnotation>,
    #[serde(default)]
    pub modality: Modality,
    #[serde(default)]
    pub origin: DeclOrigin,
    #[serde(default)]
    pub container_source: Option<ContainerSource>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemFunction {
    pub name: Atom,
    #[serde(default)]
    pub owner: Option<SemDeclId>,
    #[serde(default)]
    pub type_params: Vec<SemTypeParameter>,
    #[serde(default)]
    pub value_params: Vec<SemValueParameter>,
    #[serde(default)]
    pub receiver: Option<SemType>,
    #[serde(default)]
    pub context_receivers: Vec<SemType>,
    pub return_type: SemType,
    #[serde(default)]
    pub annotations: Vec<SemAnnotation>,
    /// Explicit override hints from the frontend. Empty means "compute all".
    #[serde(default)]
    pub overridden: Vec<SemDeclId>,
    #[serde(default)]
    pub modality: Modality,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub origin: DeclOrigin,
    /// The function this one was renamed or bridged from.
    #[serde(default)]
    pub initial_signature: Option<SemDeclId>,
    #[serde(default)]
    pub container_source: Option<ContainerSource>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemProperty {
    pub name: Atom,
    #[serde(default)]
    pub owner: Option<SemDeclId>,
    #[serde(default)]
    pub type_params: Vec<SemTypeParameter>,
    #[serde(default)]
    pub receiver: Option<SemType>,
    #[serde(default)]
    pub context_receivers: Vec<SemType>,
    pub ty: SemType,
    #[serde(default)]
    pub is_var: bool,
    #[serde(default)]
    pub annotations: Vec<SemAnnotation>,
    #[serde(default)]
    pub overridden: Vec<SemDeclId>,
    #[serde(default)]
    pub modality: Modality,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub origin: DeclOrigin,
    #[serde(default)]
    pub container_source: Option<ContainerSource>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decl", rename_all = "camelCase")]
pub enum SemDecl {
    Class(SemClass),
    Function(SemFunction),
    Property(SemProperty),
}

impl SemDecl {
    pub fn kind(&self) -> DeclKind {
        match self {
            SemDecl::Class(_) => DeclKind::Class,
            SemDecl::Function(_) => DeclKind::Function,
            SemDecl::Property(_) => DeclKind::Property,
        }
    }

    pub fn name(&self) -> Atom {
        match self {
            SemDecl::Class(c) => c.name,
            SemDecl::Function(f) => f.name,
            SemDecl::Property(p) => p.name,
        }
    }

    /// The class that declares this declaration, if any.
    pub fn owner(&self) -> Option<SemDeclId> {
        match self {
            SemDecl::Class(c) => c.outer,
            SemDecl::Function(f) => f.owner,
            SemDecl::Property(p) => p.owner,
        }
    }

    pub fn type_params(&self) -> &[SemTypeParameter] {
        match self {
            SemDecl::Class(c) => &c.type_params,
            SemDecl::Function(f) => &f.type_params,
            SemDecl::Property(p) => &p.type_params,
        }
    }

    pub fn annotations(&self) -> &[SemAnnotation] {
        match self {
            SemDecl::Class(c) => &c.annotations,
            SemDecl::Function(f) => &f.annotations,
            SemDecl::Property(p) => &p.annotations,
        }
    }

    pub fn origin(&self) -> DeclOrigin {
        match self {
            SemDecl::Class(c) => c.origin,
            SemDecl::Function(f) => f.origin,
            SemDecl::Property(p) => p.origin,
        }
    }

    pub fn container_source(&self) -> Option<&ContainerSource> {
        match self {
            SemDecl::Class(c) => c.container_source.as_ref(),
            SemDecl::Function(f) => f.container_source.as_ref(),
            SemDecl::Property(p) => p.container_source.as_ref(),
        }
    }

    pub fn as_class(&self) -> Option<&SemClass> {
        match self {
            SemDecl::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&SemFunction> {
        match self {
            SemDecl::Function(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_property(&self) -> Option<&SemProperty> {
        match self {
            SemDecl::Property(p) => Some(p),
            _ => None,
        }
    }
}

/// Uniform view of a function or property signature.
///
/// For properties `value_params` is empty and `return_type` is the
/// property type.
#[derive(Clone, Copy, Debug)]
pub struct CallableView<'a> {
    pub id: SemDeclId,
    pub kind: CallableKind,
    pub name: Atom,
    pub owner: Option<SemDeclId>,
    pub type_params: &'a [SemTypeParameter],
    pub value_params: &'a [SemValueParameter],
    pub receiver: Option<&'a SemType>,
    pub context_receivers: &'a [SemType],
    pub return_type: &'a SemType,
    pub annotations: &'a [SemAnnotation],
    pub overridden: &'a [SemDeclId],
    pub modality: Modality,
    pub is_static: bool,
    pub origin: DeclOrigin,
}

impl<'a> CallableView<'a> {
    pub(crate) fn of(id: SemDeclId, decl: &'a SemDecl) -> Option<Self> {
        match decl {
            SemDecl::Class(_) => None,
            SemDecl::Function(f) => Some(CallableView {
                id,
                kind: CallableKind::Function,
                name: f.name,
                owner: f.owner,
                type_params: &f.type_params,
                value_params: &f.value_params,
                receiver: f.receiver.as_ref(),
                context_receivers: &f.context_receivers,
                return_type: &f.return_type,
                annotations: &f.annotations,
                overridden: &f.overridden,
                modality: f.modality,
                is_static: f.is_static,
                origin: f.origin,
            }),
            SemDecl::Property(p) => Some(CallableView {
                id,
                kind: CallableKind::Property,
                name: p.name,
                owner: p.owner,
                type_params: &p.type_params,
                value_params: &[],
                receiver: p.receiver.as_ref(),
                context_receivers: &p.context_receivers,
                return_type: &p.ty,
                annotations: &p.annotations,
                overridden: &p.overridden,
                modality: p.modality,
                is_static: p.is_static,
                origin: p.origin,
            }),
        }
    }

    pub fn is_abstract(&self) -> bool {
        self.modality == Modality::Abstract
    }
}
