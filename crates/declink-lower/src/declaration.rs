//! Lazy linkable declarations.
//!
//! A [`LinkDecl`] is created by the declaration storage with only its
//! identity and a few eager attributes filled in. Every other field is a
//! [`LazyField`] evaluated on first read through the owning
//! [`LoweringSession`], under the declaration's own lock.
//!
//! Nodes do not point back at the session; callers pass it in. A node never
//! outlives its session in practice because the session owns the storage
//! that hands nodes out.

use crate::error::{LoweringError, LoweringResult};
use crate::ids::{DeclKey, LinkDeclId, TypeParameterId};
use crate::lazy::{DeclLock, LazyField};
use crate::session::LoweringSession;
use crate::types::LinkType;
use declink_common::Atom;
use declink_semantic::{ConstValue, ContainerSource, DeclOrigin, Modality, SemDeclId};
use serde::Serialize;
use std::sync::Arc;

// =============================================================================
// Field payloads
// =============================================================================

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkDeclKind {
    Class,
    Function,
    Property,
}

/// Where a linkable declaration came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkOrigin {
    Source,
    FrontendSynthetic,
    Library,
    /// Synthesized for an inherited member that the class does not redeclare.
    FakeOverride,
}

impl LinkOrigin {
    pub fn from_semantic(origin: DeclOrigin) -> Self {
        match origin {
            DeclOrigin::Source => LinkOrigin::Source,
            DeclOrigin::FrontendSynthetic => LinkOrigin::FrontendSynthetic,
            DeclOrigin::Library => LinkOrigin::Library,
        }
    }

    /// `false` for anything the user did not write.
    pub fn is_user_written(self) -> bool {
        self == LinkOrigin::Source
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterKind {
    DispatchReceiver,
    ExtensionReceiver,
    Context,
    Regular,
}

/// Default-value expression after lowering: references point at linkable
/// declarations and at parameters of the declaration being materialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkExpr {
    Const(ConstValue),
    /// The `index`-th entry of `owner`'s value parameter list.
    ValueParameter { owner: LinkDeclId, index: u32 },
    Declaration(LinkDeclId),
    Call {
        callee: LinkDeclId,
        args: Vec<LinkExpr>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValueParameter {
    pub name: Atom,
    pub kind: ParameterKind,
    pub ty: LinkType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<LinkExpr>,
    pub is_vararg: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LinkAnnotation {
    pub class: LinkDeclId,
    pub args: Vec<(Atom, ConstValue)>,
}

// =============================================================================
// LinkDecl
// =============================================================================

pub struct LinkDecl {
    pub(crate) id: LinkDeclId,
    pub(crate) key: DeclKey,
    pub(crate) kind: LinkDeclKind,
    pub(crate) name: Atom,
    pub(crate) origin: LinkOrigin,
    pub(crate) modality: Modality,
    pub(crate) is_static: bool,
    pub(crate) context_receiver_count: usize,
    pub(crate) container_source: Option<ContainerSource>,
    pub(crate) type_parameters: Arc<[TypeParameterId]>,

    lock: DeclLock,

    // Callable fields
    pub(crate) return_type: LazyField<LinkType>,
    pub(crate) dispatch_receiver: LazyField<Option<ValueParameter>>,
    pub(crate) extension_receiver: LazyField<Option<ValueParameter>>,
    pub(crate) value_parameters: LazyField<Arc<[ValueParameter]>>,
    pub(crate) overridden_symbols: LazyField<Arc<[LinkDeclId]>>,
    pub(crate) initial_signature: LazyField<Option<LinkDeclId>>,

    // Shared
    pub(crate) annotations: LazyField<Arc<[LinkAnnotation]>>,

    // Class fields
    pub(crate) this_receiver: LazyField<Option<ValueParameter>>,
    pub(crate) supertypes: LazyField<Arc<[LinkType]>>,
    pub(crate) declared_members: LazyField<Arc<[LinkDeclId]>>,
}

/// Eager attributes fixed at construction.
pub(crate) struct LinkDeclInit {
    pub id: LinkDeclId,
    pub key: DeclKey,
    pub kind: LinkDeclKind,
    pub name: Atom,
    pub origin: LinkOrigin,
    pub modality: Modality,
    pub is_static: bool,
    pub context_receiver_count: usize,
    pub container_source: Option<ContainerSource>,
    pub type_parameters: Arc<[TypeParameterId]>,
}

impl LinkDecl {
    pub(crate) fn new(init: LinkDeclInit) -> Self {
        Self {
            id: init.id,
            key: init.key,
            kind: init.kind,
            name: init.name,
            origin: init.origin,
            modality: init.modality,
            is_static: init.is_static,
            context_receiver_count: init.context_receiver_count,
            container_source: init.container_source,
            type_parameters: init.type_parameters,
            lock: DeclLock::new(()),
            return_type: LazyField::new(),
            dispatch_receiver: LazyField::new(),
            extension_receiver: LazyField::new(),
            value_parameters: LazyField::new(),
            overridden_symbols: LazyField::new(),
            initial_signature: LazyField::new(),
            annotations: LazyField::new(),
            this_receiver: LazyField::new(),
            supertypes: LazyField::new(),
            declared_members: LazyField::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Eager attributes
    // -------------------------------------------------------------------------

    pub fn id(&self) -> LinkDeclId {
        self.id
    }

    pub fn key(&self) -> DeclKey {
        self.key
    }

    /// The semantic declaration this node lowers.
    pub fn semantic(&self) -> SemDeclId {
        self.key.decl
    }

    /// The class this node is a member of, if any.
    pub fn context(&self) -> Option<SemDeclId> {
        self.key.context
    }

    pub fn kind(&self) -> LinkDeclKind {
        self.kind
    }

    pub fn name(&self) -> Atom {
        self.name
    }

    /// Names are fixed at construction.
    pub fn set_name(&self, _name: Atom) -> LoweringResult<()> {
        Err(LoweringError::UnsupportedOperation {
            decl: self.id,
            operation: "rename",
        })
    }

    pub fn origin(&self) -> LinkOrigin {
        self.origin
    }

    pub fn is_fake_override(&self) -> bool {
        self.origin == LinkOrigin::FakeOverride
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn context_receiver_count(&self) -> usize {
        self.context_receiver_count
    }

    pub fn container_source(&self) -> Option<&ContainerSource> {
        self.container_source.as_ref()
    }

    /// Registered in the classifier cache at construction.
    pub fn type_parameters(&self) -> &[TypeParameterId] {
        &self.type_parameters
    }

    fn expect_kind(&self, expected: &[LinkDeclKind], operation: &'static str) -> LoweringResult<()> {
        if expected.contains(&self.kind) {
            Ok(())
        } else {
            Err(LoweringError::UnsupportedOperation {
                decl: self.id,
                operation,
            })
        }
    }

    // -------------------------------------------------------------------------
    // Lazy callable fields
    // -------------------------------------------------------------------------

    /// Return type of a function, or the type of a property.
    pub fn return_type(&self, session: &LoweringSession) -> LoweringResult<&LinkType> {
        self.expect_kind(&[LinkDeclKind::Function, LinkDeclKind::Property], "returnType")?;
        self.return_type
            .get_or_try_init(&self.lock, self.id, "returnType", || session.compute_return_type(self))
    }

    pub fn dispatch_receiver_parameter(
        &self,
        session: &LoweringSession,
    ) -> LoweringResult<Option<&ValueParameter>> {
        self.expect_kind(
            &[LinkDeclKind::Function, LinkDeclKind::Property],
            "dispatchReceiverParameter",
        )?;
        self.dispatch_receiver
            .get_or_try_init(&self.lock, self.id, "dispatchReceiverParameter", || {
                session.compute_dispatch_receiver(self)
            })
            .map(Option::as_ref)
    }

    pub fn extension_receiver_parameter(
        &self,
        session: &LoweringSession,
    ) -> LoweringResult<Option<&ValueParameter>> {
        self.expect_kind(
            &[LinkDeclKind::Function, LinkDeclKind::Property],
            "extensionReceiverParameter",
        )?;
        self.extension_receiver
            .get_or_try_init(&self.lock, self.id, "extensionReceiverParameter", || {
                session.compute_extension_receiver(self)
            })
            .map(Option::as_ref)
    }

    /// Context receivers first, then the declared value parameters.
    pub fn value_parameters(&self, session: &LoweringSession) -> LoweringResult<&[ValueParameter]> {
        self.expect_kind(&[LinkDeclKind::Function, LinkDeclKind::Property], "valueParameters")?;
        self.value_parameters
            .get_or_try_init(&self.lock, self.id, "valueParameters", || {
                session.compute_value_parameters(self)
            })
            .map(|params| &**params)
    }

    pub fn overridden_symbols(&self, session: &LoweringSession) -> LoweringResult<&[LinkDeclId]> {
        self.expect_kind(&[LinkDeclKind::Function, LinkDeclKind::Property], "overriddenSymbols")?;
        self.overridden_symbols
            .get_or_try_init(&self.lock, self.id, "overriddenSymbols", || {
                session.compute_overridden_symbols(self)
            })
            .map(|ids| &**ids)
    }

    /// The declaration this function was renamed or bridged from, if it is
    /// not this one.
    pub fn initial_signature(&self, session: &LoweringSession) -> LoweringResult<Option<LinkDeclId>> {
        self.expect_kind(&[LinkDeclKind::Function], "initialSignature")?;
        self.initial_signature
            .get_or_try_init(&self.lock, self.id, "initialSignature", || {
                session.compute_initial_signature(self)
            })
            .copied()
    }

    pub fn annotations(&self, session: &LoweringSession) -> LoweringResult<&[LinkAnnotation]> {
        self.annotations
            .get_or_try_init(&self.lock, self.id, "annotations", || session.compute_annotations(self))
            .map(|annotations| &**annotations)
    }

    // -------------------------------------------------------------------------
    // Lazy class fields
    // -------------------------------------------------------------------------

    /// `this` inside the class; absent for static containers.
    pub fn this_receiver(&self, session: &LoweringSession) -> LoweringResult<Option<&ValueParameter>> {
        self.expect_kind(&[LinkDeclKind::Class], "thisReceiver")?;
        self.this_receiver
            .get_or_try_init(&self.lock, self.id, "thisReceiver", || session.compute_this_receiver(self))
            .map(Option::as_ref)
    }

    pub fn supertypes(&self, session: &LoweringSession) -> LoweringResult<&[LinkType]> {
        self.expect_kind(&[LinkDeclKind::Class], "superTypes")?;
        self.supertypes
            .get_or_try_init(&self.lock, self.id, "superTypes", || session.compute_supertypes(self))
            .map(|types| &**types)
    }

    /// Explicitly declared members, nested classes included, in declaration
    /// order. Fake overrides are listed by
    /// [`LoweringSession::overrides_of`].
    pub fn declared_members(&self, session: &LoweringSession) -> LoweringResult<&[LinkDeclId]> {
        self.expect_kind(&[LinkDeclKind::Class], "declarations")?;
        self.declared_members
            .get_or_try_init(&self.lock, self.id, "declarations", || {
                session.compute_declared_members(self)
            })
            .map(|ids| &**ids)
    }

    /// Whether the named field has been evaluated. Unknown names report
    /// `false`.
    pub fn is_evaluated(&self, field: &str) -> bool {
        match field {
            "returnType" => self.return_type.is_evaluated(),
            "dispatchReceiverParameter" => self.dispatch_receiver.is_evaluated(),
            "extensionReceiverParameter" => self.extension_receiver.is_evaluated(),
            "valueParameters" => self.value_parameters.is_evaluated(),
            "overriddenSymbols" => self.overridden_symbols.is_evaluated(),
            "initialSignature" => self.initial_signature.is_evaluated(),
            "annotations" => self.annotations.is_evaluated(),
            "thisReceiver" => self.this_receiver.is_evaluated(),
            "superTypes" => self.supertypes.is_evaluated(),
            "declarations" => self.declared_members.is_evaluated(),
            _ => false,
        }
    }
}

impl std::fmt::Debug for LinkDecl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkDecl")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("kind", &self.kind)
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../tests/declaration_tests.rs"]
mod tests;
