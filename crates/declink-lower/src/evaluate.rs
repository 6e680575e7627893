//! Field evaluators for lazy linkable declarations.
//!
//! Each `compute_*` runs at most once per node, under the node's lock (see
//! [`LazyField`](crate::lazy::LazyField)). Evaluators only construct other
//! nodes through storage; the one field they force on another node is the
//! owning class's `this` receiver, read from a member. Locks are therefore
//! only ever nested from a member to its class, never the other way round.

use crate::declaration::{LinkAnnotation, LinkDecl, LinkDeclKind, LinkExpr, ParameterKind, ValueParameter};
use crate::declaration_storage::LocalScope;
use crate::error::{LoweringError, LoweringResult};
use crate::hierarchy;
use crate::ids::LinkDeclId;
use crate::session::LoweringSession;
use crate::signature::signature_key;
use crate::substitution::{Substitution, supertype_substitution};
use crate::types::LinkType;
use declink_common::Atom;
use declink_semantic::{CallableView, SemDeclId, SemExpr, SemSymbol};
use std::sync::Arc;
use tracing::trace;

impl LoweringSession {
    fn callable_view(&self, decl: &LinkDecl) -> LoweringResult<CallableView<'_>> {
        self.tree()
            .callable(decl.semantic())
            .ok_or(LoweringError::UnknownDeclaration(decl.semantic()))
    }

    fn name_atom(&self, name: &str) -> Atom {
        self.tree().interner().lookup(name).unwrap_or(Atom::NONE)
    }

    /// Maps the member's declaring class into the node's context class.
    ///
    /// Identity for everything but fake overrides. For a fake override the
    /// generator's choice wins; a fake override requested directly falls
    /// back to the first supertype path.
    pub(crate) fn member_substitution(&self, decl: &LinkDecl) -> LoweringResult<Arc<Substitution>> {
        if !decl.is_fake_override() {
            return Ok(Arc::new(Substitution::identity()));
        }
        let (Some(context), Some(owner)) = (decl.context(), self.tree().owner_of(decl.semantic())) else {
            return Err(LoweringError::UnresolvableOwner {
                decl: decl.semantic(),
                context: decl.context(),
            });
        };
        self.overrides_of(context)?;
        if let Some(subst) = self.generator().substitution(decl.id()) {
            return Ok(subst);
        }
        supertype_substitution(self.tree(), context, owner, self.options().max_hierarchy_depth)
            .map(Arc::new)
            .ok_or(LoweringError::UnresolvableOwner {
                decl: decl.semantic(),
                context: Some(context),
            })
    }

    // =========================================================================
    // Callables
    // =========================================================================

    pub(crate) fn compute_return_type(&self, decl: &LinkDecl) -> LoweringResult<LinkType> {
        let view = self.callable_view(decl)?;
        let subst = self.member_substitution(decl)?;
        self.converter().convert(&subst.apply(self.tree(), view.return_type))
    }

    pub(crate) fn compute_dispatch_receiver(&self, decl: &LinkDecl) -> LoweringResult<Option<ValueParameter>> {
        let Some(class) = decl.context() else {
            return Ok(None);
        };
        if decl.is_static() {
            return Ok(None);
        }
        let class_node = self.resolve(class, None)?;
        let this = class_node.this_receiver(self)?;
        Ok(this.map(|this| ValueParameter {
            name: this.name,
            kind: ParameterKind::DispatchReceiver,
            ty: this.ty.clone(),
            default: None,
            is_vararg: false,
        }))
    }

    pub(crate) fn compute_extension_receiver(&self, decl: &LinkDecl) -> LoweringResult<Option<ValueParameter>> {
        let view = self.callable_view(decl)?;
        let Some(receiver) = view.receiver else {
            return Ok(None);
        };
        let subst = self.member_substitution(decl)?;
        Ok(Some(ValueParameter {
            name: self.name_atom("<this>"),
            kind: ParameterKind::ExtensionReceiver,
            ty: self.converter().convert(&subst.apply(self.tree(), receiver))?,
            default: None,
            is_vararg: false,
        }))
    }

    pub(crate) fn compute_value_parameters(&self, decl: &LinkDecl) -> LoweringResult<Arc<[ValueParameter]>> {
        let view = self.callable_view(decl)?;
        let subst = self.member_substitution(decl)?;
        let tree = self.tree();
        let converter = self.converter();
        let skip_defaults = decl.is_fake_override() && self.options().skip_fake_override_defaults;

        let mut params = Vec::with_capacity(view.context_receivers.len() + view.value_params.len());
        let context_name = self.name_atom("<context>");
        for receiver in view.context_receivers {
            params.push(ValueParameter {
                name: context_name,
                kind: ParameterKind::Context,
                ty: converter.convert(&subst.apply(tree, receiver))?,
                default: None,
                is_vararg: false,
            });
        }

        let _scope = self
            .storage()
            .enter_scope(LocalScope::new(decl.semantic(), decl.id()));
        for (index, param) in view.value_params.iter().enumerate() {
            let ty = converter.convert(&subst.apply(tree, &param.ty))?;
            // Lowered before the parameter itself is declared: a default sees
            // only the parameters to its left.
            let default = match &param.default {
                Some(expr) if !skip_defaults => Some(self.lower_expr(expr)?),
                _ => None,
            };
            let link_index = params.len() as u32;
            params.push(ValueParameter {
                name: param.name,
                kind: ParameterKind::Regular,
                ty,
                default,
                is_vararg: param.is_vararg,
            });
            self.storage().declare_local(index as u32, link_index);
        }
        trace!(decl = %decl.id(), count = params.len(), "value parameters");
        Ok(params.into())
    }

    fn lower_expr(&self, expr: &SemExpr) -> LoweringResult<LinkExpr> {
        Ok(match expr {
            SemExpr::Const(value) => LinkExpr::Const(value.clone()),
            SemExpr::Ref(SemSymbol::ValueParameter { owner, index }) => {
                let (link, link_index) = self
                    .storage()
                    .lookup_local(*owner, *index)
                    .ok_or(LoweringError::UnboundValueParameter {
                        owner: *owner,
                        index: *index,
                    })?;
                LinkExpr::ValueParameter {
                    owner: link,
                    index: link_index,
                }
            }
            SemExpr::Ref(SemSymbol::Declaration(target)) => {
                LinkExpr::Declaration(self.resolve(*target, None)?.id())
            }
            SemExpr::Call { callee, args } => LinkExpr::Call {
                callee: self.resolve(*callee, None)?.id(),
                args: args
                    .iter()
                    .map(|arg| self.lower_expr(arg))
                    .collect::<LoweringResult<_>>()?,
            },
        })
    }

    pub(crate) fn compute_overridden_symbols(&self, decl: &LinkDecl) -> LoweringResult<Arc<[LinkDeclId]>> {
        if decl.is_fake_override()
            && let Some(context) = decl.context()
        {
            self.overrides_of(context)?;
            if let Some(bases) = self.generator().base_symbols(decl.id()) {
                return Ok(bases);
            }
        }
        let view = self.callable_view(decl)?;
        let Some(class) = decl.context() else {
            return Ok(Arc::from([]));
        };
        if view.is_static {
            return Ok(Arc::from([]));
        }
        let subst = self.member_substitution(decl)?;
        self.match_in_supertypes(class, &view, &subst)
    }

    /// Members of `class`'s immediate supertypes whose erased signature, seen
    /// from `class`, equals `view`'s. Explicit hints narrow the match when
    /// they name one of the matching members.
    fn match_in_supertypes(
        &self,
        class: SemDeclId,
        view: &CallableView<'_>,
        subst: &Substitution,
    ) -> LoweringResult<Arc<[LinkDeclId]>> {
        let tree = self.tree();
        let own_key = signature_key(tree, view, subst);
        let mut matched: Vec<(SemDeclId, LinkDeclId)> = Vec::new();
        for (super_class, supertype) in hierarchy::direct_supertypes(tree, class) {
            let scope = self.generator().scope(self, super_class)?;
            let step = Substitution::for_supertype(tree, supertype);
            for member in scope.members() {
                let Some(member_view) = tree.callable(member.sem) else {
                    continue;
                };
                let member_subst = step.compose(tree, &member.subst);
                if signature_key(tree, &member_view, &member_subst) != own_key {
                    continue;
                }
                if !matched.iter().any(|&(_, link)| link == member.link) {
                    matched.push((member.sem, member.link));
                }
            }
        }
        if !view.overridden.is_empty() && matched.iter().any(|(sem, _)| view.overridden.contains(sem)) {
            matched.retain(|(sem, _)| view.overridden.contains(sem));
        }
        Ok(matched.into_iter().map(|(_, link)| link).collect())
    }

    pub(crate) fn compute_initial_signature(&self, decl: &LinkDecl) -> LoweringResult<Option<LinkDeclId>> {
        let Some(initial) = self.tree().function(decl.semantic()).and_then(|f| f.initial_signature) else {
            return Ok(None);
        };
        let resolved = self.resolve(initial, None)?.id();
        Ok((resolved != decl.id()).then_some(resolved))
    }

    pub(crate) fn compute_annotations(&self, decl: &LinkDecl) -> LoweringResult<Arc<[LinkAnnotation]>> {
        let sem = self
            .tree()
            .decl(decl.semantic())
            .ok_or(LoweringError::UnknownDeclaration(decl.semantic()))?;
        sem.annotations()
            .iter()
            .map(|annotation| {
                Ok(LinkAnnotation {
                    class: self.resolve(annotation.class, None)?.id(),
                    args: annotation.args.clone(),
                })
            })
            .collect()
    }

    // =========================================================================
    // Classes
    // =========================================================================

    fn class_of(&self, decl: &LinkDecl) -> LoweringResult<SemDeclId> {
        match decl.kind() {
            LinkDeclKind::Class => Ok(decl.semantic()),
            _ => Err(LoweringError::NotAClass(decl.semantic())),
        }
    }

    pub(crate) fn compute_this_receiver(&self, decl: &LinkDecl) -> LoweringResult<Option<ValueParameter>> {
        let class = self.class_of(decl)?;
        let sem_class = self.tree().class(class).ok_or(LoweringError::NotAClass(class))?;
        if !sem_class.kind.has_this_receiver() {
            return Ok(None);
        }
        Ok(Some(ValueParameter {
            name: self.name_atom("<this>"),
            kind: ParameterKind::DispatchReceiver,
            ty: self.converter().convert(&self.tree().this_type(class))?,
            default: None,
            is_vararg: false,
        }))
    }

    pub(crate) fn compute_supertypes(&self, decl: &LinkDecl) -> LoweringResult<Arc<[LinkType]>> {
        let class = self.class_of(decl)?;
        let sem_class = self.tree().class(class).ok_or(LoweringError::NotAClass(class))?;
        let converter = self.converter();
        sem_class.supertypes.iter().map(|ty| converter.convert(ty)).collect()
    }

    pub(crate) fn compute_declared_members(&self, decl: &LinkDecl) -> LoweringResult<Arc<[LinkDeclId]>> {
        let class = self.class_of(decl)?;
        let sem_class = self.tree().class(class).ok_or(LoweringError::NotAClass(class))?;
        sem_class
            .members
            .iter()
            .map(|&member| Ok(self.resolve(member, None)?.id()))
            .collect()
    }
}
