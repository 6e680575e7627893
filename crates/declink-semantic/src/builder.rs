//! Incremental construction of a [`SemanticTree`].
//!
//! Declarations are declared first and filled in afterwards, so a class can
//! mention itself in its supertypes or a type parameter can mention itself in
//! its bounds. Misuse (filling a function slot on a class, referencing an id
//! that was never declared) is recorded and surfaced once by [`finish`].
//!
//! [`finish`]: SemanticTreeBuilder::finish

use crate::decls::{
    ClassKind, ContainerSource, DeclOrigin, Modality, SemAnnotation, SemClass, SemDecl, SemExpr,
    SemFunction, SemProperty, SemTypeParameter, SemValueParameter,
};
use crate::ids::{SemDeclId, TypeParamRef};
use crate::tree::SemanticTree;
use crate::types::{SemType, SemTypeArg};
use declink_common::{Atom, Interner};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TreeBuildError {
    #[error("declaration {0} was never declared")]
    UnknownDeclaration(SemDeclId),
    #[error("declaration {0} is not a class")]
    NotAClass(SemDeclId),
    #[error("declaration {0} is not a function")]
    NotAFunction(SemDeclId),
    #[error("declaration {0} is neither a function nor a property")]
    NotACallable(SemDeclId),
    #[error("type parameter {0} does not exist")]
    UnknownTypeParameter(TypeParamRef),
    #[error("value parameter {index} of {owner} does not exist")]
    UnknownValueParameter { owner: SemDeclId, index: u32 },
}

pub struct SemanticTreeBuilder {
    names: Interner,
    decls: Vec<SemDecl>,
    top_level: Vec<SemDeclId>,
    errors: Vec<TreeBuildError>,
}

impl Default for SemanticTreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticTreeBuilder {
    pub fn new() -> Self {
        let mut names = Interner::new();
        names.intern_common();
        Self {
            names,
            decls: Vec::new(),
            top_level: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn intern(&mut self, name: &str) -> Atom {
        self.names.intern(name)
    }

    fn push(&mut self, decl: SemDecl) -> SemDeclId {
        let id = SemDeclId(self.decls.len() as u32);
        if decl.owner().is_none() {
            self.top_level.push(id);
        }
        self.decls.push(decl);
        id
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    /// Declare a top-level class. Interfaces start out abstract.
    pub fn class(&mut self, name: &str, kind: ClassKind) -> SemDeclId {
        self.class_in(None, name, kind)
    }

    pub fn nested_class(&mut self, outer: SemDeclId, name: &str, kind: ClassKind) -> SemDeclId {
        let id = self.class_in(Some(outer), name, kind);
        self.with_class(outer, |c| c.members.push(id));
        id
    }

    fn class_in(&mut self, outer: Option<SemDeclId>, name: &str, kind: ClassKind) -> SemDeclId {
        let name = self.intern(name);
        let modality = if kind == ClassKind::Interface {
            Modality::Abstract
        } else {
            Modality::Final
        };
        self.push(SemDecl::Class(SemClass {
            name,
            outer,
            kind,
            type_params: Vec::new(),
            supertypes: Vec::new(),
            members: Vec::new(),
            annotations: Vec::new(),
            modality,
            origin: DeclOrigin::Source,
            container_source: None,
        }))
    }

    /// Declare a member function of `owner`. Members of interfaces start out
    /// abstract, other members final.
    pub fn function(&mut self, owner: SemDeclId, name: &str, return_type: SemType) -> SemDeclId {
        let modality = self.default_member_modality(owner);
        let id = self.function_in(Some(owner), name, return_type, modality);
        self.with_class(owner, |c| c.members.push(id));
        id
    }

    pub fn top_level_function(&mut self, name: &str, return_type: SemType) -> SemDeclId {
        self.function_in(None, name, return_type, Modality::Final)
    }

    fn function_in(
        &mut self,
        owner: Option<SemDeclId>,
        name: &str,
        return_type: SemType,
        modality: Modality,
    ) -> SemDeclId {
        let name = self.intern(name);
        self.push(SemDecl::Function(SemFunction {
            name,
            owner,
            type_params: Vec::new(),
            value_params: Vec::new(),
            receiver: None,
            context_receivers: Vec::new(),
            return_type,
            annotations: Vec::new(),
            overridden: Vec::new(),
            modality,
            is_static: false,
            origin: DeclOrigin::Source,
            initial_signature: None,
            container_source: None,
        }))
    }

    pub fn property(&mut self, owner: SemDeclId, name: &str, ty: SemType) -> SemDeclId {
        let modality = self.default_member_modality(owner);
        let id = self.property_in(Some(owner), name, ty, modality);
        self.with_class(owner, |c| c.members.push(id));
        id
    }

    pub fn top_level_property(&mut self, name: &str, ty: SemType) -> SemDeclId {
        self.property_in(None, name, ty, Modality::Final)
    }

    fn property_in(
        &mut self,
        owner: Option<SemDeclId>,
        name: &str,
        ty: SemType,
        modality: Modality,
    ) -> SemDeclId {
        let name = self.intern(name);
        self.push(SemDecl::Property(SemProperty {
            name,
            owner,
            type_params: Vec::new(),
            receiver: None,
            context_receivers: Vec::new(),
            ty,
            is_var: false,
            annotations: Vec::new(),
            overridden: Vec::new(),
            modality,
            is_static: false,
            origin: DeclOrigin::Source,
            container_source: None,
        }))
    }

    fn default_member_modality(&self, owner: SemDeclId) -> Modality {
        match self.decls.get(owner.index()) {
            Some(SemDecl::Class(c)) if c.kind == ClassKind::Interface => Modality::Abstract,
            _ => Modality::Final,
        }
    }

    // =========================================================================
    // Classes
    // =========================================================================

    pub fn supertype(&mut self, class: SemDeclId, supertype: SemType) -> &mut Self {
        self.with_class(class, |c| c.supertypes.push(supertype));
        self
    }

    /// `class : base<args...>` with invariant arguments.
    pub fn extends(&mut self, class: SemDeclId, base: SemDeclId, args: Vec<SemType>) -> &mut Self {
        self.supertype(class, SemType::class(base, args))
    }

    /// `class : base<args...>` with explicit projections.
    pub fn extends_projected(
        &mut self,
        class: SemDeclId,
        base: SemDeclId,
        args: Vec<SemTypeArg>,
    ) -> &mut Self {
        self.supertype(class, SemType::class_with(base, args))
    }

    // =========================================================================
    // Shared attributes
    // =========================================================================

    /// Add a type parameter to a class or callable; bounds are added later
    /// with [`bound`](Self::bound) so they can mention the parameter itself.
    pub fn type_param(&mut self, owner: SemDeclId, name: &str) -> TypeParamRef {
        let name = self.intern(name);
        let param = SemTypeParameter {
            name,
            bounds: Vec::new(),
            reified: false,
        };
        let mut index = 0;
        match self.decls.get_mut(owner.index()) {
            Some(SemDecl::Class(c)) => {
                index = c.type_params.len() as u32;
                c.type_params.push(param);
            }
            Some(SemDecl::Function(f)) => {
                index = f.type_params.len() as u32;
                f.type_params.push(param);
            }
            Some(SemDecl::Property(p)) => {
                index = p.type_params.len() as u32;
                p.type_params.push(param);
            }
            None => self.errors.push(TreeBuildError::UnknownDeclaration(owner)),
        }
        TypeParamRef::new(owner, index)
    }

    pub fn bound(&mut self, param: TypeParamRef, bound: SemType) -> &mut Self {
        let slot = self
            .decls
            .get_mut(param.owner.index())
            .and_then(|decl| match decl {
                SemDecl::Class(c) => c.type_params.get_mut(param.index as usize),
                SemDecl::Function(f) => f.type_params.get_mut(param.index as usize),
                SemDecl::Property(p) => p.type_params.get_mut(param.index as usize),
            });
        match slot {
            Some(p) => p.bounds.push(bound),
            None => self.errors.push(TreeBuildError::UnknownTypeParameter(param)),
        }
        self
    }

    pub fn annotate(&mut self, decl: SemDeclId, annotation: SemAnnotation) -> &mut Self {
        match self.decls.get_mut(decl.index()) {
            Some(SemDecl::Class(c)) => c.annotations.push(annotation),
            Some(SemDecl::Function(f)) => f.annotations.push(annotation),
            Some(SemDecl::Property(p)) => p.annotations.push(annotation),
            None => self.errors.push(TreeBuildError::UnknownDeclaration(decl)),
        }
        self
    }

    pub fn modality(&mut self, decl: SemDeclId, modality: Modality) -> &mut Self {
        match self.decls.get_mut(decl.index()) {
            Some(SemDecl::Class(c)) => c.modality = modality,
            Some(SemDecl::Function(f)) => f.modality = modality,
            Some(SemDecl::Property(p)) => p.modality = modality,
            None => self.errors.push(TreeBuildError::UnknownDeclaration(decl)),
        }
        self
    }

    pub fn origin(&mut self, decl: SemDeclId, origin: DeclOrigin) -> &mut Self {
        match self.decls.get_mut(decl.index()) {
            Some(SemDecl::Class(c)) => c.origin = origin,
            Some(SemDecl::Function(f)) => f.origin = origin,
            Some(SemDecl::Property(p)) => p.origin = origin,
            None => self.errors.push(TreeBuildError::UnknownDeclaration(decl)),
        }
        self
    }

    pub fn container_source(
        &mut self,
        decl: SemDeclId,
        module: &str,
        facade: Option<&str>,
    ) -> &mut Self {
        let source = ContainerSource {
            module: self.intern(module),
            facade: facade.map(|f| self.intern(f)),
        };
        match self.decls.get_mut(decl.index()) {
            Some(SemDecl::Class(c)) => c.container_source = Some(source),
            Some(SemDecl::Function(f)) => f.container_source = Some(source),
            Some(SemDecl::Property(p)) => p.container_source = Some(source),
            None => self.errors.push(TreeBuildError::UnknownDeclaration(decl)),
        }
        self
    }

    // =========================================================================
    // Callables
    // =========================================================================

    /// Append a value parameter and return its index.
    pub fn value_param(&mut self, function: SemDeclId, name: &str, ty: SemType) -> u32 {
        let name = self.intern(name);
        let mut index = 0;
        self.with_function(function, |f| {
            index = f.value_params.len() as u32;
            f.value_params.push(SemValueParameter {
                name,
                ty,
                default: None,
                is_vararg: false,
            });
        });
        index
    }

    pub fn vararg(&mut self, function: SemDeclId, index: u32) -> &mut Self {
        self.with_value_param(function, index, |p| p.is_vararg = true);
        self
    }

    pub fn default_value(&mut self, function: SemDeclId, index: u32, expr: SemExpr) -> &mut Self {
        self.with_value_param(function, index, |p| p.default = Some(expr));
        self
    }

    pub fn receiver(&mut self, callable: SemDeclId, ty: SemType) -> &mut Self {
        match self.decls.get_mut(callable.index()) {
            Some(SemDecl::Function(f)) => f.receiver = Some(ty),
            Some(SemDecl::Property(p)) => p.receiver = Some(ty),
            Some(SemDecl::Class(_)) => self.errors.push(TreeBuildError::NotACallable(callable)),
            None => self.errors.push(TreeBuildError::UnknownDeclaration(callable)),
        }
        self
    }

    pub fn context_receiver(&mut self, callable: SemDeclId, ty: SemType) -> &mut Self {
        match self.decls.get_mut(callable.index()) {
            Some(SemDecl::Function(f)) => f.context_receivers.push(ty),
            Some(SemDecl::Property(p)) => p.context_receivers.push(ty),
            Some(SemDecl::Class(_)) => self.errors.push(TreeBuildError::NotACallable(callable)),
            None => self.errors.push(TreeBuildError::UnknownDeclaration(callable)),
        }
        self
    }

    /// Record an explicit override hint.
    pub fn overrides(&mut self, callable: SemDeclId, base: SemDeclId) -> &mut Self {
        match self.decls.get_mut(callable.index()) {
            Some(SemDecl::Function(f)) => f.overridden.push(base),
            Some(SemDecl::Property(p)) => p.overridden.push(base),
            Some(SemDecl::Class(_)) => self.errors.push(TreeBuildError::NotACallable(callable)),
            None => self.errors.push(TreeBuildError::UnknownDeclaration(callable)),
        }
        self
    }

    pub fn set_static(&mut self, callable: SemDeclId) -> &mut Self {
        match self.decls.get_mut(callable.index()) {
            Some(SemDecl::Function(f)) => f.is_static = true,
            Some(SemDecl::Property(p)) => p.is_static = true,
            Some(SemDecl::Class(_)) => self.errors.push(TreeBuildError::NotACallable(callable)),
            None => self.errors.push(TreeBuildError::UnknownDeclaration(callable)),
        }
        self
    }

    pub fn mutable(&mut self, property: SemDeclId) -> &mut Self {
        match self.decls.get_mut(property.index()) {
            Some(SemDecl::Property(p)) => p.is_var = true,
            Some(_) => self.errors.push(TreeBuildError::NotACallable(property)),
            None => self.errors.push(TreeBuildError::UnknownDeclaration(property)),
        }
        self
    }

    pub fn initial_signature(&mut self, function: SemDeclId, initial: SemDeclId) -> &mut Self {
        self.with_function(function, |f| f.initial_signature = Some(initial));
        self
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn with_class(&mut self, id: SemDeclId, f: impl FnOnce(&mut SemClass)) {
        match self.decls.get_mut(id.index()) {
            Some(SemDecl::Class(c)) => f(c),
            Some(_) => self.errors.push(TreeBuildError::NotAClass(id)),
            None => self.errors.push(TreeBuildError::UnknownDeclaration(id)),
        }
    }

    fn with_function(&mut self, id: SemDeclId, f: impl FnOnce(&mut SemFunction)) {
        match self.decls.get_mut(id.index()) {
            Some(SemDecl::Function(func)) => f(func),
            Some(_) => self.errors.push(TreeBuildError::NotAFunction(id)),
            None => self.errors.push(TreeBuildError::UnknownDeclaration(id)),
        }
    }

    fn with_value_param(
        &mut self,
        function: SemDeclId,
        index: u32,
        f: impl FnOnce(&mut SemValueParameter),
    ) {
        let mut missing = false;
        self.with_function(function, |func| match func.value_params.get_mut(index as usize) {
            Some(p) => f(p),
            None => missing = true,
        });
        if missing {
            self.errors.push(TreeBuildError::UnknownValueParameter {
                owner: function,
                index,
            });
        }
    }

    /// Validate every cross reference and produce the immutable tree.
    pub fn finish(mut self) -> Result<SemanticTree, TreeBuildError> {
        if let Some(err) = self.errors.first() {
            return Err(err.clone());
        }
        let tree = SemanticTree::from_parts(
            std::mem::take(&mut self.names),
            std::mem::take(&mut self.decls),
            std::mem::take(&mut self.top_level),
        );
        validate(&tree)?;
        Ok(tree)
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Check that every id mentioned by `tree` points at a declaration of the
/// right kind. Also applied to trees loaded through serde.
pub fn validate(tree: &SemanticTree) -> Result<(), TreeBuildError> {
    for id in tree.ids() {
        let Some(decl) = tree.decl(id) else {
            continue;
        };
        if let Some(owner) = decl.owner() {
            expect_class(tree, owner)?;
        }
        for param in decl.type_params() {
            for bound in &param.bounds {
                validate_type(tree, bound)?;
            }
        }
        for annotation in decl.annotations() {
            expect_class(tree, annotation.class)?;
        }
        match decl {
            SemDecl::Class(c) => {
                for ty in &c.supertypes {
                    validate_type(tree, ty)?;
                }
                for &member in &c.members {
                    if !tree.contains(member) {
                        return Err(TreeBuildError::UnknownDeclaration(member));
                    }
                }
            }
            SemDecl::Function(_) | SemDecl::Property(_) => {
                let Some(view) = tree.callable(id) else {
                    continue;
                };
                validate_type(tree, view.return_type)?;
                if let Some(receiver) = view.receiver {
                    validate_type(tree, receiver)?;
                }
                for ty in view.context_receivers {
                    validate_type(tree, ty)?;
                }
                for param in view.value_params {
                    validate_type(tree, &param.ty)?;
                    if let Some(expr) = &param.default {
                        validate_expr(tree, expr)?;
                    }
                }
                for &base in view.overridden {
                    if tree.callable(base).is_none() {
                        return Err(TreeBuildError::NotACallable(base));
                    }
                }
                if let Some(initial) = tree.function(id).and_then(|f| f.initial_signature)
                    && tree.function(initial).is_none()
                {
                    return Err(TreeBuildError::NotAFunction(initial));
                }
            }
        }
    }
    Ok(())
}

fn expect_class(tree: &SemanticTree, id: SemDeclId) -> Result<(), TreeBuildError> {
    match tree.decl(id) {
        Some(SemDecl::Class(_)) => Ok(()),
        Some(_) => Err(TreeBuildError::NotAClass(id)),
        None => Err(TreeBuildError::UnknownDeclaration(id)),
    }
}

fn validate_type(tree: &SemanticTree, ty: &SemType) -> Result<(), TreeBuildError> {
    match ty {
        SemType::Class { class, args, .. } => {
            expect_class(tree, *class)?;
            for arg in args {
                if let Some(ty) = arg.ty() {
                    validate_type(tree, ty)?;
                }
            }
            Ok(())
        }
        SemType::TypeParameter { param, .. } => {
            if tree.type_parameter(*param).is_some() {
                Ok(())
            } else {
                Err(TreeBuildError::UnknownTypeParameter(*param))
            }
        }
        SemType::Error => Ok(()),
    }
}

fn validate_expr(tree: &SemanticTree, expr: &SemExpr) -> Result<(), TreeBuildError> {
    match expr {
        SemExpr::Const(_) => Ok(()),
        SemExpr::Ref(crate::decls::SemSymbol::ValueParameter { owner, index }) => {
            let exists = tree
                .callable(*owner)
                .is_some_and(|view| (*index as usize) < view.value_params.len());
            if exists {
                Ok(())
            } else {
                Err(TreeBuildError::UnknownValueParameter {
                    owner: *owner,
                    index: *index,
                })
            }
        }
        SemExpr::Ref(crate::decls::SemSymbol::Declaration(id)) => {
            if tree.contains(*id) {
                Ok(())
            } else {
                Err(TreeBuildError::UnknownDeclaration(*id))
            }
        }
        SemExpr::Call { callee, args } => {
            if tree.function(*callee).is_none() {
                return Err(TreeBuildError::NotAFunction(*callee));
            }
            args.iter().try_for_each(|arg| validate_expr(tree, arg))
        }
    }
}

#[cfg(test)]
#[path = "../tests/builder_tests.rs"]
mod tests;
