//! The lowering session: one compilation's worth of linkable declarations.
//!
//! The session is the front code generation talks to. It owns the
//! declaration storage, the classifier cache and the fake override generator,
//! and it is dropped wholesale when the compilation ends. All methods take
//! `&self` and the session is `Sync`, so one session is shared by every
//! lowering thread.

use crate::classifier_cache::{ClassifierCache, TypeParameterInfo};
use crate::declaration::LinkDecl;
use crate::declaration_storage::DeclarationStorage;
use crate::diagnostics::{DiagnosticCollector, DiagnosticSink};
use crate::error::{LoweringError, LoweringResult};
use crate::fake_override::{FakeOverrideGenerator, FakeOverrides};
use crate::ids::{LinkDeclId, TypeParameterId};
use crate::options::LoweringOptions;
use crate::type_converter::{ClassifierResolver, TypeConverter};
use crate::types::LinkType;
use declink_semantic::{SemDeclId, SemanticTree, TypeParamRef};
use std::sync::Arc;
use tracing::trace;

pub struct LoweringSession {
    tree: Arc<SemanticTree>,
    options: LoweringOptions,
    storage: DeclarationStorage,
    classifiers: ClassifierCache,
    generator: FakeOverrideGenerator,
    sink: Arc<dyn DiagnosticSink>,
}

impl LoweringSession {
    pub fn new(tree: Arc<SemanticTree>, options: LoweringOptions, sink: Arc<dyn DiagnosticSink>) -> Self {
        let storage = DeclarationStorage::new(tree.clone(), options.max_hierarchy_depth);
        Self {
            tree,
            options,
            storage,
            classifiers: ClassifierCache::new(),
            generator: FakeOverrideGenerator::new(),
            sink,
        }
    }

    /// A session reporting into a fresh [`DiagnosticCollector`].
    pub fn with_collector(tree: Arc<SemanticTree>, options: LoweringOptions) -> (Self, Arc<DiagnosticCollector>) {
        let collector = Arc::new(DiagnosticCollector::new());
        let session = Self::new(tree, options, collector.clone());
        (session, collector)
    }

    pub fn tree(&self) -> &SemanticTree {
        &self.tree
    }

    pub fn shared_tree(&self) -> Arc<SemanticTree> {
        self.tree.clone()
    }

    pub fn options(&self) -> &LoweringOptions {
        &self.options
    }

    pub fn storage(&self) -> &DeclarationStorage {
        &self.storage
    }

    pub fn classifiers(&self) -> &ClassifierCache {
        &self.classifiers
    }

    pub fn generator(&self) -> &FakeOverrideGenerator {
        &self.generator
    }

    pub fn sink(&self) -> &dyn DiagnosticSink {
        &*self.sink
    }

    // =========================================================================
    // Code generation front
    // =========================================================================

    /// The linkable counterpart of `decl` as seen from `context`.
    ///
    /// `None` means the declaration's own owner. Nothing but the node's
    /// identity and classifier entry is computed, except for an inheriting
    /// context: there the context's scope decides, and only the member its
    /// fake override was built from resolves. A member the context
    /// redeclares, or one that lost to another candidate, has no node there.
    pub fn resolve(&self, decl: SemDeclId, context: Option<SemDeclId>) -> LoweringResult<Arc<LinkDecl>> {
        let key = self.storage.normalize_key(decl, context)?;
        let owner = self.tree.owner_of(decl);
        if let Some(class) = key.context.filter(|&class| Some(class) != owner) {
            let scope = self.generator.scope(self, class)?;
            if !scope.fake_overrides.iter().any(|member| member.sem == decl) {
                return Err(LoweringError::UnresolvableOwner {
                    decl,
                    context: Some(class),
                });
            }
        }
        self.storage.get(&self.classifiers, decl, context)
    }

    pub fn decl(&self, id: LinkDeclId) -> LoweringResult<Arc<LinkDecl>> {
        self.storage.by_id(id)
    }

    /// Fake overrides of `class`, in first-found order.
    pub fn overrides_of(&self, class: SemDeclId) -> LoweringResult<FakeOverrides> {
        self.generator.fake_overrides(self, class)
    }

    /// Every member of `class`: declared ones, then fake overrides.
    pub fn members_of(&self, class: SemDeclId) -> LoweringResult<Vec<LinkDeclId>> {
        let node = self.resolve(class, None)?;
        let mut members = node.declared_members(self)?.to_vec();
        members.extend(self.overrides_of(class)?.iter());
        Ok(members)
    }

    pub fn type_parameter(&self, id: TypeParameterId) -> Option<TypeParameterInfo> {
        self.classifiers.info(id)
    }

    /// Converted upper bounds of a type parameter. Bounds are only ever
    /// expanded through this call.
    pub fn type_parameter_bounds(&self, id: TypeParameterId) -> LoweringResult<Arc<[LinkType]>> {
        if let Some(bounds) = self.classifiers.cached_bounds(id) {
            return Ok(bounds);
        }
        let info = self
            .classifiers
            .info(id)
            .ok_or(LoweringError::UnknownTypeParameterId(id))?;
        let param = self
            .tree
            .type_parameter(info.origin)
            .ok_or(LoweringError::UnknownTypeParameter(info.origin))?;
        let converter = self.converter();
        let bounds = param
            .bounds
            .iter()
            .map(|bound| converter.convert(bound))
            .collect::<LoweringResult<Arc<[LinkType]>>>()?;
        trace!(param = %id, count = bounds.len(), "expanded bounds");
        Ok(self.classifiers.store_bounds(id, bounds))
    }

    pub(crate) fn converter(&self) -> TypeConverter<'_, Self> {
        TypeConverter::new(self)
    }
}

impl ClassifierResolver for LoweringSession {
    fn class_symbol(&self, class: SemDeclId) -> LoweringResult<LinkDeclId> {
        if self.tree.class(class).is_none() {
            return Err(LoweringError::NotAClass(class));
        }
        Ok(self.resolve(class, None)?.id())
    }

    fn type_parameter_symbol(&self, param: TypeParamRef) -> LoweringResult<TypeParameterId> {
        if !self.classifiers.is_registered(param.owner) {
            self.resolve(param.owner, None)?;
        }
        self.classifiers.lookup(param.owner, param.index)
    }
}

#[cfg(test)]
#[path = "../tests/session_tests.rs"]
mod tests;
