//! Declaration storage: the identity map from semantic declarations to
//! linkable declarations.
//!
//! Storage is the sole authority for linkable declaration identity: every
//! request for a `(declaration, context)` pair goes through [`get`], which
//! returns the existing node or constructs one. Construction is an atomic
//! check-then-insert on the key's map shard, so racing threads end up sharing
//! the single kept instance, and the classifier cache entry is registered
//! exactly once before any lazy field can run.
//!
//! Storage also owns the per-thread scope stack used while value parameter
//! lists are materialized, so default values can refer to earlier
//! parameters of the same list.
//!
//! [`get`]: DeclarationStorage::get

use crate::classifier_cache::ClassifierCache;
use crate::declaration::{LinkDecl, LinkDeclInit, LinkDeclKind, LinkOrigin};
use crate::error::{LoweringError, LoweringResult};
use crate::hierarchy;
use crate::ids::{DeclKey, LinkDeclId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use declink_common::limits;
use declink_semantic::{SemDecl, SemDeclId, SemanticTree};
use smallvec::SmallVec;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::thread::{self, ThreadId};
use tracing::{debug, trace};

/// Global counter for assigning instance ids to storages, for log
/// correlation when several sessions run in one process.
static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

// =============================================================================
// Local scopes
// =============================================================================

/// Parameters visible while one value parameter list is materialized.
#[derive(Clone, Debug)]
pub struct LocalScope {
    /// The semantic callable whose parameters are being lowered.
    pub sem_owner: SemDeclId,
    /// The linkable declaration receiving them.
    pub link_owner: LinkDeclId,
    /// `(semantic index, index in the linkable list)` of every parameter
    /// declared so far.
    declared: SmallVec<[(u32, u32); 8]>,
}

impl LocalScope {
    pub fn new(sem_owner: SemDeclId, link_owner: LinkDeclId) -> Self {
        Self {
            sem_owner,
            link_owner,
            declared: SmallVec::new(),
        }
    }
}

/// Pops its scope when dropped, on success and on error alike.
#[must_use = "the scope is popped as soon as the guard is dropped"]
pub struct ScopeGuard<'a> {
    storage: &'a DeclarationStorage,
    thread: ThreadId,
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if let Some(mut stack) = self.storage.scopes.get_mut(&self.thread) {
            stack.pop();
        }
    }
}

// =============================================================================
// DeclarationStorage
// =============================================================================

pub struct DeclarationStorage {
    instance_id: u64,
    tree: Arc<SemanticTree>,
    by_key: DashMap<DeclKey, Arc<LinkDecl>>,
    by_id: DashMap<LinkDeclId, Arc<LinkDecl>>,
    next_id: AtomicU32,
    constructed: AtomicUsize,
    scopes: DashMap<ThreadId, Vec<LocalScope>>,
    max_hierarchy_depth: usize,
}

impl DeclarationStorage {
    pub fn new(tree: Arc<SemanticTree>, max_hierarchy_depth: usize) -> Self {
        let instance_id = NEXT_INSTANCE_ID.fetch_add(1, Ordering::SeqCst);
        trace!(instance_id, "DeclarationStorage::new");
        Self {
            instance_id,
            tree,
            by_key: DashMap::with_capacity(limits::INITIAL_STORAGE_CAPACITY),
            by_id: DashMap::with_capacity(limits::INITIAL_STORAGE_CAPACITY),
            next_id: AtomicU32::new(LinkDeclId::FIRST_VALID),
            constructed: AtomicUsize::new(0),
            scopes: DashMap::new(),
            max_hierarchy_depth,
        }
    }

    pub fn tree(&self) -> &SemanticTree {
        &self.tree
    }

    /// Validate a request and fill in the implicit context.
    ///
    /// A member requested without a context is seen from its own owner. A
    /// context other than the owner must be a class that inherits the owner;
    /// the result is a fake override key.
    pub fn normalize_key(&self, decl: SemDeclId, context: Option<SemDeclId>) -> LoweringResult<DeclKey> {
        let sem = self
            .tree
            .decl(decl)
            .ok_or(LoweringError::UnknownDeclaration(decl))?;
        let owner = sem.owner();
        let context = match (owner, context) {
            (None, None) => return Ok(DeclKey::new(decl, None)),
            (None, Some(_)) => return Err(LoweringError::UnresolvableOwner { decl, context }),
            (Some(owner), None) => owner,
            (Some(_), Some(context)) => context,
        };
        if self.tree.class(context).is_none() {
            return Err(LoweringError::NotAClass(context));
        }
        if Some(context) != owner {
            let inheritable = match sem {
                SemDecl::Class(_) => false,
                SemDecl::Function(f) => !f.is_static,
                SemDecl::Property(p) => !p.is_static,
            };
            let inherits = owner.is_some_and(|owner| {
                hierarchy::check_acyclic(&self.tree, context, self.max_hierarchy_depth).is_ok()
                    && hierarchy::is_proper_subclass(&self.tree, context, owner)
            });
            if !inheritable || !inherits {
                return Err(LoweringError::UnresolvableOwner {
                    decl,
                    context: Some(context),
                });
            }
        }
        Ok(DeclKey::new(decl, Some(context)))
    }

    /// The linkable declaration for `decl` seen from `context`, constructing
    /// it on first request. Inheriting contexts are not checked against the
    /// context's scope here; outside callers go through
    /// [`LoweringSession::resolve`](crate::LoweringSession::resolve).
    pub(crate) fn get(
        &self,
        classifiers: &ClassifierCache,
        decl: SemDeclId,
        context: Option<SemDeclId>,
    ) -> LoweringResult<Arc<LinkDecl>> {
        let key = self.normalize_key(decl, context)?;
        if let Some(existing) = self.by_key.get(&key) {
            return Ok(existing.clone());
        }
        match self.by_key.entry(key) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let node = Arc::new(self.construct(classifiers, key)?);
                self.by_id.insert(node.id, node.clone());
                entry.insert(node.clone());
                Ok(node)
            }
        }
    }

    fn construct(&self, classifiers: &ClassifierCache, key: DeclKey) -> LoweringResult<LinkDecl> {
        let sem = self
            .tree
            .decl(key.decl)
            .ok_or(LoweringError::UnknownDeclaration(key.decl))?;
        // Registration precedes everything else a field could observe.
        let type_parameters = classifiers.register(&self.tree, key.decl)?;

        let id = LinkDeclId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let is_fake_override = key.context.is_some() && key.context != sem.owner();
        let origin = if is_fake_override {
            LinkOrigin::FakeOverride
        } else {
            LinkOrigin::from_semantic(sem.origin())
        };
        let init = match sem {
            SemDecl::Class(c) => LinkDeclInit {
                id,
                key,
                kind: LinkDeclKind::Class,
                name: c.name,
                origin,
                modality: c.modality,
                is_static: false,
                context_receiver_count: 0,
                container_source: c.container_source.clone(),
                type_parameters,
            },
            SemDecl::Function(f) => LinkDeclInit {
                id,
                key,
                kind: LinkDeclKind::Function,
                name: f.name,
                origin,
                modality: f.modality,
                is_static: f.is_static,
                context_receiver_count: f.context_receivers.len(),
                container_source: f.container_source.clone(),
                type_parameters,
            },
            SemDecl::Property(p) => LinkDeclInit {
                id,
                key,
                kind: LinkDeclKind::Property,
                name: p.name,
                origin,
                modality: p.modality,
                is_static: p.is_static,
                context_receiver_count: p.context_receivers.len(),
                container_source: p.container_source.clone(),
                type_parameters,
            },
        };
        self.constructed.fetch_add(1, Ordering::SeqCst);
        debug!(
            instance_id = self.instance_id,
            id = %id,
            key = %key,
            origin = ?origin,
            "DeclarationStorage::construct"
        );
        Ok(LinkDecl::new(init))
    }

    /// The node for an already constructed key, without constructing.
    pub fn lookup(&self, decl: SemDeclId, context: Option<SemDeclId>) -> Option<Arc<LinkDecl>> {
        let key = self.normalize_key(decl, context).ok()?;
        self.by_key.get(&key).map(|r| r.clone())
    }

    pub fn by_id(&self, id: LinkDeclId) -> LoweringResult<Arc<LinkDecl>> {
        self.by_id
            .get(&id)
            .map(|r| r.clone())
            .ok_or(LoweringError::UnknownLinkDecl(id))
    }

    pub fn contains_key(&self, key: &DeclKey) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Number of nodes ever constructed, including constructions that lost a
    /// race. Equal to [`len`](Self::len) because construction happens inside
    /// the key's entry lock.
    pub fn constructed_count(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Scope stack
    // =========================================================================

    /// Push `scope` for the current thread until the guard is dropped.
    pub fn enter_scope(&self, scope: LocalScope) -> ScopeGuard<'_> {
        let thread = thread::current().id();
        trace!(owner = %scope.sem_owner, link = %scope.link_owner, "enter scope");
        self.scopes.entry(thread).or_default().push(scope);
        ScopeGuard {
            storage: self,
            thread,
        }
    }

    /// Record that the `sem_index`-th semantic parameter now lives at
    /// `link_index` in the innermost scope.
    pub fn declare_local(&self, sem_index: u32, link_index: u32) {
        let thread = thread::current().id();
        if let Some(mut stack) = self.scopes.get_mut(&thread)
            && let Some(scope) = stack.last_mut()
        {
            scope.declared.push((sem_index, link_index));
        }
    }

    /// Resolve a reference to a value parameter of `sem_owner`, searching
    /// from the innermost scope outwards.
    pub fn lookup_local(&self, sem_owner: SemDeclId, sem_index: u32) -> Option<(LinkDeclId, u32)> {
        let thread = thread::current().id();
        let stack = self.scopes.get(&thread)?;
        stack
            .iter()
            .rev()
            .filter(|scope| scope.sem_owner == sem_owner)
            .find_map(|scope| {
                scope
                    .declared
                    .iter()
                    .find(|(sem, _)| *sem == sem_index)
                    .map(|&(_, link)| (scope.link_owner, link))
            })
    }

    /// Depth of the current thread's scope stack.
    pub fn scope_depth(&self) -> usize {
        let thread = thread::current().id();
        self.scopes.get(&thread).map_or(0, |stack| stack.len())
    }
}

#[cfg(test)]
#[path = "../tests/declaration_storage_tests.rs"]
mod tests;
