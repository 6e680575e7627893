//! Classifier parameter cache.
//!
//! Records, per semantic declaration, the ordered type-parameter identities it
//! introduces. The declaration storage registers an entry while constructing
//! a linkable declaration, before any of its lazy fields can run, so type
//! conversion inside those fields always finds the parameters of the
//! declaration being lowered (and of its enclosing classes).

use crate::error::{LoweringError, LoweringResult};
use crate::ids::TypeParameterId;
use crate::types::LinkType;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use declink_common::Atom;
use declink_semantic::{SemDeclId, SemanticTree, TypeParamRef};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use tracing::trace;

/// What the cache knows about one type parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParameterInfo {
    pub id: TypeParameterId,
    pub origin: TypeParamRef,
    pub name: Atom,
    pub reified: bool,
}

pub struct ClassifierCache {
    entries: DashMap<SemDeclId, Arc<[TypeParameterId]>>,
    params: DashMap<TypeParameterId, TypeParameterInfo>,
    /// Converted bounds, filled only on explicit expansion requests.
    bounds: DashMap<TypeParameterId, Arc<[LinkType]>>,
    next_id: AtomicU32,
    registrations: AtomicUsize,
}

impl Default for ClassifierCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassifierCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            params: DashMap::new(),
            bounds: DashMap::new(),
            next_id: AtomicU32::new(1),
            registrations: AtomicUsize::new(0),
        }
    }

    /// Register the type parameters of `decl`. Idempotent: a second call
    /// returns the identities allocated by the first.
    pub fn register(
        &self,
        tree: &SemanticTree,
        decl: SemDeclId,
    ) -> LoweringResult<Arc<[TypeParameterId]>> {
        if let Some(existing) = self.entries.get(&decl) {
            return Ok(existing.clone());
        }
        let sem_params = match tree.decl(decl) {
            Some(d) => d.type_params(),
            None => return Err(LoweringError::UnknownDeclaration(decl)),
        };
        match self.entries.entry(decl) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let ids: Arc<[TypeParameterId]> = sem_params
                    .iter()
                    .enumerate()
                    .map(|(index, param)| {
                        let id = TypeParameterId(self.next_id.fetch_add(1, Ordering::SeqCst));
                        self.params.insert(
                            id,
                            TypeParameterInfo {
                                id,
                                origin: TypeParamRef::new(decl, index as u32),
                                name: param.name,
                                reified: param.reified,
                            },
                        );
                        id
                    })
                    .collect();
                self.registrations.fetch_add(1, Ordering::SeqCst);
                trace!(decl = %decl, count = ids.len(), "ClassifierCache::register");
                entry.insert(ids.clone());
                Ok(ids)
            }
        }
    }

    pub fn is_registered(&self, decl: SemDeclId) -> bool {
        self.entries.contains_key(&decl)
    }

    /// All parameters of `decl`, in declaration order.
    pub fn parameters(&self, decl: SemDeclId) -> LoweringResult<Arc<[TypeParameterId]>> {
        self.entries
            .get(&decl)
            .map(|r| r.clone())
            .ok_or(LoweringError::ClassifierNotRegistered { decl })
    }

    /// The identity of the `index`-th parameter of `decl`.
    pub fn lookup(&self, decl: SemDeclId, index: u32) -> LoweringResult<TypeParameterId> {
        let params = self.parameters(decl)?;
        params
            .get(index as usize)
            .copied()
            .ok_or(LoweringError::UnknownTypeParameter(TypeParamRef::new(decl, index)))
    }

    pub fn info(&self, id: TypeParameterId) -> Option<TypeParameterInfo> {
        self.params.get(&id).map(|r| r.clone())
    }

    /// Number of entries actually created (idempotent re-registrations are
    /// not counted).
    pub fn registration_count(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn cached_bounds(&self, id: TypeParameterId) -> Option<Arc<[LinkType]>> {
        self.bounds.get(&id).map(|r| r.clone())
    }

    /// Publish converted bounds; a racing publisher keeps the first value.
    pub(crate) fn store_bounds(&self, id: TypeParameterId, bounds: Arc<[LinkType]>) -> Arc<[LinkType]> {
        self.bounds.entry(id).or_insert(bounds).clone()
    }
}

#[cfg(test)]
#[path = "../tests/classifier_cache_tests.rs"]
mod tests;
