//! Per-run memo tables.
//!
//! Reference searches dominate the cost of an analysis and the same
//! declaration is asked about many times while a tree grows. Results are
//! memoised for the lifetime of one run and never shared across runs, so a
//! cache can never outlive the index snapshot it was filled from.

use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::detector::MappingSite;
use crate::hir::{Declaration, FieldRef, MethodId, Reference, TypeId};

/// Hit/miss counters, reported when a run finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
pub struct ResultCache {
    references: FxHashMap<Declaration, Arc<[Reference]>>,
    native_callers: FxHashMap<MethodId, Arc<[Reference]>>,
    overrides: FxHashMap<MethodId, Arc<[MethodId]>>,
    super_methods: FxHashMap<MethodId, Arc<[MethodId]>>,
    method_sites: FxHashMap<MethodId, Arc<[MappingSite]>>,
    sites_by_type: FxHashMap<TypeId, Arc<[MappingSite]>>,
    project_sites: Option<Arc<[MappingSite]>>,
    /// Type -> (container type, field of that type).
    containers: FxHashMap<TypeId, Arc<[(TypeId, FieldRef)]>>,
    stats: CacheStats,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub(crate) fn references<E>(
        &mut self,
        target: &Declaration,
        compute: impl FnOnce() -> Result<Vec<Reference>, E>,
    ) -> Result<Arc<[Reference]>, E> {
        memo(&mut self.references, &mut self.stats, target, compute)
    }

    pub(crate) fn native_callers<E>(
        &mut self,
        method: &MethodId,
        compute: impl FnOnce() -> Result<Vec<Reference>, E>,
    ) -> Result<Arc<[Reference]>, E> {
        memo(&mut self.native_callers, &mut self.stats, method, compute)
    }

    pub(crate) fn overrides<E>(
        &mut self,
        method: &MethodId,
        compute: impl FnOnce() -> Result<Vec<MethodId>, E>,
    ) -> Result<Arc<[MethodId]>, E> {
        memo(&mut self.overrides, &mut self.stats, method, compute)
    }

    pub(crate) fn super_methods<E>(
        &mut self,
        method: &MethodId,
        compute: impl FnOnce() -> Result<Vec<MethodId>, E>,
    ) -> Result<Arc<[MethodId]>, E> {
        memo(&mut self.super_methods, &mut self.stats, method, compute)
    }

    pub(crate) fn method_sites<E>(
        &mut self,
        method: &MethodId,
        compute: impl FnOnce() -> Result<Vec<MappingSite>, E>,
    ) -> Result<Arc<[MappingSite]>, E> {
        memo(&mut self.method_sites, &mut self.stats, method, compute)
    }

    pub(crate) fn sites_by_type<E>(
        &mut self,
        ty: TypeId,
        compute: impl FnOnce() -> Result<Vec<MappingSite>, E>,
    ) -> Result<Arc<[MappingSite]>, E> {
        memo(&mut self.sites_by_type, &mut self.stats, &ty, compute)
    }

    pub(crate) fn containers<E>(
        &mut self,
        ty: TypeId,
        compute: impl FnOnce() -> Result<Vec<(TypeId, FieldRef)>, E>,
    ) -> Result<Arc<[(TypeId, FieldRef)]>, E> {
        memo(&mut self.containers, &mut self.stats, &ty, compute)
    }

    pub(crate) fn project_sites<E>(
        &mut self,
        compute: impl FnOnce() -> Result<Vec<MappingSite>, E>,
    ) -> Result<Arc<[MappingSite]>, E> {
        if let Some(sites) = &self.project_sites {
            self.stats.hits += 1;
            return Ok(Arc::clone(sites));
        }
        self.stats.misses += 1;
        let sites: Arc<[MappingSite]> = compute()?.into();
        self.project_sites = Some(Arc::clone(&sites));
        Ok(sites)
    }
}

/// Failed computations are not stored; the next ask retries.
fn memo<K, V, E>(
    map: &mut FxHashMap<K, Arc<[V]>>,
    stats: &mut CacheStats,
    key: &K,
    compute: impl FnOnce() -> Result<Vec<V>, E>,
) -> Result<Arc<[V]>, E>
where
    K: Hash + Eq + Clone,
{
    if let Some(hit) = map.get(key) {
        stats.hits += 1;
        return Ok(Arc::clone(hit));
    }
    stats.misses += 1;
    let value: Arc<[V]> = compute()?.into();
    map.insert(key.clone(), Arc::clone(&value));
    Ok(value)
}
