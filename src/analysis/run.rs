//! The context of one analysis run.
//!
//! An [`AnalysisRun`] bundles the index snapshot, the configuration, the
//! caller's cancellation token and the run's private [`ResultCache`]. Every
//! index query made by the engine goes through it, so every query is
//! preceded by a cancellation check and memoised.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use super::cache::{CacheStats, ResultCache};
use super::config::AnalysisConfig;
use super::detector::{DetectScope, MappingSite, MappingSiteDetector};
use super::error::{AnalysisError, AnalysisResult};
use crate::hir::{Declaration, FieldRef, MethodId, Reference, SymbolIndex, TypeId, TypeRef};

pub struct AnalysisRun<'a, I: SymbolIndex + ?Sized> {
    index: &'a I,
    config: &'a AnalysisConfig,
    cancel: &'a CancellationToken,
    cache: ResultCache,
    id: Uuid,
}

impl<'a, I: SymbolIndex + ?Sized> AnalysisRun<'a, I> {
    pub fn new(index: &'a I, config: &'a AnalysisConfig, cancel: &'a CancellationToken) -> Self {
        Self {
            index,
            config,
            cancel,
            cache: ResultCache::new(),
            id: Uuid::new_v4(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn index(&self) -> &'a I {
        self.index
    }

    pub fn config(&self) -> &'a AnalysisConfig {
        self.config
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Fails with [`AnalysisError::Cancelled`] once the token has fired.
    pub fn check_cancelled(&self) -> AnalysisResult<()> {
        if self.cancel.is_cancelled() {
            debug!(run = %self.id, "cancellation observed");
            return Err(AnalysisError::Cancelled);
        }
        Ok(())
    }

    // ========================================================================
    // INDEX QUERIES
    // ========================================================================

    pub fn references(&mut self, target: &Declaration) -> AnalysisResult<Arc<[Reference]>> {
        self.check_cancelled()?;
        let index = self.index;
        self.cache
            .references(target, || index.find_references(target).map_err(AnalysisError::from))
    }

    /// Native caller lookup. Fails when the index lacks the capability.
    pub fn native_callers(&mut self, method: &MethodId) -> AnalysisResult<Arc<[Reference]>> {
        self.check_cancelled()?;
        let index = self.index;
        self.cache.native_callers(method, || match index.callers_of(method) {
            Some(result) => result.map_err(AnalysisError::from),
            None => Err(AnalysisError::fault("index has no native caller lookup")),
        })
    }

    pub fn overrides(&mut self, method: &MethodId) -> AnalysisResult<Arc<[MethodId]>> {
        self.check_cancelled()?;
        let index = self.index;
        self.cache.overrides(method, || {
            index
                .find_overrides_and_implementations(method)
                .map_err(AnalysisError::from)
        })
    }

    pub fn super_methods(&mut self, method: &MethodId) -> AnalysisResult<Arc<[MethodId]>> {
        self.check_cancelled()?;
        let index = self.index;
        self.cache
            .super_methods(method, || index.find_super_methods(method).map_err(AnalysisError::from))
    }

    // ========================================================================
    // MAPPING SITES
    // ========================================================================

    /// Mapping sites inside one method body, in body order.
    pub fn sites_in_method(&mut self, method: &MethodId) -> AnalysisResult<Arc<[MappingSite]>> {
        self.check_cancelled()?;
        let (index, config) = (self.index, self.config);
        let vocabulary = &config.mapping;
        self.cache.method_sites(method, || {
            Ok::<_, AnalysisError>(
                MappingSiteDetector::new(index, vocabulary).detect(DetectScope::Method(method)),
            )
        })
    }

    /// Every mapping site in the project, in index order.
    pub fn project_sites(&mut self) -> AnalysisResult<Arc<[MappingSite]>> {
        self.check_cancelled()?;
        let (index, config) = (self.index, self.config);
        let vocabulary = &config.mapping;
        let cancel = self.cancel;
        self.cache.project_sites(|| {
            let detector = MappingSiteDetector::new(index, vocabulary);
            let mut out = Vec::new();
            for ty in index.all_types() {
                if cancel.is_cancelled() {
                    return Err(AnalysisError::Cancelled);
                }
                let Some(decl) = index.type_decl(ty) else {
                    continue;
                };
                for method in &decl.methods {
                    out.extend(detector.detect_in_method(method));
                }
            }
            debug!(sites = out.len(), "project mapping sites detected");
            Ok(out)
        })
    }

    /// Project sites with `ty` on either side.
    pub fn sites_pairing(&mut self, ty: TypeId) -> AnalysisResult<Arc<[MappingSite]>> {
        let all = self.project_sites()?;
        self.cache.sites_by_type(ty, || {
            Ok::<_, AnalysisError>(all.iter().filter(|s| s.involves(ty)).cloned().collect())
        })
    }

    // ========================================================================
    // TYPE STRUCTURE
    // ========================================================================

    /// Types with a field whose type is `ty` or a single-element container
    /// of `ty`, paired with that field. Index order, declared fields first.
    pub fn containers_of(&mut self, ty: TypeId) -> AnalysisResult<Arc<[(TypeId, FieldRef)]>> {
        self.check_cancelled()?;
        let index = self.index;
        self.cache.containers(ty, || {
            let mut out = Vec::new();
            let mut seen = FxHashSet::default();
            for container in index.all_types() {
                for field in index.fields_of(container, true) {
                    let holds = index
                        .field_decl(&field)
                        .is_some_and(|decl| field_holds(index, &decl.ty, ty));
                    if holds && seen.insert((container, field.name.clone())) {
                        out.push((container, field));
                    }
                }
            }
            Ok::<_, AnalysisError>(out)
        })
    }

    /// The project type a field's values have: the field's own type when it
    /// resolves, else its element type.
    pub fn field_value_type(&self, field: &FieldRef) -> Option<TypeId> {
        let decl = self.index.field_decl(field)?;
        value_type(self.index, &decl.ty)
    }
}

fn field_holds<I: SymbolIndex + ?Sized>(index: &I, field_ty: &TypeRef, ty: TypeId) -> bool {
    index.resolve_type_ref(field_ty) == Some(ty)
        || field_ty
            .element_type()
            .and_then(|el| index.resolve_type_ref(&el))
            == Some(ty)
}

fn value_type<I: SymbolIndex + ?Sized>(index: &I, ty: &TypeRef) -> Option<TypeId> {
    index.resolve_type_ref(ty).or_else(|| {
        ty.element_type()
            .and_then(|element| index.resolve_type_ref(&element))
    })
}
