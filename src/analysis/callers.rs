//! Caller discovery.
//!
//! Two interchangeable strategies answer "who calls this method":
//!
//! - [`NativeCallers`] asks the index's call graph directly.
//! - [`ReferenceScan`] searches references to the method declaration.
//!
//! The strategy is chosen once per run from the index's advertised
//! capability. Both go through the run, so results are cancellable and
//! memoised. Dispatch transparency and grouping are shared by both.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use tracing::trace;

use super::error::AnalysisResult;
use super::run::AnalysisRun;
use crate::base::CodeLocation;
use crate::hir::{Declaration, MethodId, Reference, SymbolIndex};

/// A way to find the direct callers of one method.
pub trait CallerStrategy<I: SymbolIndex + ?Sized> {
    fn name(&self) -> &'static str;

    /// References invoking exactly `method`, without dispatch expansion.
    fn direct_references(
        &self,
        run: &mut AnalysisRun<'_, I>,
        method: &MethodId,
    ) -> AnalysisResult<Arc<[Reference]>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCallers;

impl<I: SymbolIndex + ?Sized> CallerStrategy<I> for NativeCallers {
    fn name(&self) -> &'static str {
        "native"
    }

    fn direct_references(
        &self,
        run: &mut AnalysisRun<'_, I>,
        method: &MethodId,
    ) -> AnalysisResult<Arc<[Reference]>> {
        run.native_callers(method)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceScan;

impl<I: SymbolIndex + ?Sized> CallerStrategy<I> for ReferenceScan {
    fn name(&self) -> &'static str {
        "reference-scan"
    }

    fn direct_references(
        &self,
        run: &mut AnalysisRun<'_, I>,
        method: &MethodId,
    ) -> AnalysisResult<Arc<[Reference]>> {
        run.references(&Declaration::Method(method.clone()))
    }
}

/// Pick the strategy matching what the index can do.
pub fn select_strategy<I: SymbolIndex + ?Sized>(index: &I) -> Box<dyn CallerStrategy<I>> {
    if index.supports_native_callers() {
        Box::new(NativeCallers)
    } else {
        Box::new(ReferenceScan)
    }
}

// ============================================================================
// GROUPING
// ============================================================================

/// One caller with the sites it calls from, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerGroup {
    pub caller: MethodId,
    pub sites: Vec<CodeLocation>,
}

/// Collapse references into per-caller groups.
///
/// References outside any method are dropped. A (caller, line) pair is kept
/// once. Callers past `max_callers` and sites past `max_sites` are cut.
pub fn group_references<'r>(
    refs: impl IntoIterator<Item = &'r Reference>,
    max_callers: usize,
    max_sites: usize,
) -> Vec<CallerGroup> {
    let mut groups: IndexMap<MethodId, Vec<CodeLocation>> = IndexMap::new();
    let mut seen: FxHashSet<(MethodId, u32)> = FxHashSet::default();

    for reference in refs {
        let Some(caller) = &reference.enclosing_method else {
            continue;
        };
        if !seen.insert((caller.clone(), reference.location.line())) {
            continue;
        }
        if !groups.contains_key(caller) && groups.len() >= max_callers {
            trace!("caller cap reached, dropping '{}'", caller.name);
            continue;
        }
        let sites = groups.entry(caller.clone()).or_default();
        if sites.len() < max_sites {
            sites.push(reference.location);
        }
    }

    groups
        .into_iter()
        .map(|(caller, sites)| CallerGroup { caller, sites })
        .collect()
}

/// Methods whose call sites count as calls to `method`: the method itself,
/// its overrides when it is abstract or an interface method, and the
/// methods it overrides.
pub fn dispatch_targets<I: SymbolIndex + ?Sized>(
    run: &mut AnalysisRun<'_, I>,
    method: &MethodId,
) -> AnalysisResult<Vec<MethodId>> {
    let mut targets = vec![method.clone()];
    if run.index().is_abstract_method(method) {
        targets.extend(run.overrides(method)?.iter().cloned());
    }
    targets.extend(run.super_methods(method)?.iter().cloned());

    let mut seen = FxHashSet::default();
    targets.retain(|m| seen.insert(m.clone()));
    Ok(targets)
}

/// All callers of `method` through the strategy, dispatch-expanded and
/// grouped.
pub fn callers_of<I: SymbolIndex + ?Sized>(
    run: &mut AnalysisRun<'_, I>,
    strategy: &dyn CallerStrategy<I>,
    method: &MethodId,
) -> AnalysisResult<Vec<CallerGroup>> {
    let mut refs: Vec<Reference> = Vec::new();
    for target in dispatch_targets(run, method)? {
        refs.extend(strategy.direct_references(run, &target)?.iter().cloned());
    }
    let config = run.config();
    Ok(group_references(
        &refs,
        config.max_callers,
        config.max_sites_per_caller,
    ))
}
