//! Field lineage analysis.
//!
//! Two questions can be asked about a field:
//!
//! - [`analyze_mapping_relations`]: which fields of other types is it copied
//!   to or from through mapping-framework calls?
//! - [`analyze_call_hierarchy`]: which code paths reach it, through its
//!   accessors, direct reads and mapping transforms, up to entry points?
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ AnalysisHost  (RwLock'd index, background tasks)         │
//! └─────────────────────────────┬────────────────────────────┘
//!                               │
//! ┌─────────────────────────────▼────────────────────────────┐
//! │ AnalysisRun   (index + config + cancel token + cache)    │
//! └───────┬─────────────────────┬─────────────────────┬──────┘
//!         │                     │                     │
//!   detector.rs           relations.rs          hierarchy.rs
//!   mapping sites         field relations       call tree
//!                                                     │
//!                              callers.rs  accessors.rs  classify.rs
//! ```
//!
//! Every run owns a fresh cache and a fresh run id. Cancellation is the only
//! error the entry points return; everything else is contained to the
//! branch that hit it.

mod accessors;
mod cache;
mod callers;
mod classify;
mod config;
mod detector;
mod error;
mod hierarchy;
mod host;
mod relations;
mod run;
mod tree;

use indexmap::IndexSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug_span, warn};

pub use accessors::{AccessorKind, VirtualAccessor, getter_name, setter_name, synthesize};
pub use cache::{CacheStats, ResultCache};
pub use callers::{
    CallerGroup, CallerStrategy, NativeCallers, ReferenceScan, callers_of, dispatch_targets,
    group_references, select_strategy,
};
pub use classify::{MethodProfile, NodeCategory, classify, is_getter_name, is_setter_name};
pub use config::{
    AnalysisConfig, DEFAULT_MAX_CALLERS, DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES,
    DEFAULT_MAX_SITES_PER_CALLER, MappingVocabulary, NamingConventions, matches_type_pattern,
};
pub use detector::{DetectScope, MappingSite, MappingSiteDetector};
pub use error::{AnalysisError, AnalysisResult};
pub use hierarchy::build_call_hierarchy;
pub use host::{AnalysisHost, AnalysisTask, Snapshot};
pub use relations::{FieldCrossing, MappingRelation, RelationGraph, RelationKind, resolve_relations};
pub use run::AnalysisRun;
pub use tree::{CallNode, NodeKey};

use crate::hir::{FieldRef, SymbolIndex};

/// Every mapping relation reachable from `seed`, in discovery order.
///
/// An unknown seed, or one no mapping site touches, yields an empty set.
pub fn analyze_mapping_relations<I: SymbolIndex + ?Sized>(
    index: &I,
    seed: &FieldRef,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> AnalysisResult<IndexSet<MappingRelation>> {
    let mut run = AnalysisRun::new(index, config, cancel);
    let span = debug_span!(
        "mapping_relations",
        run = %run.id(),
        seed = %format_args!("{}.{}", index.type_name(seed.declaring_type), seed.name)
    );
    let _enter = span.enter();

    match resolve_relations(&mut run, seed) {
        Ok(graph) => Ok(graph.relations),
        Err(AnalysisError::Cancelled) => Err(AnalysisError::Cancelled),
        Err(err) => {
            warn!(error = %err, "relation resolution failed, reporting none");
            Ok(IndexSet::new())
        }
    }
}

/// The call hierarchy rooted at `seed`.
///
/// An unknown seed yields a root-only tree.
pub fn analyze_call_hierarchy<I: SymbolIndex + ?Sized>(
    index: &I,
    seed: &FieldRef,
    config: &AnalysisConfig,
    cancel: &CancellationToken,
) -> AnalysisResult<CallNode> {
    let mut run = AnalysisRun::new(index, config, cancel);
    let span = debug_span!(
        "call_hierarchy",
        run = %run.id(),
        seed = %format_args!("{}.{}", index.type_name(seed.declaring_type), seed.name)
    );
    let _enter = span.enter();

    let relations = match resolve_relations(&mut run, seed) {
        Ok(graph) => graph,
        Err(AnalysisError::Cancelled) => return Err(AnalysisError::Cancelled),
        Err(err) => {
            warn!(error = %err, "relation resolution failed, tracing without mappings");
            RelationGraph::default()
        }
    };
    build_call_hierarchy(&mut run, &relations, seed)
}
