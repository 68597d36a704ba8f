//! # fieldtrace
//!
//! Field lineage analysis for object-mapping codebases: given one field of
//! a class, find the fields it is copied to through mapping-framework calls,
//! and the tree of callers that reach it, up to application entry points.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! interchange → JSON snapshots, configuration and results (feature "interchange")
//!   ↓
//! analysis    → Mapping sites, field relations, call hierarchies, host
//!   ↓
//! hir         → Declarations, method bodies, SymbolIndex, ProjectIndex
//!   ↓
//! base        → Primitives (FileId, Position, CodeLocation)
//! ```

// ============================================================================
// MODULES (dependency order: base → hir → analysis → interchange)
// ============================================================================

/// Foundation types: FileId, Position, CodeLocation
pub mod base;

/// Semantic model: declarations and the symbol index contract
pub mod hir;

/// Field lineage: mapping relations and call hierarchies
pub mod analysis;

/// JSON interchange: project snapshots, configuration, results
#[cfg(feature = "interchange")]
pub mod interchange;

// Re-export foundation types
pub use base::{CodeLocation, FileId, Position};

// Re-export the entry points and what they speak
pub use analysis::{
    AnalysisConfig, AnalysisError, AnalysisHost, AnalysisResult, CallNode, MappingRelation,
    NodeCategory, RelationKind, analyze_call_hierarchy, analyze_mapping_relations,
};
pub use hir::{FieldRef, MethodId, ProjectBuilder, ProjectIndex, SymbolIndex, TypeId};

// Cancellation is part of every entry point's signature
pub use tokio_util::sync::CancellationToken;
