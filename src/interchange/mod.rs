//! JSON interchange for project snapshots, configuration and results.
//!
//! External indexers hand the analysis a [`ProjectSnapshot`]; tools embedding
//! the analysis tune it with an [`AnalysisConfig`] document. Results go back
//! out as JSON as well.
//!
//! ```text
//! ┌──────────────────┐   ┌──────────────────┐
//! │ snapshot.json    │   │ config.json      │
//! └────────┬─────────┘   └────────┬─────────┘
//!          │ load_project         │ load_config
//!          ▼                      ▼
//! ┌──────────────────┐   ┌──────────────────┐
//! │ ProjectIndex     │   │ AnalysisConfig   │
//! └────────┬─────────┘   └────────┬─────────┘
//!          └──────────┬───────────┘
//!                     ▼
//!            analysis entry points
//!                     │ write_call_tree / write_relations
//!                     ▼
//!                    JSON
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use fieldtrace::interchange::{load_config_file, load_project_file};
//!
//! let index = load_project_file("snapshot.json")?;
//! let config = load_config_file("fieldtrace.json")?;
//! ```

mod error;
mod snapshot;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use error::InterchangeError;
pub use snapshot::{
    AccessSnapshot, CallSnapshot, ExprSnapshot, FieldSnapshot, KindSnapshot, MethodSnapshot,
    ProjectSnapshot, StatementSnapshot, TypeSnapshot,
};

use crate::analysis::{AnalysisConfig, CallNode, MappingRelation, RelationKind};
use crate::hir::{ProjectIndex, SymbolIndex};

/// Parse a project snapshot and build its index.
pub fn load_project(json: &str) -> Result<ProjectIndex, InterchangeError> {
    let snapshot: ProjectSnapshot = serde_json::from_str(json)
        .map_err(|e| InterchangeError::json(format!("Parse error: {e}")))?;
    let type_count = snapshot.types.len();
    let index = snapshot.into_builder()?.build();
    debug!("loaded project snapshot with {} types", type_count);
    Ok(index)
}

pub fn load_project_file(path: impl AsRef<Path>) -> Result<ProjectIndex, InterchangeError> {
    let json = std::fs::read_to_string(path.as_ref())?;
    load_project(&json)
}

/// Parse an analysis configuration. Missing keys keep their defaults.
pub fn load_config(json: &str) -> Result<AnalysisConfig, InterchangeError> {
    let config: AnalysisConfig = serde_json::from_str(json)
        .map_err(|e| InterchangeError::json(format!("Parse error: {e}")))?;
    validate_config(&config)?;
    Ok(config)
}

pub fn load_config_file(path: impl AsRef<Path>) -> Result<AnalysisConfig, InterchangeError> {
    let json = std::fs::read_to_string(path.as_ref())?;
    load_config(&json)
}

fn validate_config(config: &AnalysisConfig) -> Result<(), InterchangeError> {
    if config.max_callers == 0 || config.max_sites_per_caller == 0 {
        return Err(InterchangeError::invalid_config(
            "fan-out caps must be at least 1",
        ));
    }
    if config.max_nodes == 0 {
        return Err(InterchangeError::invalid_config(
            "node budget must be at least 1",
        ));
    }
    if config.mapping.methods.is_empty() {
        return Err(InterchangeError::invalid_config(
            "mapping vocabulary has no transform methods",
        ));
    }
    Ok(())
}

// ============================================================================
// RESULTS
// ============================================================================

/// A [`MappingRelation`] with its types spelled out by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub source_type: String,
    pub source_field: String,
    pub target_type: String,
    pub target_field: String,
    pub kind: RelationKind,
}

impl RelationRecord {
    pub fn new<I: SymbolIndex + ?Sized>(index: &I, relation: &MappingRelation) -> Self {
        Self {
            source_type: index.type_name(relation.source_type).to_string(),
            source_field: relation.source_field.name.to_string(),
            target_type: index.type_name(relation.target_type).to_string(),
            target_field: relation.target_field.name.to_string(),
            kind: relation.kind,
        }
    }
}

/// Serialize relations as a JSON array of [`RelationRecord`]s.
pub fn write_relations<'r, I: SymbolIndex + ?Sized>(
    index: &I,
    relations: impl IntoIterator<Item = &'r MappingRelation>,
) -> Result<String, InterchangeError> {
    let records: Vec<RelationRecord> = relations
        .into_iter()
        .map(|r| RelationRecord::new(index, r))
        .collect();
    serde_json::to_string_pretty(&records)
        .map_err(|e| InterchangeError::json(format!("Serialization error: {e}")))
}

/// Serialize a call tree. Code locations are not written.
pub fn write_call_tree(tree: &CallNode) -> Result<String, InterchangeError> {
    serde_json::to_string_pretty(tree)
        .map_err(|e| InterchangeError::json(format!("Serialization error: {e}")))
}
