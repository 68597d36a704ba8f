//! High-level IR (HIR) - the project's semantic model.
//!
//! This module holds everything the analysis knows about a codebase:
//! type, field and method declarations, method bodies reduced to call
//! expressions and field accesses, and the [`SymbolIndex`] contract used to
//! query them.
//!
//! ## Key Types
//!
//! - [`TypeId`], [`FieldRef`], [`MethodId`] - value identities
//! - [`TypeDecl`], [`FieldDecl`], [`MethodDecl`] - declarations
//! - [`CallExpr`], [`Expr`] - call expressions inside method bodies
//! - [`SymbolIndex`] - the query contract (resolve, references, overrides, fields)
//! - [`ProjectIndex`] - in-memory implementation, built with [`ProjectBuilder`]
//!
//! ## Layers
//!
//! ```text
//! ProjectBuilder            ← declarations as plain data
//!     │
//!     ▼
//! ProjectIndex              ← name tables, call resolution, reverse references
//!     │
//!     ▼
//! SymbolIndex queries       ← consumed by crate::analysis
//! ```

mod builder;
mod ids;
mod index;
mod model;
mod project;

pub use builder::{CallBuilder, MethodBuilder, ProjectBuilder, TypeBuilder};
pub use ids::{FieldRef, MethodId, TypeId};
pub use index::{Declaration, IndexError, IndexResult, Reference, SymbolIndex};
pub use model::{
    BodyItem, CallExpr, Callee, Expr, FieldAccess, FieldDecl, MethodDecl, TypeDecl, TypeKind,
    TypeRef, simple_name_of,
};
pub use project::ProjectIndex;
