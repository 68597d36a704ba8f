//! Foundation types for the fieldtrace engine.
//!
//! This module provides the primitives shared by every layer:
//! - [`FileId`] - Interned file identifiers
//! - [`Position`], [`CodeLocation`] - Line/column positions of declarations and call sites
//!
//! This module has NO dependencies on other fieldtrace modules.

mod file_id;
mod position;

pub use file_id::FileId;
pub use position::{CodeLocation, Position};
