//! Shared fixtures and assertions for integration tests.

pub mod hooked_index;
pub mod project_fixtures;
pub mod tree_assertions;
