//! Interchange tests
//!
//! Loading project snapshots and configuration from JSON, and writing
//! results back out.

pub mod tests_config;
pub mod tests_snapshot;
