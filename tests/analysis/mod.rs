//! Analysis layer tests
//!
//! End-to-end runs of the public entry points over small projects:
//! - Mapping relations (direct, nested, unrelated types)
//! - Call hierarchies up to entry points
//! - Accessor synthesis
//! - Structural properties of trees
//! - Failure containment and cancellation
//! - Background analyses through the host

pub mod tests_accessors;
pub mod tests_failures;
pub mod tests_host;
pub mod tests_order_scenario;
pub mod tests_properties;
