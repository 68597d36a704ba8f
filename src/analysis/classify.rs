//! Node classification.
//!
//! Classification is a pure function of a method's owner name, owner
//! annotations, method name, method annotations and shape. When several
//! rules match, the first in this order wins:
//!
//! ```text
//! ENTRY_POINT > DATA_ACCESS > SERVICE > ACCESSOR_GET / ACCESSOR_SET
//!             > CONSTRUCTOR > PLAIN
//! ```
//!
//! MAPPING and FIELD are never produced here; the hierarchy builder assigns
//! them to the nodes it synthesises.

use std::fmt;

use smol_str::SmolStr;

use super::config::NamingConventions;
use crate::hir::{MethodId, SymbolIndex, simple_name_of};

/// Role of a node in a call hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum NodeCategory {
    /// Externally triggered: request handlers, listeners, `main`.
    EntryPoint,
    Service,
    DataAccess,
    AccessorGet,
    AccessorSet,
    Constructor,
    Plain,
    /// A mapping transform bridging two fields.
    Mapping,
    /// A traced field.
    Field,
}

impl NodeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeCategory::EntryPoint => "ENTRY_POINT",
            NodeCategory::Service => "SERVICE",
            NodeCategory::DataAccess => "DATA_ACCESS",
            NodeCategory::AccessorGet => "ACCESSOR_GET",
            NodeCategory::AccessorSet => "ACCESSOR_SET",
            NodeCategory::Constructor => "CONSTRUCTOR",
            NodeCategory::Plain => "PLAIN",
            NodeCategory::Mapping => "MAPPING",
            NodeCategory::Field => "FIELD",
        }
    }

    /// Entry points end a branch.
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeCategory::EntryPoint)
    }
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the classifier looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodProfile<'a> {
    /// Qualified or simple owner name.
    pub owner: &'a str,
    pub owner_annotations: &'a [SmolStr],
    pub name: &'a str,
    pub annotations: &'a [SmolStr],
    pub param_count: usize,
    pub is_constructor: bool,
}

impl<'a> MethodProfile<'a> {
    /// Profile of a project method. Unknown declarations profile by name
    /// alone.
    pub fn of<I: SymbolIndex + ?Sized>(index: &'a I, method: &'a MethodId) -> Self {
        let owner = index.type_decl(method.owner);
        let decl = index.method_decl(method);
        Self {
            owner: owner.map(|t| t.qualified_name.as_str()).unwrap_or_default(),
            owner_annotations: owner.map(|t| t.annotations.as_slice()).unwrap_or_default(),
            name: method.name.as_str(),
            annotations: decl.map(|m| m.annotations.as_slice()).unwrap_or_default(),
            param_count: method.arity(),
            is_constructor: decl.is_some_and(|m| m.is_constructor),
        }
    }
}

pub fn classify(profile: &MethodProfile<'_>, conventions: &NamingConventions) -> NodeCategory {
    let owner = simple_name_of(profile.owner);
    let owner_marked =
        |names: &[SmolStr]| profile.owner_annotations.iter().any(|a| names.contains(a));
    let owner_suffixed =
        |suffixes: &[SmolStr]| suffixes.iter().any(|s| owner.ends_with(s.as_str()));

    let entry_point = owner_suffixed(&conventions.entry_point_owner_suffixes)
        || owner_marked(&conventions.entry_point_owner_annotations)
        || profile
            .annotations
            .iter()
            .any(|a| conventions.entry_point_method_annotations.contains(a))
        || conventions
            .entry_point_method_names
            .iter()
            .any(|n| n == profile.name);
    if entry_point {
        return NodeCategory::EntryPoint;
    }

    if owner_suffixed(&conventions.data_access_owner_suffixes)
        || owner_marked(&conventions.data_access_owner_annotations)
    {
        return NodeCategory::DataAccess;
    }

    if owner_suffixed(&conventions.service_owner_suffixes)
        || owner_marked(&conventions.service_owner_annotations)
    {
        return NodeCategory::Service;
    }

    if profile.param_count == 0 && is_getter_name(profile.name) {
        return NodeCategory::AccessorGet;
    }
    if profile.param_count == 1 && is_setter_name(profile.name) {
        return NodeCategory::AccessorSet;
    }

    if profile.is_constructor || profile.name == owner {
        return NodeCategory::Constructor;
    }

    NodeCategory::Plain
}

pub fn is_getter_name(name: &str) -> bool {
    has_bean_prefix(name, "get") || has_bean_prefix(name, "is")
}

pub fn is_setter_name(name: &str) -> bool {
    has_bean_prefix(name, "set")
}

/// `prefix` followed by an upper-case letter (`getX`, not `getaway`).
fn has_bean_prefix(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_uppercase)
}
