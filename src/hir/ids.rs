//! Identities for types, fields and methods.
//!
//! Identity is by value: two [`FieldRef`]s naming the same field on the same
//! declaring type are equal no matter where they were produced.

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

/// Dense identifier of a type declaration inside one symbol index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(u32);

impl TypeId {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// A field, identified by the type that declares it and its name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldRef {
    pub declaring_type: TypeId,
    pub name: SmolStr,
}

impl FieldRef {
    pub fn new(declaring_type: TypeId, name: impl Into<SmolStr>) -> Self {
        Self {
            declaring_type,
            name: name.into(),
        }
    }
}

/// A method, keyed by owner, name and parameter types so overloads stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodId {
    pub owner: TypeId,
    pub name: SmolStr,
    pub params: Arc<[SmolStr]>,
}

impl MethodId {
    pub fn new<P, S>(owner: TypeId, name: impl Into<SmolStr>, params: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self {
            owner,
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Parameter list as written in a signature, e.g. `(java.lang.String, int)`.
    pub fn param_signature(&self) -> String {
        format!("({})", self.params.join(", "))
    }

    /// True when `other` has the same name and parameter types, ignoring the owner.
    pub fn same_signature(&self, other: &MethodId) -> bool {
        self.name == other.name && self.params == other.params
    }
}
