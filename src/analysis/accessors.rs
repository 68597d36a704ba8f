//! Getter and setter synthesis.
//!
//! Accessors are often generated (Lombok and friends) and absent from the
//! index, so the names are derived from the field and searched for by name
//! whether or not a declaration exists.

use smol_str::SmolStr;

use crate::hir::{FieldRef, MethodId, SymbolIndex, TypeId, TypeRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    Getter,
    Setter,
}

/// A getter or setter for a traced field, declared or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualAccessor {
    pub kind: AccessorKind,
    /// Type the accessor is searched on (it and its subtypes).
    pub owner: TypeId,
    pub field: FieldRef,
    pub name: SmolStr,
    pub params: Vec<SmolStr>,
    /// The declared method, when the index has one.
    pub declared: Option<MethodId>,
}

impl VirtualAccessor {
    pub fn param_signature(&self) -> String {
        format!("({})", self.params.join(", "))
    }

    pub fn is_declared(&self) -> bool {
        self.declared.is_some()
    }
}

/// `getX`, or `isX` for a primitive `boolean`. A boolean field already
/// named `isX` keeps its name.
pub fn getter_name(field: &str, ty: &TypeRef) -> SmolStr {
    if ty.is_primitive_boolean() {
        if has_is_prefix(field) {
            return SmolStr::new(field);
        }
        return SmolStr::new(format!("is{}", capitalize(field)));
    }
    SmolStr::new(format!("get{}", capitalize(field)))
}

/// `setX`; a primitive boolean `isX` field gets `setX`.
pub fn setter_name(field: &str, ty: &TypeRef) -> SmolStr {
    let base = if ty.is_primitive_boolean() && has_is_prefix(field) {
        &field[2..]
    } else {
        field
    };
    SmolStr::new(format!("set{}", capitalize(base)))
}

/// The getter and setter of `field` as seen on `owner`.
pub fn synthesize<I: SymbolIndex + ?Sized>(
    index: &I,
    owner: TypeId,
    field: &FieldRef,
) -> Option<[VirtualAccessor; 2]> {
    let decl = index.field_decl(field)?;
    let getter = getter_name(&field.name, &decl.ty);
    let setter = setter_name(&field.name, &decl.ty);
    let methods = index.methods_of(owner, true);
    let declared = |name: &str, arity: usize| {
        methods
            .iter()
            .find(|m| m.name == name && m.arity() == arity)
            .cloned()
    };

    Some([
        VirtualAccessor {
            kind: AccessorKind::Getter,
            owner,
            field: field.clone(),
            declared: declared(&getter, 0),
            name: getter,
            params: Vec::new(),
        },
        VirtualAccessor {
            kind: AccessorKind::Setter,
            owner,
            field: field.clone(),
            declared: declared(&setter, 1),
            name: setter,
            params: vec![SmolStr::new(decl.ty.as_str())],
        },
    ])
}

fn has_is_prefix(field: &str) -> bool {
    field
        .strip_prefix("is")
        .and_then(|rest| rest.chars().next())
        .is_some_and(char::is_uppercase)
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
