//! Declarations held by a symbol index.
//!
//! These are the shapes the analysis reads: types with their fields and
//! methods, and method bodies reduced to the call expressions and field
//! accesses they contain.

use std::borrow::Cow;

use smol_str::SmolStr;

use super::ids::{FieldRef, MethodId, TypeId};
use crate::base::{CodeLocation, FileId};

// ============================================================================
// TYPE REFERENCES
// ============================================================================

/// A type as written at a use site, e.g. `java.util.List<com.acme.OrderDto>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    text: SmolStr,
}

impl TypeRef {
    pub fn new(text: impl Into<SmolStr>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The type with every generic argument list removed.
    ///
    /// `java.util.Map<K, java.util.List<V>>` becomes `java.util.Map`,
    /// `Foo<Bar>[]` becomes `Foo[]`.
    pub fn erased(&self) -> Cow<'_, str> {
        let text = self.text.trim();
        if !text.contains('<') {
            return Cow::Borrowed(text);
        }
        let mut out = String::with_capacity(text.len());
        let mut depth = 0usize;
        for ch in text.chars() {
            match ch {
                '<' => depth += 1,
                '>' => depth = depth.saturating_sub(1),
                _ if depth == 0 => out.push(ch),
                _ => {}
            }
        }
        Cow::Owned(out.trim().to_string())
    }

    /// Element type of an array or a single-argument generic, if any.
    ///
    /// `Foo[]` → `Foo`, `java.util.List<Foo>` → `Foo`,
    /// `java.util.Set<? extends Foo>` → `Foo`. Multi-argument generics such as
    /// maps have no single element type.
    pub fn element_type(&self) -> Option<TypeRef> {
        let text = self.text.trim();
        if let Some(component) = text.strip_suffix("[]") {
            return Some(TypeRef::new(component.trim()));
        }
        let open = text.find('<')?;
        let close = text.rfind('>')?;
        if close <= open {
            return None;
        }
        let args = split_top_level(&text[open + 1..close]);
        if args.len() != 1 {
            return None;
        }
        let arg = args[0].trim();
        let arg = arg
            .strip_prefix("? extends ")
            .or_else(|| arg.strip_prefix("? super "))
            .unwrap_or(arg)
            .trim();
        if arg.is_empty() || arg == "?" {
            return None;
        }
        Some(TypeRef::new(arg))
    }

    /// True only for the primitive `boolean`, not the boxed `java.lang.Boolean`.
    pub fn is_primitive_boolean(&self) -> bool {
        self.text.trim() == "boolean"
    }

    /// Simple name of the erased type (`com.acme.OrderDto` → `OrderDto`).
    pub fn simple_name(&self) -> SmolStr {
        let erased = self.erased();
        SmolStr::new(simple_name_of(&erased))
    }
}

impl From<&str> for TypeRef {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

fn split_top_level(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, ch) in args.char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&args[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&args[start..]);
    parts
}

/// Last segment of a dotted (or `$`-nested) qualified name.
pub fn simple_name_of(qualified: &str) -> &str {
    qualified
        .rsplit(|c: char| c == '.' || c == '$')
        .next()
        .unwrap_or(qualified)
}

// ============================================================================
// DECLARATIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    AbstractClass,
    Interface,
    Enum,
    Record,
}

impl TypeKind {
    pub fn is_abstract(&self) -> bool {
        matches!(self, TypeKind::AbstractClass | TypeKind::Interface)
    }
}

/// A class, interface, enum or record.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub id: TypeId,
    pub qualified_name: SmolStr,
    pub kind: TypeKind,
    pub super_class: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    /// Annotation names without the `@`, e.g. `RestController`.
    pub annotations: Vec<SmolStr>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<MethodDecl>,
    pub location: CodeLocation,
}

impl TypeDecl {
    pub fn simple_name(&self) -> &str {
        simple_name_of(&self.qualified_name)
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, id: &MethodId) -> Option<&MethodDecl> {
        self.methods.iter().find(|m| m.id.same_signature(id))
    }

    /// Declared supertypes, superclass first.
    pub fn supertypes(&self) -> impl Iterator<Item = &TypeRef> {
        self.super_class.iter().chain(self.interfaces.iter())
    }
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: SmolStr,
    pub ty: TypeRef,
    pub is_static: bool,
    pub location: CodeLocation,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub id: MethodId,
    pub return_type: Option<TypeRef>,
    pub is_abstract: bool,
    pub is_constructor: bool,
    pub is_static: bool,
    pub annotations: Vec<SmolStr>,
    pub body: Vec<BodyItem>,
    pub location: CodeLocation,
}

impl MethodDecl {
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a == name)
    }

    /// Every call expression in the body, including calls nested in
    /// receivers and arguments, in source order (outer call first).
    pub fn calls(&self) -> Vec<&CallExpr> {
        let mut out = Vec::new();
        for item in &self.body {
            if let BodyItem::Call(call) = item {
                call.collect_into(&mut out);
            }
        }
        out
    }
}

// ============================================================================
// METHOD BODIES
// ============================================================================

/// A statement-level fact about a method body.
#[derive(Debug, Clone)]
pub enum BodyItem {
    Call(CallExpr),
    FieldAccess(FieldAccess),
}

/// A read or write of a field, as written in source.
#[derive(Debug, Clone)]
pub struct FieldAccess {
    /// Static type of the object whose field is accessed.
    pub owner: TypeRef,
    pub name: SmolStr,
    pub is_write: bool,
    /// Filled in by the index once the owner resolves.
    pub resolved: Option<FieldRef>,
    pub location: CodeLocation,
}

/// What a call resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callee {
    /// Qualified name of the type declaring the invoked method. May name a
    /// library type the index knows nothing else about.
    pub owner: SmolStr,
    /// The project method, when the owner is part of the project.
    pub method: Option<MethodId>,
    /// Parameter types requested by an explicit resolution hint.
    pub params: Option<Vec<SmolStr>>,
}

impl Callee {
    pub fn external(owner: impl Into<SmolStr>) -> Self {
        Self {
            owner: owner.into(),
            method: None,
            params: None,
        }
    }
}

/// A method call expression such as `facade.map(dto, OrderEntity.class)`.
#[derive(Debug, Clone)]
pub struct CallExpr {
    /// Invoked member name (`map`).
    pub member: SmolStr,
    pub receiver: Option<Box<Expr>>,
    pub args: Vec<Expr>,
    pub callee: Option<Callee>,
    /// Static return type, when known.
    pub return_type: Option<TypeRef>,
    pub location: CodeLocation,
}

impl CallExpr {
    pub fn new(member: impl Into<SmolStr>) -> Self {
        Self {
            member: member.into(),
            receiver: None,
            args: Vec::new(),
            callee: None,
            return_type: None,
            location: CodeLocation::default(),
        }
    }

    /// The call expression the receiver is, if the receiver is itself a call.
    pub fn receiver_call(&self) -> Option<&CallExpr> {
        match self.receiver.as_deref() {
            Some(Expr::Call(call)) => Some(call),
            _ => None,
        }
    }

    pub fn receiver_type(&self) -> Option<&TypeRef> {
        self.receiver.as_deref().and_then(Expr::static_type)
    }

    fn collect_into<'a>(&'a self, out: &mut Vec<&'a CallExpr>) {
        out.push(self);
        if let Some(Expr::Call(inner)) = self.receiver.as_deref() {
            inner.collect_into(out);
        }
        for arg in &self.args {
            if let Expr::Call(inner) = arg {
                inner.collect_into(out);
            }
        }
    }

    pub(crate) fn for_each_mut(&mut self, f: &mut impl FnMut(&mut CallExpr)) {
        f(self);
        if let Some(Expr::Call(inner)) = self.receiver.as_deref_mut() {
            inner.for_each_mut(f);
        }
        for arg in &mut self.args {
            if let Expr::Call(inner) = arg {
                inner.for_each_mut(f);
            }
        }
    }
}

/// An expression in receiver or argument position.
#[derive(Debug, Clone)]
pub enum Expr {
    /// `Foo.class`
    ClassLiteral(TypeRef),
    /// A local, parameter or field read with its declared type if known.
    Variable {
        name: SmolStr,
        declared_type: Option<TypeRef>,
    },
    /// A nested call; its static type is the call's return type.
    Call(Box<CallExpr>),
    /// `this`, typed as the enclosing class.
    This,
    /// Anything the index could not describe.
    Other,
}

impl Expr {
    pub fn class_literal(ty: impl Into<SmolStr>) -> Self {
        Expr::ClassLiteral(TypeRef::new(ty))
    }

    pub fn var(name: impl Into<SmolStr>, ty: impl Into<SmolStr>) -> Self {
        Expr::Variable {
            name: name.into(),
            declared_type: Some(TypeRef::new(ty)),
        }
    }

    pub fn untyped_var(name: impl Into<SmolStr>) -> Self {
        Expr::Variable {
            name: name.into(),
            declared_type: None,
        }
    }

    pub fn call(call: CallExpr) -> Self {
        Expr::Call(Box::new(call))
    }

    /// Static type of the expression's value. Class literals have type
    /// `Class<T>`, so they report none here.
    pub fn static_type(&self) -> Option<&TypeRef> {
        match self {
            Expr::Variable { declared_type, .. } => declared_type.as_ref(),
            Expr::Call(call) => call.return_type.as_ref(),
            Expr::ClassLiteral(_) | Expr::This | Expr::Other => None,
        }
    }
}

pub(crate) fn stamp_file(items: &mut [BodyItem], file: FileId) {
    for item in items {
        match item {
            BodyItem::Call(call) => call.for_each_mut(&mut |c| c.location.file = file),
            BodyItem::FieldAccess(access) => access.location.file = file,
        }
    }
}
