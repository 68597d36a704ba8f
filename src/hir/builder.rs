//! Fluent construction of a [`ProjectIndex`].
//!
//! ## Usage
//!
//! ```ignore
//! let index = ProjectBuilder::new()
//!     .with_type(TypeBuilder::class("com.acme.OrderDto").field("amount", "java.math.BigDecimal"))
//!     .with_type(
//!         TypeBuilder::class("com.acme.OrderService").annotated("Service").method(
//!             MethodBuilder::new("save").param("com.acme.OrderDto").at(12).call(
//!                 CallBuilder::new("map")
//!                     .on_var("facade", "ma.glasnost.orika.MapperFacade")
//!                     .arg(Expr::var("dto", "com.acme.OrderDto"))
//!                     .arg(Expr::class_literal("com.acme.OrderEntity"))
//!                     .at(14),
//!             ),
//!         ),
//!     )
//!     .build();
//! ```

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::ids::{MethodId, TypeId};
use super::model::{
    BodyItem, CallExpr, Callee, Expr, FieldAccess, FieldDecl, MethodDecl, TypeDecl, TypeKind,
    TypeRef, simple_name_of, stamp_file,
};
use super::project::ProjectIndex;
use crate::base::{CodeLocation, FileId};

/// Collects type declarations and produces an immutable [`ProjectIndex`].
#[derive(Debug, Default)]
pub struct ProjectBuilder {
    types: Vec<TypeBuilder>,
    native_callers: bool,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            native_callers: true,
        }
    }

    pub fn with_type(mut self, ty: TypeBuilder) -> Self {
        self.types.push(ty);
        self
    }

    pub fn add_type(&mut self, ty: TypeBuilder) -> &mut Self {
        self.types.push(ty);
        self
    }

    /// Whether the built index serves `callers_of` natively (default: yes).
    pub fn native_callers(mut self, enabled: bool) -> Self {
        self.native_callers = enabled;
        self
    }

    pub fn build(self) -> ProjectIndex {
        let mut files: IndexMap<SmolStr, FileId> = IndexMap::new();
        let mut decls = Vec::with_capacity(self.types.len());

        for (i, ty) in self.types.into_iter().enumerate() {
            let path = ty.file_path();
            let next = FileId::new(files.len() as u32);
            let file = *files.entry(path).or_insert(next);
            decls.push(ty.finish(TypeId::new(i as u32), file));
        }

        ProjectIndex::new(files.into_keys().collect(), decls, self.native_callers)
    }
}

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct TypeBuilder {
    qualified_name: SmolStr,
    kind: TypeKind,
    super_class: Option<TypeRef>,
    interfaces: Vec<TypeRef>,
    annotations: Vec<SmolStr>,
    fields: Vec<(SmolStr, TypeRef, bool)>,
    methods: Vec<MethodBuilder>,
    file: Option<SmolStr>,
    line: u32,
}

impl TypeBuilder {
    pub fn new(qualified_name: impl Into<SmolStr>, kind: TypeKind) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            kind,
            super_class: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            file: None,
            line: 0,
        }
    }

    pub fn class(qualified_name: impl Into<SmolStr>) -> Self {
        Self::new(qualified_name, TypeKind::Class)
    }

    pub fn abstract_class(qualified_name: impl Into<SmolStr>) -> Self {
        Self::new(qualified_name, TypeKind::AbstractClass)
    }

    pub fn interface(qualified_name: impl Into<SmolStr>) -> Self {
        Self::new(qualified_name, TypeKind::Interface)
    }

    pub fn extends(mut self, ty: impl Into<SmolStr>) -> Self {
        self.super_class = Some(TypeRef::new(ty));
        self
    }

    pub fn implements(mut self, ty: impl Into<SmolStr>) -> Self {
        self.interfaces.push(TypeRef::new(ty));
        self
    }

    pub fn annotated(mut self, annotation: impl Into<SmolStr>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn field(mut self, name: impl Into<SmolStr>, ty: impl Into<SmolStr>) -> Self {
        self.fields.push((name.into(), TypeRef::new(ty), false));
        self
    }

    pub fn static_field(mut self, name: impl Into<SmolStr>, ty: impl Into<SmolStr>) -> Self {
        self.fields.push((name.into(), TypeRef::new(ty), true));
        self
    }

    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.methods.push(method);
        self
    }

    /// Source file; defaults to a path derived from the qualified name.
    pub fn in_file(mut self, path: impl Into<SmolStr>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn at(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    fn file_path(&self) -> SmolStr {
        self.file.clone().unwrap_or_else(|| {
            let outer = self
                .qualified_name
                .split('$')
                .next()
                .unwrap_or(&self.qualified_name);
            SmolStr::new(format!("{}.java", outer.replace('.', "/")))
        })
    }

    fn finish(self, id: TypeId, file: FileId) -> TypeDecl {
        let simple = SmolStr::new(simple_name_of(&self.qualified_name));
        let fields = self
            .fields
            .into_iter()
            .enumerate()
            .map(|(i, (name, ty, is_static))| FieldDecl {
                name,
                ty,
                is_static,
                location: CodeLocation::new(file, self.line + 1 + i as u32, 4),
            })
            .collect();
        let methods = self
            .methods
            .into_iter()
            .map(|m| m.finish(id, &simple, file))
            .collect();

        TypeDecl {
            id,
            qualified_name: self.qualified_name,
            kind: self.kind,
            super_class: self.super_class,
            interfaces: self.interfaces,
            annotations: self.annotations,
            fields,
            methods,
            location: CodeLocation::new(file, self.line, 0),
        }
    }
}

// ============================================================================
// METHODS
// ============================================================================

#[derive(Debug, Clone)]
pub struct MethodBuilder {
    name: SmolStr,
    params: Vec<SmolStr>,
    return_type: Option<TypeRef>,
    is_abstract: bool,
    is_constructor: bool,
    is_static: bool,
    annotations: Vec<SmolStr>,
    body: Vec<BodyItem>,
    line: u32,
}

impl MethodBuilder {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            return_type: None,
            is_abstract: false,
            is_constructor: false,
            is_static: false,
            annotations: Vec::new(),
            body: Vec::new(),
            line: 0,
        }
    }

    /// A constructor; its name becomes the owner's simple name.
    pub fn constructor() -> Self {
        let mut method = Self::new("");
        method.is_constructor = true;
        method
    }

    pub fn param(mut self, ty: impl Into<SmolStr>) -> Self {
        self.params.push(ty.into());
        self
    }

    pub fn returns(mut self, ty: impl Into<SmolStr>) -> Self {
        self.return_type = Some(TypeRef::new(ty));
        self
    }

    pub fn abstract_method(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn annotated(mut self, annotation: impl Into<SmolStr>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    pub fn at(mut self, line: u32) -> Self {
        self.line = line;
        self
    }

    pub fn call(mut self, call: CallBuilder) -> Self {
        self.body.push(BodyItem::Call(call.build()));
        self
    }

    /// Read `owner.field`; an empty owner means the enclosing type.
    pub fn reads(self, owner: impl Into<SmolStr>, field: impl Into<SmolStr>, line: u32) -> Self {
        self.access(owner.into(), field.into(), false, line)
    }

    pub fn writes(self, owner: impl Into<SmolStr>, field: impl Into<SmolStr>, line: u32) -> Self {
        self.access(owner.into(), field.into(), true, line)
    }

    pub fn statement(mut self, item: BodyItem) -> Self {
        self.body.push(item);
        self
    }

    fn access(mut self, owner: SmolStr, name: SmolStr, is_write: bool, line: u32) -> Self {
        self.body.push(BodyItem::FieldAccess(FieldAccess {
            owner: TypeRef::new(owner),
            name,
            is_write,
            resolved: None,
            location: CodeLocation::new(FileId::default(), line, 8),
        }));
        self
    }

    fn finish(self, owner: TypeId, owner_simple_name: &str, file: FileId) -> MethodDecl {
        let name = if self.is_constructor {
            SmolStr::new(owner_simple_name)
        } else {
            self.name
        };
        let mut body = self.body;
        stamp_file(&mut body, file);
        MethodDecl {
            id: MethodId::new(owner, name, self.params),
            return_type: self.return_type,
            is_abstract: self.is_abstract,
            is_constructor: self.is_constructor,
            is_static: self.is_static,
            annotations: self.annotations,
            body,
            location: CodeLocation::new(file, self.line, 4),
        }
    }
}

// ============================================================================
// CALLS
// ============================================================================

#[derive(Debug, Clone)]
pub struct CallBuilder {
    call: CallExpr,
}

impl CallBuilder {
    pub fn new(member: impl Into<SmolStr>) -> Self {
        Self {
            call: CallExpr::new(member),
        }
    }

    pub fn on(mut self, receiver: Expr) -> Self {
        self.call.receiver = Some(Box::new(receiver));
        self
    }

    pub fn on_var(self, name: impl Into<SmolStr>, ty: impl Into<SmolStr>) -> Self {
        self.on(Expr::var(name, ty))
    }

    pub fn on_this(self) -> Self {
        self.on(Expr::This)
    }

    pub fn on_call(self, receiver: CallBuilder) -> Self {
        self.on(receiver.into_expr())
    }

    pub fn arg(mut self, arg: Expr) -> Self {
        self.call.args.push(arg);
        self
    }

    pub fn returns(mut self, ty: impl Into<SmolStr>) -> Self {
        self.call.return_type = Some(TypeRef::new(ty));
        self
    }

    /// Declare the callee's owner explicitly, e.g. for library methods.
    pub fn callee(mut self, owner: impl Into<SmolStr>) -> Self {
        self.call.callee = Some(Callee::external(owner));
        self
    }

    /// Pin resolution to the overload of `owner` with exactly `params`.
    pub fn resolves_to<P, S>(mut self, owner: impl Into<SmolStr>, params: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.call.callee = Some(Callee {
            owner: owner.into(),
            method: None,
            params: Some(params.into_iter().map(Into::into).collect()),
        });
        self
    }

    pub fn at(mut self, line: u32) -> Self {
        self.call.location = CodeLocation::new(FileId::default(), line, 8);
        self
    }

    pub fn at_column(mut self, line: u32, column: u32) -> Self {
        self.call.location = CodeLocation::new(FileId::default(), line, column);
        self
    }

    pub fn build(self) -> CallExpr {
        self.call
    }

    pub fn into_expr(self) -> Expr {
        Expr::call(self.call)
    }
}

impl From<CallBuilder> for Expr {
    fn from(call: CallBuilder) -> Self {
        call.into_expr()
    }
}
