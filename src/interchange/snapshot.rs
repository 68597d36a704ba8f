//! JSON project snapshots.
//!
//! A snapshot is the declarations an external indexer extracted from a
//! codebase, written as plain data:
//!
//! ```json
//! {
//!   "native_callers": true,
//!   "types": [{
//!     "name": "com.acme.OrderService",
//!     "annotations": ["Service"],
//!     "methods": [{
//!       "name": "save",
//!       "params": ["com.acme.OrderDto"],
//!       "line": 12,
//!       "body": [{
//!         "kind": "call",
//!         "member": "map",
//!         "receiver": { "kind": "var", "name": "facade", "type": "ma.glasnost.orika.MapperFacade" },
//!         "args": [
//!           { "kind": "var", "name": "dto", "type": "com.acme.OrderDto" },
//!           { "kind": "class", "type": "com.acme.OrderEntity" }
//!         ],
//!         "line": 14
//!       }]
//!     }]
//!   }]
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::error::InterchangeError;
use crate::hir::{CallBuilder, Expr, MethodBuilder, ProjectBuilder, TypeBuilder, TypeKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    /// Whether the loaded index answers caller queries from its own table.
    #[serde(default = "default_native_callers")]
    pub native_callers: bool,
    #[serde(default)]
    pub types: Vec<TypeSnapshot>,
}

fn default_native_callers() -> bool {
    true
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindSnapshot {
    #[default]
    Class,
    AbstractClass,
    Interface,
    Enum,
    Record,
}

impl From<KindSnapshot> for TypeKind {
    fn from(kind: KindSnapshot) -> Self {
        match kind {
            KindSnapshot::Class => TypeKind::Class,
            KindSnapshot::AbstractClass => TypeKind::AbstractClass,
            KindSnapshot::Interface => TypeKind::Interface,
            KindSnapshot::Enum => TypeKind::Enum,
            KindSnapshot::Record => TypeKind::Record,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeSnapshot {
    /// Fully qualified name.
    pub name: String,
    #[serde(default)]
    pub kind: KindSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default)]
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldSnapshot>,
    #[serde(default)]
    pub methods: Vec<MethodSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MethodSnapshot {
    /// Ignored for constructors, which take the owner's simple name.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default, rename = "constructor")]
    pub is_constructor: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub body: Vec<StatementSnapshot>,
}

/// One fact about a method body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StatementSnapshot {
    Call(CallSnapshot),
    Read(AccessSnapshot),
    Write(AccessSnapshot),
}

/// `owner.field`; an empty owner is the enclosing type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessSnapshot {
    #[serde(default)]
    pub owner: String,
    pub field: String,
    #[serde(default)]
    pub line: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallSnapshot {
    pub member: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<ExprSnapshot>,
    #[serde(default)]
    pub args: Vec<ExprSnapshot>,
    /// Declaring type of the invoked method, when the indexer resolved it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callee: Option<String>,
    /// Exact overload of `callee`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callee_params: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    #[serde(default)]
    pub line: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExprSnapshot {
    Class {
        #[serde(rename = "type")]
        ty: String,
    },
    Var {
        name: String,
        #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
        ty: Option<String>,
    },
    Call(Box<CallSnapshot>),
    This,
    Other,
}

// ============================================================================
// CONVERSION
// ============================================================================

impl ProjectSnapshot {
    /// Validate the snapshot and turn it into a builder.
    pub fn into_builder(self) -> Result<ProjectBuilder, InterchangeError> {
        let mut builder = ProjectBuilder::new().native_callers(self.native_callers);
        for ty in self.types {
            builder.add_type(ty.into_builder()?);
        }
        Ok(builder)
    }
}

impl TypeSnapshot {
    fn into_builder(self) -> Result<TypeBuilder, InterchangeError> {
        if self.name.trim().is_empty() {
            return Err(InterchangeError::invalid_type("type without a name"));
        }

        let mut ty = TypeBuilder::new(self.name.as_str(), self.kind.into()).at(self.line);
        if let Some(file) = self.file {
            ty = ty.in_file(file);
        }
        if let Some(super_class) = self.extends {
            ty = ty.extends(super_class);
        }
        for interface in self.implements {
            ty = ty.implements(interface);
        }
        for annotation in self.annotations {
            ty = ty.annotated(annotation);
        }
        for field in self.fields {
            if field.name.is_empty() {
                return Err(InterchangeError::invalid_member(format!(
                    "unnamed field on '{}'",
                    self.name
                )));
            }
            ty = if field.is_static {
                ty.static_field(field.name, field.ty)
            } else {
                ty.field(field.name, field.ty)
            };
        }
        for method in self.methods {
            ty = ty.method(method.into_builder(&self.name)?);
        }
        Ok(ty)
    }
}

impl MethodSnapshot {
    fn into_builder(self, owner: &str) -> Result<MethodBuilder, InterchangeError> {
        let mut method = if self.is_constructor {
            MethodBuilder::constructor()
        } else if self.name.is_empty() {
            return Err(InterchangeError::invalid_member(format!(
                "unnamed method on '{owner}'"
            )));
        } else {
            MethodBuilder::new(self.name)
        };

        method = method.at(self.line);
        for param in self.params {
            method = method.param(param);
        }
        if let Some(returns) = self.returns {
            method = method.returns(returns);
        }
        if self.is_abstract {
            method = method.abstract_method();
        }
        if self.is_static {
            method = method.static_method();
        }
        for annotation in self.annotations {
            method = method.annotated(annotation);
        }
        for statement in self.body {
            method = match statement {
                StatementSnapshot::Call(call) => method.call(call.into_builder()),
                StatementSnapshot::Read(access) => {
                    method.reads(access.owner, access.field, access.line)
                }
                StatementSnapshot::Write(access) => {
                    method.writes(access.owner, access.field, access.line)
                }
            };
        }
        Ok(method)
    }
}

impl CallSnapshot {
    fn into_builder(self) -> CallBuilder {
        let mut call = CallBuilder::new(self.member);
        if let Some(receiver) = self.receiver {
            call = call.on(receiver.into_expr());
        }
        for arg in self.args {
            call = call.arg(arg.into_expr());
        }
        if let Some(returns) = self.returns {
            call = call.returns(returns);
        }
        call = match (self.callee, self.callee_params) {
            (Some(owner), Some(params)) => call.resolves_to(owner, params),
            (Some(owner), None) => call.callee(owner),
            (None, _) => call,
        };
        match self.column {
            Some(column) => call.at_column(self.line, column),
            None => call.at(self.line),
        }
    }
}

impl ExprSnapshot {
    fn into_expr(self) -> Expr {
        match self {
            ExprSnapshot::Class { ty } => Expr::class_literal(ty),
            ExprSnapshot::Var { name, ty: Some(ty) } => Expr::var(name, ty),
            ExprSnapshot::Var { name, ty: None } => Expr::untyped_var(name),
            ExprSnapshot::Call(call) => call.into_builder().into_expr(),
            ExprSnapshot::This => Expr::This,
            ExprSnapshot::Other => Expr::Other,
        }
    }
}
