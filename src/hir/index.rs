//! The symbol index contract the analysis is written against.
//!
//! Any host that can answer these questions about a codebase can drive the
//! engine. [`ProjectIndex`](super::ProjectIndex) is the in-memory
//! implementation shipped with the crate.

use smol_str::SmolStr;
use thiserror::Error;

use super::ids::{FieldRef, MethodId, TypeId};
use super::model::{FieldDecl, MethodDecl, TypeDecl};
use crate::base::{CodeLocation, FileId};

/// Errors reported by a symbol index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The declaration is not known to the index.
    #[error("Unknown declaration: {0}")]
    UnknownDeclaration(String),

    /// The index failed while answering (malformed source, stale state, ...).
    #[error("Index fault: {0}")]
    Fault(String),
}

pub type IndexResult<T> = Result<T, IndexError>;

/// Something references can be searched for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Declaration {
    Method(MethodId),
    Field(FieldRef),
    /// Calls named `name` on a receiver typed as `owner` (or a subtype),
    /// whether or not a method with that name is declared.
    Member { owner: TypeId, name: SmolStr },
}

/// One use of a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    /// Method whose body contains the use; `None` for initializers and
    /// other code outside any method.
    pub enclosing_method: Option<MethodId>,
    pub location: CodeLocation,
}

/// Read-only view of a project's symbols.
///
/// Results must come back in a stable order for a fixed snapshot; the
/// analysis relies on it for reproducible trees.
pub trait SymbolIndex {
    /// Resolve a qualified type name. When several declarations share the
    /// name, the first one found wins.
    fn resolve_type(&self, qualified_name: &str) -> Option<TypeId>;

    fn type_decl(&self, ty: TypeId) -> Option<&TypeDecl>;

    /// Every type in index order.
    fn all_types(&self) -> Vec<TypeId>;

    /// Instance fields of `ty`, declared ones first, then inherited ones
    /// walking up the superclass chain.
    fn fields_of(&self, ty: TypeId, include_inherited: bool) -> Vec<FieldRef>;

    fn field_decl(&self, field: &FieldRef) -> Option<&FieldDecl>;

    fn method_decl(&self, method: &MethodId) -> Option<&MethodDecl>;

    fn methods_of(&self, ty: TypeId, include_inherited: bool) -> Vec<MethodId>;

    /// Project-wide uses of a declaration.
    fn find_references(&self, target: &Declaration) -> IndexResult<Vec<Reference>>;

    /// Methods in subtypes that override or implement `method`.
    fn find_overrides_and_implementations(
        &self,
        method: &MethodId,
    ) -> IndexResult<Vec<MethodId>>;

    /// Methods in supertypes that `method` overrides or implements.
    fn find_super_methods(&self, method: &MethodId) -> IndexResult<Vec<MethodId>>;

    /// Transitive subtypes of `ty`, nearest first.
    fn subtypes_of(&self, ty: TypeId) -> Vec<TypeId>;

    /// Whether [`callers_of`](Self::callers_of) is served natively. Checked
    /// once per analysis to pick a caller strategy.
    fn supports_native_callers(&self) -> bool {
        false
    }

    /// Native caller lookup. Indexes that keep a call graph return
    /// `Some`; the default reports the capability as missing.
    fn callers_of(&self, _method: &MethodId) -> Option<IndexResult<Vec<Reference>>> {
        None
    }

    /// Path of a file, for display.
    fn file_path(&self, _file: FileId) -> Option<&str> {
        None
    }

    /// Qualified name of a type, or a placeholder for unknown ids.
    fn type_name(&self, ty: TypeId) -> SmolStr {
        self.type_decl(ty)
            .map(|decl| decl.qualified_name.clone())
            .unwrap_or_else(|| SmolStr::new(format!("<{ty}>")))
    }

    /// Look up a declared or inherited instance field by name.
    fn find_field(&self, ty: TypeId, name: &str) -> Option<FieldRef> {
        self.fields_of(ty, true).into_iter().find(|f| f.name == name)
    }

    /// Resolve a type as written at a use site, ignoring generic arguments.
    fn resolve_type_ref(&self, ty: &super::TypeRef) -> Option<TypeId> {
        self.resolve_type(&ty.erased())
    }

    /// True for interface methods and methods declared `abstract`.
    fn is_abstract_method(&self, method: &MethodId) -> bool {
        let declared_abstract = self.method_decl(method).is_some_and(|m| m.is_abstract);
        let in_interface = self
            .type_decl(method.owner)
            .is_some_and(|t| t.kind == super::TypeKind::Interface);
        declared_abstract || in_interface
    }
}
