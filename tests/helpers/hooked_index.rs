//! A symbol index wrapper that runs a hook before reference searches and
//! field listings.
//!
//! Used to inject faults, panics and cancellation at precise points of a
//! run. Native caller lookup is hidden, so every caller query goes through
//! `find_references`.

use fieldtrace::hir::{
    Declaration, FieldDecl, IndexResult, MethodDecl, ProjectIndex, Reference, TypeDecl,
};
use fieldtrace::{FieldRef, MethodId, SymbolIndex, TypeId};

/// The query a hook is about to see answered.
pub enum Query<'q> {
    References(&'q Declaration),
    Fields(TypeId),
}

pub struct HookedIndex<F> {
    pub inner: ProjectIndex,
    pub hook: F,
}

impl<F> HookedIndex<F>
where
    F: Fn(&ProjectIndex, Query<'_>) -> IndexResult<()>,
{
    pub fn new(inner: ProjectIndex, hook: F) -> Self {
        Self { inner, hook }
    }
}

impl<F> SymbolIndex for HookedIndex<F>
where
    F: Fn(&ProjectIndex, Query<'_>) -> IndexResult<()>,
{
    fn resolve_type(&self, qualified_name: &str) -> Option<TypeId> {
        self.inner.resolve_type(qualified_name)
    }

    fn type_decl(&self, ty: TypeId) -> Option<&TypeDecl> {
        self.inner.type_decl(ty)
    }

    fn all_types(&self) -> Vec<TypeId> {
        self.inner.all_types()
    }

    fn fields_of(&self, ty: TypeId, include_inherited: bool) -> Vec<FieldRef> {
        // Listings cannot fail, so a hook can only panic here.
        let _ = (self.hook)(&self.inner, Query::Fields(ty));
        self.inner.fields_of(ty, include_inherited)
    }

    fn field_decl(&self, field: &FieldRef) -> Option<&FieldDecl> {
        self.inner.field_decl(field)
    }

    fn method_decl(&self, method: &MethodId) -> Option<&MethodDecl> {
        self.inner.method_decl(method)
    }

    fn methods_of(&self, ty: TypeId, include_inherited: bool) -> Vec<MethodId> {
        self.inner.methods_of(ty, include_inherited)
    }

    fn find_references(&self, target: &Declaration) -> IndexResult<Vec<Reference>> {
        (self.hook)(&self.inner, Query::References(target))?;
        self.inner.find_references(target)
    }

    fn find_overrides_and_implementations(
        &self,
        method: &MethodId,
    ) -> IndexResult<Vec<MethodId>> {
        self.inner.find_overrides_and_implementations(method)
    }

    fn find_super_methods(&self, method: &MethodId) -> IndexResult<Vec<MethodId>> {
        self.inner.find_super_methods(method)
    }

    fn subtypes_of(&self, ty: TypeId) -> Vec<TypeId> {
        self.inner.subtypes_of(ty)
    }
}
