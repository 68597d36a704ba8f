//! Mapping call-site detection.
//!
//! A call is a mapping transform when two things hold:
//!
//! ```text
//! member name ∈ vocabulary.methods           (map, mapAsList, ...)
//!     AND
//! provenance:  callee owner is a facade
//!          or  receiver's static type is (or extends) a facade
//!          or  receiver is `<factory>.getMapperFacade()`
//! ```
//!
//! The source and target types come from the first two arguments. Both must
//! resolve to project types or no site is produced.

use rustc_hash::FxHashSet;
use tracing::trace;

use super::config::MappingVocabulary;
use crate::base::CodeLocation;
use crate::hir::{CallExpr, Expr, MethodDecl, MethodId, SymbolIndex, TypeId, TypeRef};

/// One detected transform call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MappingSite {
    /// Method whose body contains the call.
    pub declaring_method: MethodId,
    pub source_type: TypeId,
    pub target_type: TypeId,
    pub location: CodeLocation,
}

impl MappingSite {
    pub fn involves(&self, ty: TypeId) -> bool {
        self.source_type == ty || self.target_type == ty
    }

    /// The other side of the site, seen from `ty`.
    pub fn counterpart(&self, ty: TypeId) -> Option<TypeId> {
        if self.source_type == ty {
            Some(self.target_type)
        } else if self.target_type == ty {
            Some(self.source_type)
        } else {
            None
        }
    }
}

/// How much of the project a detection pass covers.
#[derive(Debug, Clone, Copy)]
pub enum DetectScope<'s> {
    Method(&'s MethodId),
    Project,
}

/// Finds mapping transform calls using the configured vocabulary.
pub struct MappingSiteDetector<'a, I: SymbolIndex + ?Sized> {
    index: &'a I,
    vocabulary: &'a MappingVocabulary,
}

impl<'a, I: SymbolIndex + ?Sized> MappingSiteDetector<'a, I> {
    pub fn new(index: &'a I, vocabulary: &'a MappingVocabulary) -> Self {
        Self { index, vocabulary }
    }

    /// Sites in scope, in body order for one method and index order for the
    /// whole project.
    pub fn detect(&self, scope: DetectScope<'_>) -> Vec<MappingSite> {
        match scope {
            DetectScope::Method(method) => self
                .index
                .method_decl(method)
                .map(|decl| self.detect_in_method(decl))
                .unwrap_or_default(),
            DetectScope::Project => {
                let mut out = Vec::new();
                for ty in self.index.all_types() {
                    let Some(decl) = self.index.type_decl(ty) else {
                        continue;
                    };
                    for method in &decl.methods {
                        out.extend(self.detect_in_method(method));
                    }
                }
                out
            }
        }
    }

    pub fn detect_in_method(&self, method: &MethodDecl) -> Vec<MappingSite> {
        method
            .calls()
            .into_iter()
            .filter(|call| self.is_mapping_call(call))
            .filter_map(|call| self.extract(call, &method.id))
            .collect()
    }

    /// Name and provenance check. Argument types are not looked at here.
    pub fn is_mapping_call(&self, call: &CallExpr) -> bool {
        if !self.vocabulary.is_transform_method(&call.member) {
            return false;
        }
        if let Some(callee) = &call.callee {
            if self.is_facade(&callee.owner) {
                return true;
            }
        }
        if let Some(ty) = call.receiver_type() {
            if self.is_facade(&ty.erased()) {
                return true;
            }
        }
        if let Some(factory_call) = call.receiver_call() {
            if factory_call.member == self.vocabulary.facade_accessor {
                let from_factory = factory_call
                    .receiver_type()
                    .is_some_and(|ty| self.vocabulary.is_factory_type(&ty.erased()))
                    || factory_call
                        .callee
                        .as_ref()
                        .is_some_and(|c| self.vocabulary.is_factory_type(&c.owner));
                if from_factory {
                    return true;
                }
            }
        }
        false
    }

    fn extract(&self, call: &CallExpr, declaring: &MethodId) -> Option<MappingSite> {
        let collection = self.vocabulary.is_collection_method(&call.member);
        let source = argument_type(call.args.first()?, collection)?;
        let target = argument_type(call.args.get(1)?, false)?;

        let (Some(source_type), Some(target_type)) = (
            self.index.resolve_type_ref(&source),
            self.index.resolve_type_ref(&target),
        ) else {
            trace!(
                "mapping call '{}' at {} has unresolved types ({} -> {})",
                call.member,
                call.location,
                source.as_str(),
                target.as_str()
            );
            return None;
        };

        Some(MappingSite {
            declaring_method: declaring.clone(),
            source_type,
            target_type,
            location: call.location,
        })
    }

    /// A facade by name, or a project type with a facade among its ancestors.
    fn is_facade(&self, type_name: &str) -> bool {
        if self.vocabulary.is_facade_type(type_name) {
            return true;
        }
        let Some(start) = self.index.resolve_type(type_name) else {
            return false;
        };
        let mut seen = FxHashSet::default();
        let mut stack = vec![start];
        while let Some(ty) = stack.pop() {
            if !seen.insert(ty) {
                continue;
            }
            let Some(decl) = self.index.type_decl(ty) else {
                continue;
            };
            for sup in decl.supertypes() {
                let erased = sup.erased();
                if self.vocabulary.is_facade_type(&erased) {
                    return true;
                }
                if let Some(sup_id) = self.index.resolve_type(&erased) {
                    stack.push(sup_id);
                }
            }
        }
        false
    }
}

/// Static type an argument contributes to a site. Class literals name the
/// type directly; for collection variants a value argument contributes its
/// element type.
fn argument_type(arg: &Expr, element: bool) -> Option<TypeRef> {
    match arg {
        Expr::ClassLiteral(ty) => Some(ty.clone()),
        other => {
            let ty = other.static_type()?;
            if element {
                Some(ty.element_type().unwrap_or_else(|| ty.clone()))
            } else {
                Some(ty.clone())
            }
        }
    }
}
