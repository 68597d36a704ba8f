//! In-memory symbol index over a whole project.
//!
//! `ProjectIndex` owns every declaration and answers [`SymbolIndex`] queries
//! from tables built once at construction:
//!
//! ```text
//! declarations ──► name tables (qualified, simple)
//!              ──► supertype / subtype tables
//!              ──► call + field-access resolution
//!              ──► reverse reference tables (method, field, member name)
//! ```
//!
//! Every table is filled by walking types, methods and body items in
//! declaration order, so query results are stable for a given project.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::{debug, trace};

use super::ids::{FieldRef, MethodId, TypeId};
use super::index::{Declaration, IndexError, IndexResult, Reference, SymbolIndex};
use super::model::{
    BodyItem, CallExpr, Callee, Expr, FieldAccess, FieldDecl, MethodDecl, TypeDecl,
};
use crate::base::FileId;

/// Workspace-wide symbol index built from declarations.
#[derive(Debug, Clone, Default)]
pub struct ProjectIndex {
    types: Vec<TypeDecl>,
    /// FileId -> path.
    files: Vec<SmolStr>,
    /// Qualified name -> declarations (IndexMap preserves insertion order).
    by_qualified_name: IndexMap<SmolStr, Vec<TypeId>>,
    /// Simple name -> declarations, for unqualified lookups.
    by_simple_name: FxHashMap<SmolStr, Vec<TypeId>>,
    /// Direct resolved supertypes, superclass first.
    supertypes: FxHashMap<TypeId, Vec<TypeId>>,
    /// Direct resolved superclass only.
    super_class: FxHashMap<TypeId, TypeId>,
    direct_subtypes: FxHashMap<TypeId, Vec<TypeId>>,
    method_refs: FxHashMap<MethodId, Vec<Reference>>,
    field_refs: FxHashMap<FieldRef, Vec<Reference>>,
    /// (receiver type, member name) -> call sites.
    member_calls: FxHashMap<(TypeId, SmolStr), Vec<Reference>>,
    /// Whether `callers_of` answers from the precomputed call table.
    native_callers: bool,
}

impl ProjectIndex {
    /// Build an index from finished declarations. Type ids must equal
    /// positions in `types`.
    pub(crate) fn new(files: Vec<SmolStr>, types: Vec<TypeDecl>, native_callers: bool) -> Self {
        let mut index = Self {
            files,
            native_callers,
            ..Self::default()
        };

        for decl in &types {
            index
                .by_qualified_name
                .entry(decl.qualified_name.clone())
                .or_default()
                .push(decl.id);
            index
                .by_simple_name
                .entry(SmolStr::new(decl.simple_name()))
                .or_default()
                .push(decl.id);
        }
        for (name, ids) in &index.by_qualified_name {
            if ids.len() > 1 {
                debug!(
                    "duplicate qualified name '{}' declared {} times, first declaration wins",
                    name,
                    ids.len()
                );
            }
        }

        index.link_supertypes(&types);

        let mut types = types;
        resolve_bodies(&index, &mut types);
        index.types = types;
        index.build_reference_tables();

        debug!(
            types = index.types.len(),
            files = index.files.len(),
            method_targets = index.method_refs.len(),
            field_targets = index.field_refs.len(),
            "project index built"
        );
        index
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn types(&self) -> &[TypeDecl] {
        &self.types
    }

    /// Whether `callers_of` is served natively.
    pub fn has_native_callers(&self) -> bool {
        self.native_callers
    }

    /// Toggle the native caller capability, e.g. to exercise the scan fallback.
    pub fn set_native_callers(&mut self, enabled: bool) {
        self.native_callers = enabled;
    }

    fn lookup(&self, name: &str) -> Option<TypeId> {
        if let Some(ids) = self.by_qualified_name.get(name) {
            return ids.first().copied();
        }
        // Unqualified names resolve only when unambiguous.
        if !name.contains('.') {
            if let Some(ids) = self.by_simple_name.get(name) {
                if ids.len() == 1 {
                    return Some(ids[0]);
                }
            }
        }
        None
    }

    fn link_supertypes(&mut self, types: &[TypeDecl]) {
        for decl in types {
            let mut supers = Vec::new();
            for (i, sup) in decl.supertypes().enumerate() {
                let Some(sup_id) = self.lookup(&sup.erased()) else {
                    trace!(
                        "supertype '{}' of '{}' is outside the project",
                        sup.as_str(),
                        decl.qualified_name
                    );
                    continue;
                };
                if sup_id == decl.id {
                    continue;
                }
                if i == 0 && decl.super_class.is_some() {
                    self.super_class.insert(decl.id, sup_id);
                }
                supers.push(sup_id);
                self.direct_subtypes.entry(sup_id).or_default().push(decl.id);
            }
            self.supertypes.insert(decl.id, supers);
        }
    }

    /// Transitive supertypes of `ty`, nearest first, excluding `ty`.
    fn ancestors(&self, ty: TypeId) -> Vec<TypeId> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        seen.insert(ty);
        let mut frontier = vec![ty];
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for current in frontier {
                for &sup in self.supertypes.get(&current).into_iter().flatten() {
                    if seen.insert(sup) {
                        out.push(sup);
                        next.push(sup);
                    }
                }
            }
            frontier = next;
        }
        out
    }

    /// `ty` followed by its superclass chain.
    fn class_chain(&self, ty: TypeId) -> Vec<TypeId> {
        let mut chain = vec![ty];
        let mut current = ty;
        while let Some(&sup) = self.super_class.get(&current) {
            if chain.contains(&sup) {
                break;
            }
            chain.push(sup);
            current = sup;
        }
        chain
    }

    fn build_reference_tables(&mut self) {
        let mut method_refs: FxHashMap<MethodId, Vec<Reference>> = FxHashMap::default();
        let mut field_refs: FxHashMap<FieldRef, Vec<Reference>> = FxHashMap::default();
        let mut member_calls: FxHashMap<(TypeId, SmolStr), Vec<Reference>> = FxHashMap::default();

        for decl in &self.types {
            for method in &decl.methods {
                for item in &method.body {
                    if let BodyItem::FieldAccess(access) = item {
                        if let Some(field) = &access.resolved {
                            field_refs.entry(field.clone()).or_default().push(Reference {
                                enclosing_method: Some(method.id.clone()),
                                location: access.location,
                            });
                        }
                    }
                }
                for call in method.calls() {
                    let reference = Reference {
                        enclosing_method: Some(method.id.clone()),
                        location: call.location,
                    };
                    if let Some(target) = call.callee.as_ref().and_then(|c| c.method.as_ref()) {
                        method_refs
                            .entry(target.clone())
                            .or_default()
                            .push(reference.clone());
                    }
                    if let Some(receiver) = self.receiver_type_id(call, decl.id) {
                        member_calls
                            .entry((receiver, call.member.clone()))
                            .or_default()
                            .push(reference);
                    }
                }
            }
        }

        self.method_refs = method_refs;
        self.field_refs = field_refs;
        self.member_calls = member_calls;
    }

    /// Project type the call is made on: the receiver's static type, or the
    /// enclosing type for unqualified and `this.` calls.
    fn receiver_type_id(&self, call: &CallExpr, enclosing: TypeId) -> Option<TypeId> {
        match call.receiver.as_deref() {
            None | Some(Expr::This) => Some(enclosing),
            Some(expr) => expr.static_type().and_then(|ty| self.lookup(&ty.erased())),
        }
    }

    fn decl(&self, ty: TypeId) -> Option<&TypeDecl> {
        self.types.get(ty.index())
    }

    fn require_method(&self, method: &MethodId) -> IndexResult<&MethodDecl> {
        self.method_decl(method).ok_or_else(|| {
            IndexError::UnknownDeclaration(format!(
                "{}.{}{}",
                self.type_name(method.owner),
                method.name,
                method.param_signature()
            ))
        })
    }
}

// ============================================================================
// BODY RESOLUTION
// ============================================================================

/// Fill in callees, return types and field targets. Runs before the
/// declarations move into the index, so lookups go through `types` directly.
fn resolve_bodies(index: &ProjectIndex, types: &mut [TypeDecl]) {
    let mut bodies: Vec<Vec<Vec<BodyItem>>> = types
        .iter_mut()
        .map(|decl| {
            decl.methods
                .iter_mut()
                .map(|m| std::mem::take(&mut m.body))
                .collect()
        })
        .collect();

    {
        let decls: &[TypeDecl] = types;
        for (decl, methods) in decls.iter().zip(bodies.iter_mut()) {
            for body in methods.iter_mut() {
                for item in body.iter_mut() {
                    match item {
                        BodyItem::Call(call) => {
                            call.for_each_mut(&mut |c| resolve_call(index, decls, decl.id, c));
                        }
                        BodyItem::FieldAccess(access) => {
                            access.resolved = resolve_field(index, decls, decl.id, access);
                        }
                    }
                }
            }
        }
    }

    for (decl, methods) in types.iter_mut().zip(bodies) {
        for (method, body) in decl.methods.iter_mut().zip(methods) {
            method.body = body;
        }
    }
}

fn resolve_call(index: &ProjectIndex, types: &[TypeDecl], enclosing: TypeId, call: &mut CallExpr) {
    let arg_types: Vec<Option<String>> = call
        .args
        .iter()
        .map(|arg| arg.static_type().map(|ty| ty.erased().into_owned()))
        .collect();

    let explicit = call
        .callee
        .as_ref()
        .filter(|callee| callee.method.is_none())
        .map(|callee| (callee.owner.clone(), callee.params.clone()));

    let resolved = match explicit {
        Some((owner, params)) => index.lookup(&owner).and_then(|owner_id| {
            find_method(
                index,
                types,
                owner_id,
                &call.member,
                call.args.len(),
                params.as_deref(),
                &arg_types,
            )
        }),
        None if call.callee.is_none() => {
            let start = match call.receiver.as_deref() {
                None | Some(Expr::This) => Some(enclosing),
                Some(expr) => expr.static_type().and_then(|ty| index.lookup(&ty.erased())),
            };
            match start {
                Some(owner_id) => find_method(
                    index,
                    types,
                    owner_id,
                    &call.member,
                    call.args.len(),
                    None,
                    &arg_types,
                ),
                None => {
                    // Receiver typed outside the project: remember the owner so
                    // provenance checks can still look at it.
                    let external = call.receiver_type().map(|ty| ty.erased().into_owned());
                    if let Some(owner) = external {
                        call.callee = Some(Callee::external(owner));
                    }
                    None
                }
            }
        }
        None => None,
    };

    let Some(method) = resolved else {
        return;
    };
    let decl = &types[method.owner.index()];
    if call.return_type.is_none() {
        call.return_type = decl.method(&method).and_then(|m| m.return_type.clone());
    }
    match call.callee.as_mut() {
        Some(callee) => callee.method = Some(method),
        None => {
            call.callee = Some(Callee {
                owner: decl.qualified_name.clone(),
                method: Some(method),
                params: None,
            })
        }
    }
}

/// Find a method named `name` on `start` or its supertypes.
fn find_method(
    index: &ProjectIndex,
    types: &[TypeDecl],
    start: TypeId,
    name: &str,
    arity: usize,
    params: Option<&[SmolStr]>,
    arg_types: &[Option<String>],
) -> Option<MethodId> {
    let mut search = vec![start];
    search.extend(index.ancestors(start));

    let mut candidates = Vec::new();
    for ty in search {
        for method in &types[ty.index()].methods {
            if method.id.name != name {
                continue;
            }
            match params {
                Some(wanted) => {
                    if method.id.params[..] == *wanted {
                        return Some(method.id.clone());
                    }
                }
                None if method.id.arity() == arity => candidates.push(&method.id),
                None => {}
            }
        }
    }

    if candidates.len() > 1 {
        let exact = candidates.iter().find(|candidate| {
            candidate
                .params
                .iter()
                .zip(arg_types)
                .all(|(param, arg)| match arg {
                    Some(arg) => super::TypeRef::new(param.clone()).erased() == arg.as_str(),
                    None => true,
                })
        });
        if let Some(exact) = exact {
            return Some((*exact).clone());
        }
    }
    candidates.first().map(|m| (*m).clone())
}

fn resolve_field(
    index: &ProjectIndex,
    types: &[TypeDecl],
    enclosing: TypeId,
    access: &FieldAccess,
) -> Option<FieldRef> {
    let owner = if access.owner.as_str().is_empty() {
        enclosing
    } else {
        index.lookup(&access.owner.erased())?
    };
    index
        .class_chain(owner)
        .into_iter()
        .find(|ty| types[ty.index()].field(&access.name).is_some())
        .map(|ty| FieldRef::new(ty, access.name.clone()))
}

// ============================================================================
// SYMBOL INDEX
// ============================================================================

impl SymbolIndex for ProjectIndex {
    fn resolve_type(&self, qualified_name: &str) -> Option<TypeId> {
        self.lookup(qualified_name.trim())
    }

    fn type_decl(&self, ty: TypeId) -> Option<&TypeDecl> {
        self.decl(ty)
    }

    fn all_types(&self) -> Vec<TypeId> {
        self.types.iter().map(|t| t.id).collect()
    }

    fn fields_of(&self, ty: TypeId, include_inherited: bool) -> Vec<FieldRef> {
        let chain = if include_inherited {
            self.class_chain(ty)
        } else {
            vec![ty]
        };
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut out = Vec::new();
        for owner in chain {
            let Some(decl) = self.decl(owner) else {
                continue;
            };
            for field in decl.fields.iter().filter(|f| !f.is_static) {
                // A subclass field shadows a same-named inherited one.
                if seen.insert(field.name.as_str()) {
                    out.push(FieldRef::new(owner, field.name.clone()));
                }
            }
        }
        out
    }

    fn field_decl(&self, field: &FieldRef) -> Option<&FieldDecl> {
        self.decl(field.declaring_type)?.field(&field.name)
    }

    fn method_decl(&self, method: &MethodId) -> Option<&MethodDecl> {
        self.decl(method.owner)?.method(method)
    }

    fn methods_of(&self, ty: TypeId, include_inherited: bool) -> Vec<MethodId> {
        let mut owners = vec![ty];
        if include_inherited {
            owners.extend(self.ancestors(ty));
        }
        let mut out: Vec<MethodId> = Vec::new();
        for owner in owners {
            let Some(decl) = self.decl(owner) else {
                continue;
            };
            for method in &decl.methods {
                if !out.iter().any(|m| m.same_signature(&method.id)) {
                    out.push(method.id.clone());
                }
            }
        }
        out
    }

    fn find_references(&self, target: &Declaration) -> IndexResult<Vec<Reference>> {
        match target {
            Declaration::Method(method) => {
                self.require_method(method)?;
                Ok(self.method_refs.get(method).cloned().unwrap_or_default())
            }
            Declaration::Field(field) => {
                if self.field_decl(field).is_none() {
                    return Err(IndexError::UnknownDeclaration(format!(
                        "{}.{}",
                        self.type_name(field.declaring_type),
                        field.name
                    )));
                }
                Ok(self.field_refs.get(field).cloned().unwrap_or_default())
            }
            Declaration::Member { owner, name } => {
                if self.decl(*owner).is_none() {
                    return Err(IndexError::UnknownDeclaration(owner.to_string()));
                }
                let mut out = Vec::new();
                let mut receivers = vec![*owner];
                receivers.extend(self.subtypes_of(*owner));
                for receiver in receivers {
                    if let Some(refs) = self.member_calls.get(&(receiver, name.clone())) {
                        out.extend(refs.iter().cloned());
                    }
                }
                Ok(out)
            }
        }
    }

    fn find_overrides_and_implementations(
        &self,
        method: &MethodId,
    ) -> IndexResult<Vec<MethodId>> {
        self.require_method(method)?;
        let mut out = Vec::new();
        for sub in self.subtypes_of(method.owner) {
            let Some(decl) = self.decl(sub) else {
                continue;
            };
            out.extend(
                decl.methods
                    .iter()
                    .filter(|m| m.id.same_signature(method) && !m.is_static)
                    .map(|m| m.id.clone()),
            );
        }
        Ok(out)
    }

    fn find_super_methods(&self, method: &MethodId) -> IndexResult<Vec<MethodId>> {
        let decl = self.require_method(method)?;
        if decl.is_static || decl.is_constructor {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        for sup in self.ancestors(method.owner) {
            let Some(sup_decl) = self.decl(sup) else {
                continue;
            };
            out.extend(
                sup_decl
                    .methods
                    .iter()
                    .filter(|m| m.id.same_signature(method) && !m.is_static)
                    .map(|m| m.id.clone()),
            );
        }
        Ok(out)
    }

    fn subtypes_of(&self, ty: TypeId) -> Vec<TypeId> {
        let mut out = Vec::new();
        let mut seen = FxHashSet::default();
        seen.insert(ty);
        let mut frontier = vec![ty];
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for current in frontier {
                for &sub in self.direct_subtypes.get(&current).into_iter().flatten() {
                    if seen.insert(sub) {
                        out.push(sub);
                        next.push(sub);
                    }
                }
            }
            frontier = next;
        }
        out
    }

    fn supports_native_callers(&self) -> bool {
        self.native_callers
    }

    fn callers_of(&self, method: &MethodId) -> Option<IndexResult<Vec<Reference>>> {
        if !self.native_callers {
            return None;
        }
        Some(
            self.require_method(method)
                .map(|_| self.method_refs.get(method).cloned().unwrap_or_default()),
        )
    }

    fn file_path(&self, file: FileId) -> Option<&str> {
        self.files.get(file.index()).map(SmolStr::as_str)
    }
}
