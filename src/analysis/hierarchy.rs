//! Call hierarchy construction.
//!
//! The tree is grown with an explicit worklist over an arena of slots, so
//! deep hierarchies never recurse on the native stack:
//!
//! ```text
//! FIELD (holder, f)
//!   ├── ACCESSOR_GET getF()      ── callers by name on holder ∪ declared refs
//!   ├── ACCESSOR_SET setF(T)     ── callers by name on holder ∪ declared refs
//!   ├── <caller> reading f       ── callers ...
//!   └── MAPPING A → B            one per crossing of f
//!         ├── <method declaring the site> ── callers ...
//!         └── FIELD (B, f)                 ── recurse
//! ```
//!
//! Rules:
//! - A child whose key is already on its root path is never created.
//! - Nodes at `max_depth` are not expanded, except that a field node there
//!   still lists its two accessors as leaves.
//! - ENTRY_POINT nodes are leaves.
//! - A failing branch becomes a leaf; only cancellation aborts the build.
//! - Children appear in discovery order, so a fixed snapshot always yields
//!   the same tree.

use std::panic::{self, AssertUnwindSafe};

use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use super::accessors::{self, AccessorKind, VirtualAccessor};
use super::callers::{self, CallerGroup, CallerStrategy, group_references};
use super::classify::{MethodProfile, NodeCategory, classify};
use super::detector::MappingSite;
use super::error::{AnalysisError, AnalysisResult, panic_message};
use super::relations::RelationGraph;
use super::run::AnalysisRun;
use super::tree::{CallNode, NodeKey};
use crate::base::CodeLocation;
use crate::hir::{Declaration, FieldRef, MethodId, Reference, SymbolIndex, TypeId, TypeRef};

/// Build the call hierarchy of `seed`. An unknown seed yields a root-only
/// tree.
pub fn build_call_hierarchy<I: SymbolIndex + ?Sized>(
    run: &mut AnalysisRun<'_, I>,
    relations: &RelationGraph,
    seed: &FieldRef,
) -> AnalysisResult<CallNode> {
    let strategy = callers::select_strategy(run.index());
    debug!(strategy = strategy.name(), "caller strategy selected");
    HierarchyBuilder {
        run,
        relations,
        strategy,
        arena: Vec::new(),
    }
    .build(seed)
}

/// The traced field in effect on a branch: the type holding it and the
/// field itself.
type Traced = (TypeId, FieldRef);

enum Work {
    Field(Traced),
    Accessor(VirtualAccessor),
    Method(MethodId),
    Mapping {
        site: MappingSite,
        mapped: Option<Traced>,
    },
    Leaf,
}

struct Child {
    node: CallNode,
    work: Work,
}

struct Slot {
    node: CallNode,
    key: NodeKey,
    parent: Option<usize>,
    children: Vec<usize>,
    depth: usize,
    work: Work,
    traced: Option<Traced>,
}

struct HierarchyBuilder<'r, 'a, I: SymbolIndex + ?Sized> {
    run: &'r mut AnalysisRun<'a, I>,
    relations: &'r RelationGraph,
    strategy: Box<dyn CallerStrategy<I>>,
    arena: Vec<Slot>,
}

impl<I: SymbolIndex + ?Sized> HierarchyBuilder<'_, '_, I> {
    fn build(mut self, seed: &FieldRef) -> AnalysisResult<CallNode> {
        let index = self.run.index();
        let found = panic::catch_unwind(AssertUnwindSafe(|| {
            index.find_field(seed.declaring_type, &seed.name)
        }))
        .unwrap_or_else(|payload| {
            warn!(
                field = %seed.name,
                panic = %panic_message(payload.as_ref()),
                "seed lookup panicked, returning the root alone"
            );
            None
        });
        let (root, work, traced) = match found {
            Some(field) => {
                let root = self.field_node(seed.declaring_type, &field);
                let traced = (seed.declaring_type, field);
                (root, Work::Field(traced.clone()), Some(traced))
            }
            None => {
                debug!(
                    "seed field '{}.{}' is not declared, returning the root alone",
                    index.type_name(seed.declaring_type),
                    seed.name
                );
                (self.field_node(seed.declaring_type, seed), Work::Leaf, None)
            }
        };
        self.arena.push(Slot {
            key: root.key(),
            node: root,
            parent: None,
            children: Vec::new(),
            depth: 0,
            work,
            traced,
        });

        let max_nodes = self.run.config().max_nodes.max(1);
        let mut stack = vec![0usize];
        while let Some(id) = stack.pop() {
            self.run.check_cancelled()?;
            let children = self.expand_guarded(id)?;

            let mut fresh = Vec::with_capacity(children.len());
            for child in children {
                if self.arena.len() >= max_nodes {
                    debug!(max_nodes, "node budget exhausted, remaining branches cut");
                    break;
                }
                let key = child.node.key();
                if self.on_path(id, &key) {
                    trace!("'{}' already on the path, not repeated", child.node.label);
                    continue;
                }
                let traced = match &child.work {
                    Work::Field(traced) => Some(traced.clone()),
                    _ => self.arena[id].traced.clone(),
                };
                let child_id = self.arena.len();
                let depth = self.arena[id].depth + 1;
                self.arena.push(Slot {
                    node: child.node,
                    key,
                    parent: Some(id),
                    children: Vec::new(),
                    depth,
                    work: child.work,
                    traced,
                });
                self.arena[id].children.push(child_id);
                fresh.push(child_id);
            }
            stack.extend(fresh.into_iter().rev());
        }

        let stats = self.run.cache_stats();
        debug!(
            nodes = self.arena.len(),
            cache_hits = stats.hits,
            cache_misses = stats.misses,
            "call hierarchy built"
        );
        Ok(self.assemble())
    }

    fn on_path(&self, from: usize, key: &NodeKey) -> bool {
        let mut current = Some(from);
        while let Some(id) = current {
            let slot = &self.arena[id];
            if slot.key == *key {
                return true;
            }
            current = slot.parent;
        }
        false
    }

    /// Expand one slot. Branch failures and panics leave the slot a leaf.
    fn expand_guarded(&mut self, id: usize) -> AnalysisResult<Vec<Child>> {
        let work = std::mem::replace(&mut self.arena[id].work, Work::Leaf);
        let depth = self.arena[id].depth;
        let traced = self.arena[id].traced.clone();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            self.expand(&work, depth, traced.as_ref())
        }));
        match outcome {
            Ok(Ok(children)) => Ok(children),
            Ok(Err(AnalysisError::Cancelled)) => Err(AnalysisError::Cancelled),
            Ok(Err(err)) => {
                warn!(node = %self.arena[id].node.label, error = %err, "branch failed, left as a leaf");
                Ok(Vec::new())
            }
            Err(payload) => {
                warn!(
                    node = %self.arena[id].node.label,
                    panic = %panic_message(payload.as_ref()),
                    "branch panicked, left as a leaf"
                );
                Ok(Vec::new())
            }
        }
    }

    fn expand(
        &mut self,
        work: &Work,
        depth: usize,
        traced: Option<&Traced>,
    ) -> AnalysisResult<Vec<Child>> {
        let at_limit = depth >= self.run.config().max_depth;
        match work {
            Work::Leaf => Ok(Vec::new()),
            Work::Field((holder, field)) => self.expand_field(*holder, field, at_limit),
            _ if at_limit => Ok(Vec::new()),
            Work::Accessor(accessor) => self.expand_accessor(accessor),
            Work::Method(method) => self.expand_method(method, traced),
            Work::Mapping { site, mapped } => Ok(self.expand_mapping(site, mapped.as_ref())),
        }
    }

    // ========================================================================
    // EXPANSION
    // ========================================================================

    fn expand_field(
        &mut self,
        holder: TypeId,
        field: &FieldRef,
        at_limit: bool,
    ) -> AnalysisResult<Vec<Child>> {
        let index = self.run.index();
        let mut children = Vec::new();
        // Declared accessors already stand for their own body's field access.
        let mut declared_accessors: Vec<MethodId> = Vec::new();

        if let Some(pair) = accessors::synthesize(index, holder, field) {
            for accessor in pair {
                declared_accessors.extend(accessor.declared.clone());
                let node = self.accessor_node(&accessor);
                let work = if at_limit {
                    Work::Leaf
                } else {
                    Work::Accessor(accessor)
                };
                children.push(Child { node, work });
            }
        }
        if at_limit {
            return Ok(children);
        }

        let refs = self.run.references(&Declaration::Field(field.clone()))?;
        let config = self.run.config();
        let groups = group_references(
            refs.iter().filter(|r| {
                !r.enclosing_method
                    .as_ref()
                    .is_some_and(|m| declared_accessors.contains(m))
            }),
            config.max_callers,
            config.max_sites_per_caller,
        );
        children.extend(self.caller_children(&groups));

        let relations = self.relations;
        for (crossing, other_type, other_field) in relations.crossings_at(holder, field) {
            children.push(Child {
                node: self.mapping_node(&crossing.site),
                work: Work::Mapping {
                    site: crossing.site.clone(),
                    mapped: Some((other_type, other_field.clone())),
                },
            });
        }
        Ok(children)
    }

    fn expand_accessor(&mut self, accessor: &VirtualAccessor) -> AnalysisResult<Vec<Child>> {
        let by_name = Declaration::Member {
            owner: accessor.owner,
            name: accessor.name.clone(),
        };
        let mut refs: Vec<Reference> = self.run.references(&by_name)?.to_vec();
        if let Some(declared) = &accessor.declared {
            for target in callers::dispatch_targets(self.run, declared)? {
                let found = self.strategy.direct_references(self.run, &target)?;
                refs.extend(found.iter().cloned());
            }
        }
        let config = self.run.config();
        let groups = group_references(&refs, config.max_callers, config.max_sites_per_caller);
        Ok(self.caller_children(&groups))
    }

    fn expand_method(
        &mut self,
        method: &MethodId,
        traced: Option<&Traced>,
    ) -> AnalysisResult<Vec<Child>> {
        let groups = callers::callers_of(self.run, self.strategy.as_ref(), method)?;
        let mut children = self.caller_children(&groups);

        let relations = self.relations;
        for site in self.run.sites_in_method(method)?.iter() {
            let crossing = traced.and_then(|(ty, field)| relations.crossing_through(site, *ty, field));
            let work = match crossing {
                Some((_, other_type, other_field)) => Work::Mapping {
                    site: site.clone(),
                    mapped: Some((other_type, other_field.clone())),
                },
                None if traced.is_some_and(|(ty, _)| site.involves(*ty)) => Work::Leaf,
                None => continue,
            };
            children.push(Child {
                node: self.mapping_node(site),
                work,
            });
        }
        Ok(children)
    }

    fn expand_mapping(&self, site: &MappingSite, mapped: Option<&Traced>) -> Vec<Child> {
        let mut children = vec![self.caller_child(&site.declaring_method, site.location)];
        if let Some((ty, field)) = mapped {
            children.push(Child {
                node: self.field_node(*ty, field),
                work: Work::Field((*ty, field.clone())),
            });
        }
        children
    }

    // ========================================================================
    // NODES
    // ========================================================================

    fn caller_children(&self, groups: &[CallerGroup]) -> Vec<Child> {
        groups
            .iter()
            .flat_map(|group| {
                group
                    .sites
                    .iter()
                    .map(move |site| self.caller_child(&group.caller, *site))
            })
            .collect()
    }

    fn caller_child(&self, method: &MethodId, site: CodeLocation) -> Child {
        let index = self.run.index();
        let category = classify(
            &MethodProfile::of(index, method),
            &self.run.config().conventions,
        );
        let owner = index.type_name(method.owner);
        let node = CallNode {
            label: format!(
                "{}.{}({})",
                crate::hir::simple_name_of(&owner),
                method.name,
                simple_params(&method.params)
            ),
            owner_type: owner,
            method_name: method.name.clone(),
            param_signature: SmolStr::new(method.param_signature()),
            location: Some(site),
            category,
            children: Vec::new(),
        };
        let work = if category.is_terminal() {
            Work::Leaf
        } else {
            Work::Method(method.clone())
        };
        Child { node, work }
    }

    fn field_node(&self, holder: TypeId, field: &FieldRef) -> CallNode {
        let index = self.run.index();
        let owner = index.type_name(holder);
        let location = index.field_decl(field).map(|decl| decl.location);
        CallNode {
            label: format!("{}.{}", crate::hir::simple_name_of(&owner), field.name),
            owner_type: owner,
            method_name: field.name.clone(),
            param_signature: SmolStr::default(),
            location,
            category: NodeCategory::Field,
            children: Vec::new(),
        }
    }

    fn accessor_node(&self, accessor: &VirtualAccessor) -> CallNode {
        let index = self.run.index();
        let owner = index.type_name(accessor.owner);
        let location = accessor
            .declared
            .as_ref()
            .and_then(|m| index.method_decl(m))
            .map(|decl| decl.location);
        let category = match accessor.kind {
            AccessorKind::Getter => NodeCategory::AccessorGet,
            AccessorKind::Setter => NodeCategory::AccessorSet,
        };
        let mut label = format!(
            "{}.{}({})",
            crate::hir::simple_name_of(&owner),
            accessor.name,
            simple_params(&accessor.params)
        );
        if !accessor.is_declared() {
            label.push_str(" (synthetic)");
        }
        CallNode {
            owner_type: owner,
            method_name: accessor.name.clone(),
            param_signature: SmolStr::new(accessor.param_signature()),
            location,
            category,
            label,
            children: Vec::new(),
        }
    }

    /// Keyed by the site itself, so the same transform never repeats on a
    /// path while distinct sites between the same types stay distinct.
    fn mapping_node(&self, site: &MappingSite) -> CallNode {
        let index = self.run.index();
        let source = index.type_name(site.source_type);
        let target = index.type_name(site.target_type);
        CallNode {
            label: format!(
                "{} → {}",
                crate::hir::simple_name_of(&source),
                crate::hir::simple_name_of(&target)
            ),
            owner_type: source,
            method_name: target,
            param_signature: SmolStr::new(format!("@{}", site.location)),
            location: Some(site.location),
            category: NodeCategory::Mapping,
            children: Vec::new(),
        }
    }

    /// Turn the arena into an owned tree. Children always sit at higher
    /// indices than their parent, so one reverse sweep suffices.
    fn assemble(self) -> CallNode {
        let mut built: Vec<Option<CallNode>> = Vec::with_capacity(self.arena.len());
        built.resize_with(self.arena.len(), || None);
        let mut root = None;
        for (id, slot) in self.arena.into_iter().enumerate().rev() {
            let mut node = slot.node;
            node.children = slot
                .children
                .iter()
                .filter_map(|&child| built[child].take())
                .collect();
            if id == 0 {
                root = Some(node);
            } else {
                built[id] = Some(node);
            }
        }
        root.unwrap_or_else(|| CallNode {
            owner_type: SmolStr::default(),
            method_name: SmolStr::default(),
            param_signature: SmolStr::default(),
            location: None,
            category: NodeCategory::Field,
            label: String::new(),
            children: Vec::new(),
        })
    }
}

fn simple_params(params: &[SmolStr]) -> String {
    params
        .iter()
        .map(|p| TypeRef::new(p.clone()).simple_name())
        .collect::<Vec<_>>()
        .join(", ")
}
