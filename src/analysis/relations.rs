//! Field mapping relations.
//!
//! Starting from a seed field, the resolver walks every type the field's
//! value can be converted to through mapping sites, breadth-first:
//!
//! ```text
//! seed (T, F)
//!   │
//!   ├─ DIRECT  site pairs T with T′ and F exists on T′
//!   │            └─► (T, F) ↔ (T′, F), continue from T′
//!   │
//!   └─ NESTED  C.g holds a T, site pairs C with C′, C′.g holds a G′
//!              that shares a field name with T
//!                └─► (C, g) ↔ (C′, g), continue from G′
//! ```
//!
//! Each type is visited at most once. The traced field keeps the seed's
//! name throughout; a type without it contributes no DIRECT relations.
//!
//! Besides the relation set, the resolver records a [`FieldCrossing`] for
//! every site the traced field travels through. The hierarchy builder uses
//! these to splice MAPPING nodes between fields.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};

use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::{debug, trace, warn};

use super::detector::MappingSite;
use super::error::{AnalysisError, AnalysisResult, panic_message};
use super::run::AnalysisRun;
use crate::base::CodeLocation;
use crate::hir::{FieldRef, SymbolIndex, TypeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum RelationKind {
    /// Same-named fields on the two sides of a site.
    Direct,
    /// Container fields whose values are themselves mapped.
    Nested,
}

/// A pair of fields linked by some mapping site, oriented source to target.
///
/// The types are the mapped types; the field refs name the declaring type,
/// which differs for inherited fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MappingRelation {
    pub source_type: TypeId,
    pub source_field: FieldRef,
    pub target_type: TypeId,
    pub target_field: FieldRef,
    pub kind: RelationKind,
}

/// The traced field passing through one mapping site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldCrossing {
    /// Traced field on the side the walk came from, and the type holding it.
    pub from: FieldRef,
    pub from_type: TypeId,
    /// Traced field on the other side, and the type holding it.
    pub to: FieldRef,
    pub to_type: TypeId,
    pub site: MappingSite,
    pub kind: RelationKind,
}

impl FieldCrossing {
    /// The far end of the crossing as seen from `(ty, field)`.
    pub fn other_end(&self, ty: TypeId, field: &FieldRef) -> Option<(TypeId, &FieldRef)> {
        if self.from_type == ty && self.from == *field {
            Some((self.to_type, &self.to))
        } else if self.to_type == ty && self.to == *field {
            Some((self.from_type, &self.from))
        } else {
            None
        }
    }
}

/// Everything the resolver found for one seed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationGraph {
    pub relations: IndexSet<MappingRelation>,
    pub crossings: Vec<FieldCrossing>,
}

impl RelationGraph {
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Crossings touching `(ty, field)`, paired with their far end.
    pub fn crossings_at<'g>(
        &'g self,
        ty: TypeId,
        field: &'g FieldRef,
    ) -> impl Iterator<Item = (&'g FieldCrossing, TypeId, &'g FieldRef)> + 'g {
        self.crossings.iter().filter_map(move |crossing| {
            crossing
                .other_end(ty, field)
                .map(|(other_ty, other)| (crossing, other_ty, other))
        })
    }

    /// Crossings through `site` touching `(ty, field)`.
    pub fn crossing_through<'g>(
        &'g self,
        site: &MappingSite,
        ty: TypeId,
        field: &'g FieldRef,
    ) -> Option<(&'g FieldCrossing, TypeId, &'g FieldRef)> {
        self.crossings_at(ty, field)
            .find(|(crossing, _, _)| crossing.site == *site)
    }
}

/// Resolve every relation reachable from `seed`. An unknown seed yields an
/// empty graph.
///
/// Each visited type is expanded in isolation: a fault or a panic raised by
/// the index while expanding one type is logged and that type is skipped,
/// keeping every relation found so far. Only cancellation aborts the walk.
pub fn resolve_relations<I: SymbolIndex + ?Sized>(
    run: &mut AnalysisRun<'_, I>,
    seed: &FieldRef,
) -> AnalysisResult<RelationGraph> {
    let index = run.index();
    let name = seed.name.clone();
    let mut graph = RelationGraph::default();

    let seed_field = match panic::catch_unwind(AssertUnwindSafe(|| {
        index.find_field(seed.declaring_type, &name)
    })) {
        Ok(found) => found,
        Err(payload) => {
            warn!(
                field = %name,
                panic = %panic_message(payload.as_ref()),
                "seed lookup panicked, no relations"
            );
            None
        }
    };
    if seed_field.is_none() {
        debug!(
            "seed field '{}.{}' is not declared, no relations",
            index.type_name(seed.declaring_type),
            name
        );
        return Ok(graph);
    }

    let mut walk = Walk {
        name,
        crossings: CrossingLog::default(),
        queue: VecDeque::new(),
    };
    let mut visited: FxHashSet<TypeId> = FxHashSet::default();
    walk.queue.push_back(seed.declaring_type);

    while let Some(ty) = walk.queue.pop_front() {
        if !visited.insert(ty) {
            continue;
        }
        run.check_cancelled()?;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            walk.visit(run, &mut graph, ty)
        }));
        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(AnalysisError::Cancelled)) => return Err(AnalysisError::Cancelled),
            Ok(Err(err)) => {
                warn!(ty = %ty, error = %err, "type skipped while resolving relations");
            }
            Err(payload) => {
                warn!(
                    ty = %ty,
                    panic = %panic_message(payload.as_ref()),
                    "panic while resolving relations, type skipped"
                );
            }
        }
    }

    graph.crossings = walk.crossings.entries;
    debug!(
        relations = graph.relations.len(),
        crossings = graph.crossings.len(),
        types = visited.len(),
        "mapping relations resolved"
    );
    Ok(graph)
}

/// State of one breadth-first walk for the traced field name.
struct Walk {
    name: SmolStr,
    crossings: CrossingLog,
    queue: VecDeque<TypeId>,
}

impl Walk {
    /// DIRECT and NESTED steps out of `ty`.
    fn visit<I: SymbolIndex + ?Sized>(
        &mut self,
        run: &mut AnalysisRun<'_, I>,
        graph: &mut RelationGraph,
        ty: TypeId,
    ) -> AnalysisResult<()> {
        let index = run.index();
        let name = &self.name;
        let Some(here) = index.find_field(ty, name) else {
            trace!("'{}' has no field '{}'", index.type_name(ty), name);
            return Ok(());
        };

        // DIRECT
        for site in run.sites_pairing(ty)?.iter() {
            let Some(other) = site.counterpart(ty) else {
                continue;
            };
            if other == ty {
                continue;
            }
            let Some(there) = index.find_field(other, name) else {
                continue;
            };
            graph.relations.insert(oriented(
                site,
                (ty, here.clone()),
                (other, there.clone()),
                RelationKind::Direct,
            ));
            self.crossings.record(FieldCrossing {
                from: here.clone(),
                from_type: ty,
                to: there,
                to_type: other,
                site: site.clone(),
                kind: RelationKind::Direct,
            });
            self.queue.push_back(other);
        }

        // NESTED
        for (container, holder) in run.containers_of(ty)?.iter() {
            for site in run.sites_pairing(*container)?.iter() {
                let Some(other_container) = site.counterpart(*container) else {
                    continue;
                };
                if other_container == *container {
                    continue;
                }
                let Some(other_holder) = index.find_field(other_container, &holder.name) else {
                    continue;
                };
                let Some(nested) = run.field_value_type(&other_holder) else {
                    continue;
                };
                if !shares_field_name(index, ty, nested) {
                    continue;
                }
                graph.relations.insert(oriented(
                    site,
                    (*container, holder.clone()),
                    (other_container, other_holder),
                    RelationKind::Nested,
                ));
                if let Some(there) = index.find_field(nested, name) {
                    self.crossings.record(FieldCrossing {
                        from: here.clone(),
                        from_type: ty,
                        to: there,
                        to_type: nested,
                        site: site.clone(),
                        kind: RelationKind::Nested,
                    });
                }
                self.queue.push_back(nested);
            }
        }
        Ok(())
    }
}

/// Crossings in discovery order, one per site and field pair regardless of
/// the direction the walk met it from.
#[derive(Default)]
struct CrossingLog {
    seen: FxHashSet<(TypeId, SmolStr, TypeId, SmolStr, CodeLocation)>,
    entries: Vec<FieldCrossing>,
}

impl CrossingLog {
    fn record(&mut self, crossing: FieldCrossing) {
        let forward = (
            crossing.from_type,
            crossing.from.name.clone(),
            crossing.to_type,
            crossing.to.name.clone(),
            crossing.site.location,
        );
        let backward = (forward.2, forward.3.clone(), forward.0, forward.1.clone(), forward.4);
        if self.seen.contains(&backward) || !self.seen.insert(forward) {
            return;
        }
        self.entries.push(crossing);
    }
}

/// Build a relation oriented by the site: the side on the site's source type
/// is the source.
fn oriented(
    site: &MappingSite,
    here: (TypeId, FieldRef),
    there: (TypeId, FieldRef),
    kind: RelationKind,
) -> MappingRelation {
    let (source, target) = if site.source_type == here.0 {
        (here, there)
    } else {
        (there, here)
    };
    MappingRelation {
        source_type: source.0,
        source_field: source.1,
        target_type: target.0,
        target_field: target.1,
        kind,
    }
}

fn shares_field_name<I: SymbolIndex + ?Sized>(index: &I, a: TypeId, b: TypeId) -> bool {
    let names: FxHashSet<_> = index.fields_of(a, true).into_iter().map(|f| f.name).collect();
    index
        .fields_of(b, true)
        .iter()
        .any(|f| names.contains(&f.name))
}
