//! Background analyses through the host.

use fieldtrace::hir::TypeBuilder;
use fieldtrace::{AnalysisConfig, AnalysisHost, CancellationToken, SymbolIndex};

use crate::helpers::project_fixtures::*;

#[test]
fn test_spawned_hierarchy_matches_snapshot_query() {
    let host = AnalysisHost::new(order_project(true));
    let seed = seed(host.snapshot().index(), "com.acme.OrderDto", "amount");

    let expected = host
        .snapshot()
        .call_hierarchy(&seed, &CancellationToken::new())
        .unwrap();
    let task = host.spawn_call_hierarchy(seed);
    assert_eq!(task.join().unwrap(), expected);
}

#[test]
fn test_spawned_relations() {
    let host = AnalysisHost::new(order_project(true));
    let seed = seed(host.snapshot().index(), "com.acme.OrderDto", "amount");
    let relations = host.spawn_mapping_relations(seed).join().unwrap();
    assert_eq!(relations.len(), 1);
}

#[test]
fn test_cancel_before_index_is_released() {
    let host = AnalysisHost::new(order_project(true));
    let seed = seed(host.snapshot().index(), "com.acme.OrderDto", "amount");

    // The task cannot take its read guard while the update holds the
    // write guard, so it sees the cancellation before doing any work.
    let task = host.update(|_| {
        let task = host.spawn_call_hierarchy(seed);
        task.cancel();
        task
    });
    assert!(task.join().unwrap_err().is_cancelled());
}

#[test]
fn test_update_is_visible_to_later_snapshots() {
    let host = AnalysisHost::new(order_project(true))
        .with_config(AnalysisConfig::default().with_max_depth(2));
    assert_eq!(host.config().max_depth, 2);

    let before = host.snapshot().index().all_types().len();
    host.update(|index| {
        *index = fieldtrace::ProjectBuilder::new()
            .with_type(TypeBuilder::class("com.acme.Only").field("x", "int"))
            .build();
    });
    let snapshot = host.snapshot();
    assert_eq!(before, 4);
    assert_eq!(snapshot.index().all_types().len(), 1);
    assert!(snapshot.index().resolve_type("com.acme.Only").is_some());
}
