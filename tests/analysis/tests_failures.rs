//! Failure containment and cancellation.

use fieldtrace::hir::{Declaration, IndexError};
use fieldtrace::{
    AnalysisConfig, AnalysisError, CancellationToken, FieldRef, NodeCategory, SymbolIndex, TypeId,
    analyze_call_hierarchy, analyze_mapping_relations,
};

use crate::helpers::hooked_index::{HookedIndex, Query};
use crate::helpers::project_fixtures::*;
use crate::helpers::tree_assertions::*;

#[test]
fn test_pre_cancelled_runs_report_cancellation() {
    let index = order_project(true);
    let seed = seed(&index, "com.acme.OrderDto", "amount");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let tree = analyze_call_hierarchy(&index, &seed, &AnalysisConfig::default(), &cancel);
    assert!(matches!(tree, Err(AnalysisError::Cancelled)));

    let relations = analyze_mapping_relations(&index, &seed, &AnalysisConfig::default(), &cancel);
    assert!(matches!(relations, Err(AnalysisError::Cancelled)));
}

#[test]
fn test_cancellation_during_walk_drops_the_tree() {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let index = HookedIndex::new(order_project(false), move |_, _| {
        trigger.cancel();
        Ok(())
    });
    let seed = seed(&index, "com.acme.OrderDto", "amount");

    let result = analyze_call_hierarchy(&index, &seed, &AnalysisConfig::default(), &cancel);
    assert!(result.unwrap_err().is_cancelled());
}

#[test]
fn test_panicking_branch_becomes_a_leaf() {
    let index = HookedIndex::new(order_project(false), |_, query| {
        if let Query::References(Declaration::Method(method)) = query {
            if method.name == "save" {
                panic!("index blew up on save");
            }
        }
        Ok(())
    });
    let seed = seed(&index, "com.acme.OrderDto", "amount");
    let tree =
        analyze_call_hierarchy(&index, &seed, &AnalysisConfig::default(), &CancellationToken::new())
            .unwrap();

    let mapping = child(&tree, "com.acme.OrderEntity");
    let save = child(mapping, "save");
    assert_eq!(save.category, NodeCategory::Service);
    assert!(save.is_leaf());
    // The sibling branch is unaffected.
    assert_eq!(child(mapping, "amount").category, NodeCategory::Field);
    assert!(tree.with_category(NodeCategory::EntryPoint).is_empty());
}

#[test]
fn test_failing_reference_search_becomes_a_leaf() {
    let index = HookedIndex::new(order_project(false), |_, query| match query {
        Query::References(Declaration::Method(method)) if method.name == "save" => {
            Err(IndexError::Fault("stale reference table".into()))
        }
        _ => Ok(()),
    });
    let seed = seed(&index, "com.acme.OrderDto", "amount");
    let tree =
        analyze_call_hierarchy(&index, &seed, &AnalysisConfig::default(), &CancellationToken::new())
            .unwrap();

    let mapping = child(&tree, "com.acme.OrderEntity");
    let save = child(mapping, "save");
    assert_eq!(save.category, NodeCategory::Service);
    assert!(save.is_leaf());
    assert_eq!(child(mapping, "amount").category, NodeCategory::Field);
    assert_eq!(child_names(&tree), ["getAmount", "setAmount", "com.acme.OrderEntity"]);
}

#[test]
fn test_panicking_field_listing_skips_the_type() {
    let index = HookedIndex::new(order_project(false), |inner, query| {
        if let Query::Fields(ty) = query {
            if inner.type_name(ty) == "com.acme.OrderEntity" {
                panic!("field table missing for OrderEntity");
            }
        }
        Ok(())
    });
    let seed = seed(&index, "com.acme.OrderDto", "amount");

    let relations = analyze_mapping_relations(
        &index,
        &seed,
        &AnalysisConfig::default(),
        &CancellationToken::new(),
    )
    .unwrap();
    assert!(relations.is_empty());

    let tree =
        analyze_call_hierarchy(&index, &seed, &AnalysisConfig::default(), &CancellationToken::new())
            .unwrap();
    assert_eq!(tree.category, NodeCategory::Field);
    assert!(child_names(&tree).starts_with(&["getAmount", "setAmount"]));
    // Nothing was reached across the mapping.
    assert_eq!(tree.with_category(NodeCategory::Field).len(), 1);
}

#[test]
fn test_seed_on_unknown_type_is_root_only() {
    let index = order_project(true);
    let past_end = TypeId::new(index.all_types().len() as u32 + 7);
    let seed = FieldRef::new(past_end, "amount");

    let tree =
        analyze_call_hierarchy(&index, &seed, &AnalysisConfig::default(), &CancellationToken::new())
            .unwrap();
    assert!(tree.is_leaf());
    assert_eq!(tree.category, NodeCategory::Field);

    let relations = analyze_mapping_relations(
        &index,
        &seed,
        &AnalysisConfig::default(),
        &CancellationToken::new(),
    )
    .unwrap();
    assert!(relations.is_empty());
}
