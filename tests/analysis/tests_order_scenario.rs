//! The order service scenario: a DTO mapped to an entity inside a service
//! called from a REST controller.

use fieldtrace::analysis::RelationKind;
use fieldtrace::{
    AnalysisConfig, CancellationToken, NodeCategory, SymbolIndex, analyze_call_hierarchy,
    analyze_mapping_relations,
};

use crate::helpers::project_fixtures::*;
use crate::helpers::tree_assertions::*;

#[test]
fn test_amount_maps_directly_to_entity() {
    let index = order_project(true);
    let seed = seed(&index, "com.acme.OrderDto", "amount");
    let relations = analyze_mapping_relations(
        &index,
        &seed,
        &AnalysisConfig::default(),
        &CancellationToken::new(),
    )
    .unwrap();

    assert_eq!(relations.len(), 1);
    let relation = &relations[0];
    assert_eq!(relation.kind, RelationKind::Direct);
    assert_eq!(index.type_name(relation.source_type), "com.acme.OrderDto");
    assert_eq!(index.type_name(relation.target_type), "com.acme.OrderEntity");
    assert_eq!(relation.source_field.name, "amount");
    assert_eq!(relation.target_field.name, "amount");
    assert!(index.field_decl(&relation.source_field).is_some());
    assert!(index.field_decl(&relation.target_field).is_some());
}

#[test]
fn test_field_only_on_entity_has_no_relation() {
    let index = order_project(true);
    let seed = seed(&index, "com.acme.OrderEntity", "createdAt");
    let relations = analyze_mapping_relations(
        &index,
        &seed,
        &AnalysisConfig::default(),
        &CancellationToken::new(),
    )
    .unwrap();
    assert!(relations.is_empty());
}

#[test]
fn test_hierarchy_reaches_controller_through_mapping() {
    let index = order_project(true);
    let seed = seed(&index, "com.acme.OrderDto", "amount");
    let tree = analyze_call_hierarchy(
        &index,
        &seed,
        &AnalysisConfig::default(),
        &CancellationToken::new(),
    )
    .unwrap();

    assert_eq!(tree.category, NodeCategory::Field);
    assert_eq!(tree.label, "OrderDto.amount");
    assert_eq!(
        child_names(&tree),
        vec!["getAmount", "setAmount", "com.acme.OrderEntity"]
    );

    let mapping = child(&tree, "com.acme.OrderEntity");
    assert_eq!(mapping.category, NodeCategory::Mapping);
    assert_eq!(mapping.label, "OrderDto → OrderEntity");
    assert_eq!(mapping.location.map(|l| l.line()), Some(14));

    let save = child(mapping, "save");
    assert_eq!(save.category, NodeCategory::Service);
    assert_eq!(save.label, "OrderService.save(OrderDto)");

    let create = child(save, "create");
    assert_eq!(create.category, NodeCategory::EntryPoint);
    assert!(create.is_leaf());
    assert_eq!(create.location.map(|l| l.line()), Some(22));

    let mapped = child(mapping, "amount");
    assert_eq!(mapped.category, NodeCategory::Field);
    assert_eq!(mapped.owner_type, "com.acme.OrderEntity");
}

#[test]
fn test_entry_point_path_categories() {
    let index = order_project(true);
    let seed = seed(&index, "com.acme.OrderDto", "amount");
    let tree = analyze_call_hierarchy(
        &index,
        &seed,
        &AnalysisConfig::default(),
        &CancellationToken::new(),
    )
    .unwrap();

    let path = tree
        .find_path(|n| n.category == NodeCategory::EntryPoint)
        .expect("an entry point should be reachable");
    let categories: Vec<_> = path.iter().map(|n| n.category).collect();
    assert_eq!(
        categories,
        vec![
            NodeCategory::Field,
            NodeCategory::Mapping,
            NodeCategory::Service,
            NodeCategory::EntryPoint,
        ]
    );
}

#[test]
fn test_synthetic_accessors_are_labelled() {
    let index = order_project(true);
    let seed = seed(&index, "com.acme.OrderDto", "amount");
    let tree = analyze_call_hierarchy(
        &index,
        &seed,
        &AnalysisConfig::default(),
        &CancellationToken::new(),
    )
    .unwrap();

    let getter = child(&tree, "getAmount");
    assert_eq!(getter.category, NodeCategory::AccessorGet);
    assert_eq!(getter.label, "OrderDto.getAmount() (synthetic)");
    let setter = child(&tree, "setAmount");
    assert_eq!(setter.category, NodeCategory::AccessorSet);
    assert_eq!(setter.param_signature, "(java.math.BigDecimal)");
}
