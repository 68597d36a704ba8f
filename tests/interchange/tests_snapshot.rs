//! Project snapshots loaded from JSON.

use std::io::Write;

use fieldtrace::interchange::{
    InterchangeError, load_project, load_project_file, write_call_tree, write_relations,
};
use fieldtrace::{
    AnalysisConfig, CancellationToken, SymbolIndex, analyze_call_hierarchy,
    analyze_mapping_relations,
};
use tempfile::NamedTempFile;

use crate::helpers::project_fixtures::*;

const ORDER_SNAPSHOT: &str = r#"{
  "native_callers": true,
  "types": [
    {
      "name": "com.acme.OrderDto",
      "line": 3,
      "fields": [
        { "name": "id", "type": "java.lang.Long" },
        { "name": "amount", "type": "java.math.BigDecimal" }
      ]
    },
    {
      "name": "com.acme.OrderEntity",
      "line": 5,
      "fields": [
        { "name": "id", "type": "java.lang.Long" },
        { "name": "amount", "type": "java.math.BigDecimal" },
        { "name": "createdAt", "type": "java.time.Instant" }
      ]
    },
    {
      "name": "com.acme.OrderService",
      "annotations": ["Service"],
      "fields": [{ "name": "mapperFacade", "type": "ma.glasnost.orika.MapperFacade" }],
      "methods": [{
        "name": "save",
        "params": ["com.acme.OrderDto"],
        "returns": "com.acme.OrderEntity",
        "line": 12,
        "body": [{
          "kind": "call",
          "member": "map",
          "receiver": { "kind": "var", "name": "mapperFacade", "type": "ma.glasnost.orika.MapperFacade" },
          "args": [
            { "kind": "var", "name": "dto", "type": "com.acme.OrderDto" },
            { "kind": "class", "type": "com.acme.OrderEntity" }
          ],
          "returns": "com.acme.OrderEntity",
          "line": 14
        }]
      }]
    },
    {
      "name": "com.acme.OrderController",
      "annotations": ["RestController"],
      "fields": [{ "name": "orderService", "type": "com.acme.OrderService" }],
      "methods": [{
        "name": "create",
        "params": ["com.acme.OrderDto"],
        "annotations": ["PostMapping"],
        "line": 20,
        "body": [{
          "kind": "call",
          "member": "save",
          "receiver": { "kind": "var", "name": "orderService", "type": "com.acme.OrderService" },
          "args": [{ "kind": "var", "name": "dto", "type": "com.acme.OrderDto" }],
          "line": 22
        }]
      }]
    }
  ]
}"#;

#[test]
fn test_snapshot_builds_same_tree_as_builder() {
    let loaded = load_project(ORDER_SNAPSHOT).unwrap();
    let built = order_project(true);
    assert_eq!(loaded.all_types().len(), 4);

    let config = AnalysisConfig::default();
    let cancel = CancellationToken::new();
    let from_json = analyze_call_hierarchy(
        &loaded,
        &seed(&loaded, "com.acme.OrderDto", "amount"),
        &config,
        &cancel,
    )
    .unwrap();
    let from_builder = analyze_call_hierarchy(
        &built,
        &seed(&built, "com.acme.OrderDto", "amount"),
        &config,
        &cancel,
    )
    .unwrap();
    assert_eq!(from_json.to_string(), from_builder.to_string());
}

#[test]
fn test_snapshot_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(ORDER_SNAPSHOT.as_bytes()).unwrap();

    let index = load_project_file(file.path()).unwrap();
    assert!(index.resolve_type("com.acme.OrderController").is_some());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_project_file(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, InterchangeError::Io(_)));
}

#[test]
fn test_malformed_json_is_json_error() {
    let err = load_project(r#"{ "types": [ { "name": "com.acme.X", "#).unwrap_err();
    assert!(matches!(err, InterchangeError::Json(_)));
}

#[test]
fn test_unnamed_type_is_invalid() {
    let err = load_project(r#"{ "types": [ { "name": "  " } ] }"#).unwrap_err();
    assert!(matches!(err, InterchangeError::Invalid { kind: "type", .. }));
}

#[test]
fn test_native_callers_flag_is_honoured() {
    let index = load_project(r#"{ "native_callers": false, "types": [] }"#).unwrap();
    assert!(!index.supports_native_callers());
    let index = load_project(r#"{ "types": [] }"#).unwrap();
    assert!(index.supports_native_callers());
}

#[test]
fn test_results_serialize() {
    let index = load_project(ORDER_SNAPSHOT).unwrap();
    let seed = seed(&index, "com.acme.OrderDto", "amount");
    let config = AnalysisConfig::default();
    let cancel = CancellationToken::new();

    let relations = analyze_mapping_relations(&index, &seed, &config, &cancel).unwrap();
    let json = write_relations(&index, &relations).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value[0]["source_type"], "com.acme.OrderDto");
    assert_eq!(value[0]["target_field"], "amount");
    assert_eq!(value[0]["kind"], "DIRECT");

    let tree = analyze_call_hierarchy(&index, &seed, &config, &cancel).unwrap();
    let json = write_call_tree(&tree).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["category"], "FIELD");
    assert_eq!(value["label"], "OrderDto.amount");
    assert!(value.get("location").is_none());
}
