//! Analysis configuration loaded from JSON.

use std::fs;

use fieldtrace::AnalysisConfig;
use fieldtrace::analysis::{DEFAULT_MAX_CALLERS, DEFAULT_MAX_DEPTH};
use fieldtrace::interchange::{InterchangeError, load_config, load_config_file};

#[test]
fn test_empty_document_is_default() {
    assert_eq!(load_config("{}").unwrap(), AnalysisConfig::default());
}

#[test]
fn test_partial_document_keeps_other_defaults() {
    let config = load_config(
        r#"{
            "max_depth": 4,
            "conventions": { "service_owner_suffixes": ["Manager"] }
        }"#,
    )
    .unwrap();
    assert_eq!(config.max_depth, 4);
    assert_ne!(config.max_depth, DEFAULT_MAX_DEPTH);
    assert_eq!(config.max_callers, DEFAULT_MAX_CALLERS);
    assert_eq!(config.conventions.service_owner_suffixes, vec!["Manager"]);
    assert!(!config.conventions.entry_point_owner_suffixes.is_empty());
    assert_eq!(config.mapping, AnalysisConfig::default().mapping);
}

#[test]
fn test_zero_caps_are_rejected() {
    let err = load_config(r#"{ "max_callers": 0 }"#).unwrap_err();
    assert!(matches!(err, InterchangeError::Invalid { kind: "config", .. }));
    let err = load_config(r#"{ "mapping": { "methods": [] } }"#).unwrap_err();
    assert!(matches!(err, InterchangeError::Invalid { kind: "config", .. }));
}

#[test]
fn test_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fieldtrace.json");
    fs::write(&path, r#"{ "max_nodes": 100 }"#).unwrap();
    assert_eq!(load_config_file(&path).unwrap().max_nodes, 100);
}
