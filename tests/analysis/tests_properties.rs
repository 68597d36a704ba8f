//! Structural properties every call hierarchy satisfies.

use fieldtrace::hir::{CallBuilder, MethodBuilder, ProjectBuilder, TypeBuilder};
use fieldtrace::{
    AnalysisConfig, CallNode, CancellationToken, FieldRef, ProjectIndex, SymbolIndex,
    analyze_call_hierarchy,
};
use rstest::rstest;

use crate::helpers::project_fixtures::*;
use crate::helpers::tree_assertions::*;

fn hierarchy(index: &impl SymbolIndex, seed: &FieldRef, config: &AnalysisConfig) -> CallNode {
    analyze_call_hierarchy(index, seed, config, &CancellationToken::new()).unwrap()
}

/// Two services calling each other, both reading the field.
fn mutual_recursion() -> ProjectIndex {
    ProjectBuilder::new()
        .with_type(TypeBuilder::class("com.acme.Ledger").field("total", "long"))
        .with_type(
            TypeBuilder::class("com.acme.PingService").method(
                MethodBuilder::new("ping")
                    .call(CallBuilder::new("getTotal").on_var("l", "com.acme.Ledger").at(3))
                    .call(CallBuilder::new("pong").on_var("p", "com.acme.PongService").at(4)),
            ),
        )
        .with_type(
            TypeBuilder::class("com.acme.PongService").method(
                MethodBuilder::new("pong")
                    .call(CallBuilder::new("getTotal").on_var("l", "com.acme.Ledger").at(7))
                    .call(CallBuilder::new("ping").on_var("p", "com.acme.PingService").at(8)),
            ),
        )
        .build()
}

/// `getLevel()` called from `m0`, `m0` from `m1`, and so on.
fn call_chain(len: usize) -> ProjectIndex {
    let mut chain = TypeBuilder::class("com.acme.Chain");
    for i in 0..len {
        let call = if i == 0 {
            CallBuilder::new("getLevel").on_var("gauge", "com.acme.Gauge")
        } else {
            CallBuilder::new(format!("m{}", i - 1)).on_this()
        };
        chain = chain.method(MethodBuilder::new(format!("m{i}")).call(call.at(i as u32 + 1)));
    }
    ProjectBuilder::new()
        .with_type(TypeBuilder::class("com.acme.Gauge").field("level", "int"))
        .with_type(chain)
        .build()
}

#[test]
fn test_no_key_repeats_on_a_path() {
    let index = mutual_recursion();
    let seed = seed(&index, "com.acme.Ledger", "total");
    let tree = hierarchy(&index, &seed, &AnalysisConfig::default());
    assert_no_repeated_keys(&tree);
    assert!(tree.iter().any(|n| n.method_name == "ping"));
    assert!(tree.iter().any(|n| n.method_name == "pong"));
}

#[test]
fn test_order_scenario_has_no_repeated_keys() {
    let index = order_project(true);
    let seed = seed(&index, "com.acme.OrderDto", "amount");
    assert_no_repeated_keys(&hierarchy(&index, &seed, &AnalysisConfig::default()));
}

#[rstest]
#[case(1)]
#[case(3)]
#[case(8)]
fn test_depth_never_exceeds_limit_plus_one(#[case] max_depth: usize) {
    let index = call_chain(20);
    let seed = seed(&index, "com.acme.Gauge", "level");
    let tree = hierarchy(&index, &seed, &AnalysisConfig::default().with_max_depth(max_depth));
    assert!(
        tree.depth() <= max_depth + 1,
        "depth {} over limit {}",
        tree.depth(),
        max_depth
    );
}

#[test]
fn test_short_chain_is_fully_expanded() {
    let index = call_chain(4);
    let seed = seed(&index, "com.acme.Gauge", "level");
    let tree = hierarchy(&index, &seed, &AnalysisConfig::default());
    let deepest = tree
        .find_path(|n| n.method_name == "m3")
        .expect("the end of the chain should be reached");
    let names: Vec<_> = deepest.iter().map(|n| n.method_name.as_str()).collect();
    assert_eq!(names, vec!["level", "getLevel", "m0", "m1", "m2", "m3"]);
}

#[test]
fn test_caller_cap_limits_fan_out() {
    let mut reader = TypeBuilder::class("com.acme.Reader");
    for i in 0..10 {
        reader = reader.method(
            MethodBuilder::new(format!("read{i}"))
                .call(CallBuilder::new("getLevel").on_var("g", "com.acme.Gauge").at(i + 1)),
        );
    }
    let index = ProjectBuilder::new()
        .with_type(TypeBuilder::class("com.acme.Gauge").field("level", "int"))
        .with_type(reader)
        .build();
    let seed = seed(&index, "com.acme.Gauge", "level");
    let tree = hierarchy(&index, &seed, &AnalysisConfig::default().with_max_callers(3));
    assert_eq!(
        child_names(child(&tree, "getLevel")),
        vec!["read0", "read1", "read2"]
    );
}

#[test]
fn test_repeated_runs_are_identical() {
    let index = order_project(true);
    let seed = seed(&index, "com.acme.OrderDto", "amount");
    let config = AnalysisConfig::default();
    let first = hierarchy(&index, &seed, &config);
    let second = hierarchy(&index, &seed, &config);
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
}

#[test]
fn test_caller_strategies_agree() {
    let native = order_project(true);
    let scanned = order_project(false);
    assert!(native.supports_native_callers());
    assert!(!scanned.supports_native_callers());

    let config = AnalysisConfig::default();
    let a = hierarchy(&native, &seed(&native, "com.acme.OrderDto", "amount"), &config);
    let b = hierarchy(&scanned, &seed(&scanned, "com.acme.OrderDto", "amount"), &config);
    assert_eq!(a, b);
}
