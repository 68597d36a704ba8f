//! Accessor synthesis as seen in call hierarchies.

use fieldtrace::hir::{CallBuilder, MethodBuilder, ProjectBuilder, TypeBuilder};
use fieldtrace::{
    AnalysisConfig, CallNode, CancellationToken, NodeCategory, ProjectIndex,
    analyze_call_hierarchy,
};
use rstest::rstest;

use crate::helpers::project_fixtures::*;
use crate::helpers::tree_assertions::*;

fn tree_of(index: &ProjectIndex, ty: &str, field: &str) -> CallNode {
    let seed = seed(index, ty, field);
    analyze_call_hierarchy(
        index,
        &seed,
        &AnalysisConfig::default(),
        &CancellationToken::new(),
    )
    .unwrap()
}

#[rstest]
#[case("active", "isActive", "setActive", "render")]
#[case("archived", "getArchived", "setArchived", "purge")]
fn test_boolean_getter_prefix(
    #[case] field: &str,
    #[case] getter: &str,
    #[case] setter: &str,
    #[case] reader: &str,
) {
    let index = flags_project();
    let tree = tree_of(&index, "com.acme.Flags", field);

    assert_eq!(child_names(&tree), vec![getter, setter]);
    let get = child(&tree, getter);
    assert_eq!(get.category, NodeCategory::AccessorGet);
    assert_eq!(child_names(get), vec![reader]);
    assert!(child(&tree, setter).is_leaf());
}

#[test]
fn test_declared_getter_collects_dispatch_and_name_references() {
    let index = ProjectBuilder::new()
        .with_type(
            TypeBuilder::class("com.acme.Account")
                .field("balance", "long")
                .method(MethodBuilder::new("getBalance").returns("long").at(8)),
        )
        .with_type(
            TypeBuilder::class("com.acme.SavingsAccount")
                .extends("com.acme.Account")
                .method(MethodBuilder::new("getBalance").returns("long").at(4)),
        )
        .with_type(
            TypeBuilder::class("com.acme.Statement")
                .method(
                    MethodBuilder::new("print").call(
                        CallBuilder::new("getBalance")
                            .on_var("account", "com.acme.Account")
                            .at(11),
                    ),
                )
                .method(
                    MethodBuilder::new("printSavings").call(
                        CallBuilder::new("getBalance")
                            .on_var("savings", "com.acme.SavingsAccount")
                            .at(15),
                    ),
                ),
        )
        .build();
    let tree = tree_of(&index, "com.acme.Account", "balance");

    let getter = child(&tree, "getBalance");
    assert_eq!(getter.label, "Account.getBalance()");
    assert_eq!(getter.location.map(|l| l.line()), Some(8));
    assert_eq!(child_names(getter), vec!["print", "printSavings"]);

    let setter = child(&tree, "setBalance");
    assert!(setter.label.ends_with("(synthetic)"));
}

#[test]
fn test_direct_field_reads_are_callers_of_the_field() {
    let index = ProjectBuilder::new()
        .with_type(
            TypeBuilder::class("com.acme.Counter")
                .field("count", "int")
                .method(MethodBuilder::new("bump").writes("", "count", 5)),
        )
        .with_type(
            TypeBuilder::class("com.acme.CounterController").method(
                MethodBuilder::new("peek")
                    .reads("com.acme.Counter", "count", 9)
                    .annotated("GetMapping"),
            ),
        )
        .build();
    let tree = tree_of(&index, "com.acme.Counter", "count");

    assert_eq!(
        child_names(&tree),
        vec!["getCount", "setCount", "bump", "peek"]
    );
    assert_eq!(child(&tree, "peek").category, NodeCategory::EntryPoint);
    assert_eq!(child(&tree, "bump").category, NodeCategory::Plain);
}

#[test]
fn test_declared_getter_reading_its_field_appears_once() {
    let index = ProjectBuilder::new()
        .with_type(
            TypeBuilder::class("com.acme.OrderDto")
                .field("amount", "java.math.BigDecimal")
                .method(
                    MethodBuilder::new("getAmount")
                        .returns("java.math.BigDecimal")
                        .reads("", "amount", 9),
                ),
        )
        .with_type(
            TypeBuilder::class("com.acme.Report").method(
                MethodBuilder::new("print").call(
                    CallBuilder::new("getAmount")
                        .on_var("dto", "com.acme.OrderDto")
                        .at(4),
                ),
            ),
        )
        .build();
    let tree = tree_of(&index, "com.acme.OrderDto", "amount");

    assert_eq!(child_names(&tree), vec!["getAmount", "setAmount"]);
    let getter = child(&tree, "getAmount");
    assert_eq!(getter.category, NodeCategory::AccessorGet);
    assert_eq!(child_names(getter), vec!["print"]);
}
