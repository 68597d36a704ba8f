//! Assertions over call hierarchy trees.

use std::collections::HashSet;

use fieldtrace::CallNode;

/// Panics if any node key occurs twice on one root-to-leaf path.
pub fn assert_no_repeated_keys(tree: &CallNode) {
    for path in tree.paths() {
        let mut seen = HashSet::new();
        for node in &path {
            assert!(
                seen.insert(node.key()),
                "'{}' repeats on path {:?}",
                node.label,
                labels(&path)
            );
        }
    }
}

pub fn labels(path: &[&CallNode]) -> Vec<String> {
    path.iter().map(|n| n.label.clone()).collect()
}

/// Method names of the direct children, in order.
pub fn child_names(node: &CallNode) -> Vec<&str> {
    node.children.iter().map(|c| c.method_name.as_str()).collect()
}

/// The unique child with the given method name.
pub fn child<'t>(node: &'t CallNode, method_name: &str) -> &'t CallNode {
    let matches: Vec<_> = node
        .children
        .iter()
        .filter(|c| c.method_name == method_name)
        .collect();
    assert_eq!(
        matches.len(),
        1,
        "expected one '{}' under '{}', children: {:?}",
        method_name,
        node.label,
        child_names(node)
    );
    matches[0]
}
