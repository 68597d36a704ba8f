//! Call hierarchy trees.
//!
//! A [`CallNode`] tree is rooted at the traced field. Children are the
//! things that reach their parent: accessors, callers and mapping
//! transforms. A node's identity for cycle detection is its [`NodeKey`].

use std::fmt;

use smol_str::SmolStr;

use super::classify::NodeCategory;
use crate::base::CodeLocation;

/// Identity of a node along one path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub owner_type: SmolStr,
    pub method_name: SmolStr,
    pub param_signature: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
pub struct CallNode {
    /// Qualified name of the type the node belongs to.
    pub owner_type: SmolStr,
    /// Method, accessor or field name.
    pub method_name: SmolStr,
    pub param_signature: SmolStr,
    /// Call site or declaration position, when known.
    #[cfg_attr(feature = "interchange", serde(skip))]
    pub location: Option<CodeLocation>,
    pub category: NodeCategory,
    pub label: String,
    pub children: Vec<CallNode>,
}

impl CallNode {
    pub fn key(&self) -> NodeKey {
        NodeKey {
            owner_type: self.owner_type.clone(),
            method_name: self.method_name.clone(),
            param_signature: self.param_signature.clone(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|c| (c, depth + 1)));
        }
        deepest
    }

    /// Pre-order traversal.
    pub fn iter(&self) -> impl Iterator<Item = &CallNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Every root-to-leaf path.
    pub fn paths(&self) -> Vec<Vec<&CallNode>> {
        let mut out = Vec::new();
        let mut stack: Vec<Vec<&CallNode>> = vec![vec![self]];
        while let Some(path) = stack.pop() {
            let Some(&last) = path.last() else {
                continue;
            };
            if last.is_leaf() {
                out.push(path);
                continue;
            }
            for child in last.children.iter().rev() {
                let mut next = path.clone();
                next.push(child);
                stack.push(next);
            }
        }
        out
    }

    /// First path (pre-order) from this node to a node matching `pred`.
    pub fn find_path(&self, pred: impl Fn(&CallNode) -> bool) -> Option<Vec<&CallNode>> {
        let mut stack: Vec<Vec<&CallNode>> = vec![vec![self]];
        while let Some(path) = stack.pop() {
            let last = *path.last()?;
            if pred(last) {
                return Some(path);
            }
            for child in last.children.iter().rev() {
                let mut next = path.clone();
                next.push(child);
                stack.push(next);
            }
        }
        None
    }

    /// Nodes of the given category, pre-order.
    pub fn with_category(&self, category: NodeCategory) -> Vec<&CallNode> {
        self.iter().filter(|n| n.category == category).collect()
    }
}

impl fmt::Display for CallNode {
    /// Indented outline, one node per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            write!(f, "{:indent$}{} [{}]", "", node.label, node.category, indent = depth * 2)?;
            if let Some(location) = node.location {
                write!(f, " @{}", location)?;
            }
            writeln!(f)?;
            stack.extend(node.children.iter().rev().map(|c| (c, depth + 1)));
        }
        Ok(())
    }
}
