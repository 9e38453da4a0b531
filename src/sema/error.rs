//! Internal-invariant errors.
//!
//! Problems in the analysed code are reported as diagnostics. A [`SemaError`]
//! means the input tree itself breaks the contract the parser promised, and
//! the pass is abandoned.

use thiserror::Error;

use crate::syntax::{Node, NodeId, SyntaxTree};

/// The tree handed to Sema is structurally invalid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemaError {
    /// The root id does not name a node.
    #[error("root {root:?} is outside the tree ({len} nodes)")]
    MissingRoot { root: NodeId, len: usize },

    /// An id handed to the analyzer names no node.
    #[error("node {0:?} is not in the tree")]
    UnknownNode(NodeId),

    /// A node claims a child that does not exist.
    #[error("node {parent:?} refers to missing child {child:?}")]
    MissingNode { parent: NodeId, child: NodeId },

    /// A child that does not precede its parent; such trees may contain cycles.
    #[error("node {parent:?} refers to child {child:?} that does not precede it")]
    ForwardChild { parent: NodeId, child: NodeId },

    /// A node reachable through two parents; the input is a DAG, not a tree.
    #[error("node {parent:?} refers to child {child:?} that already has a parent")]
    SharedChild { parent: NodeId, child: NodeId },

    /// A structural slot holds the wrong kind of node.
    #[error("node {node:?} is a {found} where {expected} was expected")]
    UnexpectedKind {
        node: NodeId,
        expected: &'static str,
        found: &'static str,
    },
}

impl SemaError {
    /// Create a missing-child error.
    pub fn missing(parent: NodeId, child: NodeId) -> Self {
        Self::MissingNode { parent, child }
    }

    /// Create a wrong-kind error.
    pub fn unexpected(node: NodeId, expected: &'static str, found: &'static str) -> Self {
        Self::UnexpectedKind {
            node,
            expected,
            found,
        }
    }
}

/// Fetch `child` of `parent`, enforcing that it exists and precedes its parent.
pub(crate) fn child_node(
    tree: &SyntaxTree,
    parent: NodeId,
    child: NodeId,
) -> Result<&Node, SemaError> {
    if child >= parent {
        return Err(SemaError::ForwardChild { parent, child });
    }
    tree.get(child).ok_or(SemaError::missing(parent, child))
}

/// Check that everything reachable from the root forms a tree.
///
/// Runs before the pass, iteratively, so a malformed input fails fast
/// without the traversal ever seeing it.
pub(crate) fn check_shape(tree: &SyntaxTree) -> Result<(), SemaError> {
    let root = tree.root();
    if tree.get(root).is_none() {
        return Err(SemaError::MissingRoot {
            root,
            len: tree.len(),
        });
    }

    let mut claimed = vec![false; tree.len()];
    let mut stack = vec![root];
    while let Some(parent) = stack.pop() {
        let node = tree.get(parent).ok_or(SemaError::UnknownNode(parent))?;
        for child in node.kind.children() {
            child_node(tree, parent, child)?;
            match claimed.get_mut(child.index()) {
                Some(slot) if !*slot => *slot = true,
                _ => return Err(SemaError::SharedChild { parent, child }),
            }
            stack.push(child);
        }
    }
    Ok(())
}
