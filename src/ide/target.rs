//! Mapping a cursor offset to the binding it talks about.

use crate::base::TextSize;
use crate::sema::{Analysis, DefId};
use crate::syntax::{NodeId, SyntaxTree};

/// The innermost node at `offset`.
pub(crate) fn node_at(tree: &SyntaxTree, offset: TextSize) -> Option<NodeId> {
    tree.node_at_offset(offset)
}

/// The definition named at `offset`, preferring the binding a node
/// introduces over the one it refers to.
///
/// The two differ for `inherit x;`: the name both introduces an attribute
/// and refers to an outer `x`.
pub(crate) fn definition_at(tree: &SyntaxTree, analysis: &Analysis, offset: TextSize) -> Option<DefId> {
    let node = node_at(tree, offset)?;
    analysis
        .to_def(node)
        .or_else(|| analysis.resolved_def(node))
}
