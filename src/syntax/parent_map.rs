//! Upward edges for a [`SyntaxTree`].

use super::node::NodeId;
use super::tree::SyntaxTree;

/// Maps every node to its parent.
///
/// Built once per tree; the tree itself only stores downward edges.
#[derive(Clone, Debug)]
pub struct ParentMap {
    parents: Vec<Option<NodeId>>,
}

impl ParentMap {
    pub fn new(tree: &SyntaxTree) -> Self {
        let mut parents = vec![None; tree.len()];
        for (id, node) in tree.iter() {
            for child in node.kind.children() {
                if child >= id {
                    continue;
                }
                // Keep the first parent if a malformed tree shares a child.
                match parents.get_mut(child.index()) {
                    Some(slot) if slot.is_none() => *slot = Some(id),
                    _ => {}
                }
            }
        }
        Self { parents }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(id.index()).copied().flatten()
    }

    /// `id` itself followed by its ancestors up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| self.parent(*current))
    }

    /// The nearest node, starting at `id`, that is an expression.
    pub fn up_expr(&self, tree: &SyntaxTree, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|ancestor| tree.kind(*ancestor).is_some_and(|kind| kind.is_expression()))
    }
}
