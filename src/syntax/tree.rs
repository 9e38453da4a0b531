//! Arena-backed syntax tree.

use crate::base::{Name, TextRange, TextSize};

use super::node::{AttrName, Node, NodeId, NodeKind, StringPart};

/// An immutable syntax tree.
///
/// Nodes live in a flat arena. Every child id is smaller than the id of its
/// parent, so children always precede their parents in the arena. The
/// analyzer and the decoder both reject trees that break this ordering.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SyntaxTree {
    /// Assemble a tree from its arena. No validation is performed here.
    pub fn from_parts(nodes: Vec<Node>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.get(id).map(|node| &node.kind)
    }

    pub fn range(&self, id: NodeId) -> Option<TextRange> {
        self.get(id).map(|node| node.range)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId::new(index as u32), node))
    }

    /// Direct children of `id` in source order; empty for unknown ids.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.kind(id).map(NodeKind::children).unwrap_or_default()
    }

    /// The literal value of a string node without interpolations.
    pub fn string_literal(&self, id: NodeId) -> Option<Name> {
        let NodeKind::String(parts) = self.kind(id)? else {
            return None;
        };
        let mut text = String::new();
        for part in parts {
            match part {
                StringPart::Literal(literal) => text.push_str(literal),
                StringPart::Interpolation(_) => return None,
            }
        }
        Some(Name::from(text))
    }

    /// The name of an attribute, if it is known without evaluation.
    ///
    /// `a` and `"a"` are static; `${a}` and `"a${b}"` are not.
    pub fn static_attr_name(&self, id: NodeId) -> Option<Name> {
        match self.kind(id)? {
            NodeKind::AttrName(AttrName::Ident(name)) => Some(name.clone()),
            NodeKind::AttrName(AttrName::String(string)) => self.string_literal(*string),
            _ => None,
        }
    }

    /// The innermost node whose range covers `offset` (end inclusive).
    ///
    /// Among nodes with equal ranges the one created first wins, which is
    /// the deepest since children precede parents.
    pub fn node_at_offset(&self, offset: TextSize) -> Option<NodeId> {
        self.iter()
            .filter(|(_, node)| node.range.contains_inclusive(offset))
            .min_by_key(|(_, node)| node.range.len())
            .map(|(id, _)| id)
    }
}
