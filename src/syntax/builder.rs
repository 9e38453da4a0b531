//! Programmatic tree construction.
//!
//! A parser uses [`TreeBuilder::push`] with the ranges it computed. The
//! remaining constructors assign ranges themselves: leaves get a fresh
//! range after everything allocated so far, and composite nodes cover their
//! children. This keeps hand-built trees deterministic, which is what tests
//! rely on.

use crate::base::{TextRange, TextSize};

use super::node::{AttrName, BinaryOp, Node, NodeId, NodeKind, StringPart, UnaryOp};
use super::tree::SyntaxTree;

/// Builds a [`SyntaxTree`] bottom-up. Children must be created before parents.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    cursor: TextSize,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node with an explicit range.
    pub fn push(&mut self, kind: NodeKind, range: TextRange) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.cursor = self.cursor.max(range.end() + TextSize::from(1));
        self.nodes.push(Node { kind, range });
        id
    }

    pub fn finish(self, root: NodeId) -> SyntaxTree {
        SyntaxTree::from_parts(self.nodes, root)
    }

    fn leaf(&mut self, kind: NodeKind, width: usize) -> NodeId {
        let start = self.cursor;
        let range = TextRange::at(start, TextSize::from(width.max(1) as u32));
        self.push(kind, range)
    }

    fn composite(&mut self, kind: NodeKind) -> NodeId {
        let range = kind
            .children()
            .iter()
            .filter_map(|child| self.nodes.get(child.index()).map(|node| node.range))
            .reduce(|acc, range| acc.cover(range));
        match range {
            Some(range) => self.push(kind, range),
            None => self.leaf(kind, 2),
        }
    }

    // ========================================================================
    // LEAVES
    // ========================================================================

    /// An error-recovery node.
    pub fn null(&mut self) -> NodeId {
        self.leaf(NodeKind::Null, 1)
    }

    pub fn int(&mut self, value: i64) -> NodeId {
        self.leaf(NodeKind::Int(value), value.to_string().len())
    }

    pub fn float(&mut self, value: f64) -> NodeId {
        self.leaf(NodeKind::Float(value), value.to_string().len())
    }

    pub fn path(&mut self, path: &str) -> NodeId {
        self.leaf(NodeKind::Path(path.into()), path.len())
    }

    /// A string literal without interpolation.
    pub fn string(&mut self, text: &str) -> NodeId {
        self.leaf(
            NodeKind::String(vec![StringPart::Literal(text.into())]),
            text.len() + 2,
        )
    }

    pub fn interpolated_string(&mut self, parts: Vec<StringPart>) -> NodeId {
        self.composite(NodeKind::String(parts))
    }

    pub fn var(&mut self, name: &str) -> NodeId {
        self.leaf(NodeKind::Var(name.into()), name.len())
    }

    pub fn ident(&mut self, name: &str) -> NodeId {
        self.leaf(NodeKind::Identifier(name.into()), name.len())
    }

    // ========================================================================
    // ATTRIBUTES
    // ========================================================================

    pub fn attr_name(&mut self, name: &str) -> NodeId {
        self.leaf(NodeKind::AttrName(AttrName::Ident(name.into())), name.len())
    }

    pub fn string_attr_name(&mut self, string: NodeId) -> NodeId {
        self.composite(NodeKind::AttrName(AttrName::String(string)))
    }

    pub fn dynamic_attr_name(&mut self, expr: NodeId) -> NodeId {
        self.composite(NodeKind::AttrName(AttrName::Interpolation(expr)))
    }

    pub fn attr_path(&mut self, names: Vec<NodeId>) -> NodeId {
        self.composite(NodeKind::AttrPath(names))
    }

    pub fn binding(&mut self, path: NodeId, value: NodeId) -> NodeId {
        self.composite(NodeKind::Binding { path, value })
    }

    /// `name = value;`
    pub fn bind(&mut self, name: &str, value: NodeId) -> NodeId {
        self.bind_path(&[name], value)
    }

    /// `a.b.c = value;`
    pub fn bind_path(&mut self, names: &[&str], value: NodeId) -> NodeId {
        let names = names.iter().map(|name| self.attr_name(name)).collect();
        let path = self.attr_path(names);
        self.binding(path, value)
    }

    /// `inherit (from) name...;` with pre-built name nodes.
    pub fn inherit_nodes(&mut self, from: Option<NodeId>, names: Vec<NodeId>) -> NodeId {
        self.composite(NodeKind::Inherit { from, names })
    }

    /// `inherit name...;`
    pub fn inherit(&mut self, names: &[&str]) -> NodeId {
        let names = names.iter().map(|name| self.attr_name(name)).collect();
        self.inherit_nodes(None, names)
    }

    /// `inherit (from) name...;`
    pub fn inherit_from(&mut self, from: NodeId, names: &[&str]) -> NodeId {
        let names = names.iter().map(|name| self.attr_name(name)).collect();
        self.inherit_nodes(Some(from), names)
    }

    pub fn attrs(&mut self, bindings: Vec<NodeId>) -> NodeId {
        self.composite(NodeKind::Attrs {
            rec: false,
            bindings,
        })
    }

    pub fn rec_attrs(&mut self, bindings: Vec<NodeId>) -> NodeId {
        self.composite(NodeKind::Attrs {
            rec: true,
            bindings,
        })
    }

    /// `expr.a.b`
    pub fn select(&mut self, expr: NodeId, names: &[&str], default: Option<NodeId>) -> NodeId {
        let names = names.iter().map(|name| self.attr_name(name)).collect();
        let path = self.attr_path(names);
        self.composite(NodeKind::Select {
            expr,
            path,
            default,
        })
    }

    /// `expr ? a.b`
    pub fn has_attr(&mut self, expr: NodeId, names: &[&str]) -> NodeId {
        let names = names.iter().map(|name| self.attr_name(name)).collect();
        let path = self.attr_path(names);
        self.composite(NodeKind::HasAttr { expr, path })
    }

    // ========================================================================
    // SCOPES
    // ========================================================================

    pub fn let_in(&mut self, bindings: Vec<NodeId>, body: NodeId) -> NodeId {
        self.composite(NodeKind::Let { bindings, body })
    }

    pub fn with(&mut self, subject: NodeId, body: NodeId) -> NodeId {
        self.composite(NodeKind::With { subject, body })
    }

    /// `arg: body`
    pub fn lambda(&mut self, arg: &str, body: NodeId) -> NodeId {
        let arg = self.ident(arg);
        self.composite(NodeKind::Lambda {
            arg: Some(arg),
            formals: None,
            body,
        })
    }

    /// `arg @ { formals }: body`, or `{ formals }: body` without `arg`.
    pub fn lambda_formals(&mut self, arg: Option<&str>, formals: NodeId, body: NodeId) -> NodeId {
        let arg = arg.map(|arg| self.ident(arg));
        self.composite(NodeKind::Lambda {
            arg,
            formals: Some(formals),
            body,
        })
    }

    pub fn formal(&mut self, name: &str, default: Option<NodeId>) -> NodeId {
        let name = self.ident(name);
        self.composite(NodeKind::Formal { name, default })
    }

    pub fn formals(&mut self, formals: Vec<NodeId>, ellipsis: bool) -> NodeId {
        self.composite(NodeKind::Formals { formals, ellipsis })
    }

    // ========================================================================
    // OTHER EXPRESSIONS
    // ========================================================================

    pub fn if_then_else(&mut self, cond: NodeId, then_branch: NodeId, else_branch: NodeId) -> NodeId {
        self.composite(NodeKind::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    pub fn assert(&mut self, cond: NodeId, body: NodeId) -> NodeId {
        self.composite(NodeKind::Assert { cond, body })
    }

    pub fn list(&mut self, items: Vec<NodeId>) -> NodeId {
        self.composite(NodeKind::List(items))
    }

    pub fn call(&mut self, func: NodeId, args: Vec<NodeId>) -> NodeId {
        self.composite(NodeKind::Call { func, args })
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        self.composite(NodeKind::UnaryOp { op, operand })
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.composite(NodeKind::BinaryOp { op, lhs, rhs })
    }

    pub fn paren(&mut self, inner: NodeId) -> NodeId {
        self.composite(NodeKind::Paren(inner))
    }
}
