//! Node kinds of the syntax tree.
//!
//! The tree is produced by an external parser; nodes are addressed by
//! [`NodeId`] and reference their children by id.

use smol_str::SmolStr;

use crate::base::{Name, TextRange};

/// Index of a node in a [`SyntaxTree`](super::SyntaxTree) arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct NodeId(u32);

impl NodeId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// One node: its kind plus the source range it covers.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub range: TextRange,
}

/// A piece of a string literal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StringPart {
    Literal(SmolStr),
    /// `${expr}`
    Interpolation(NodeId),
}

/// The name part of an attribute path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrName {
    /// `a`
    Ident(Name),
    /// `"a"` or `"a${b}"`, points at a [`NodeKind::String`] node.
    String(NodeId),
    /// `${expr}`
    Interpolation(NodeId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Negate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
    Implication,
    /// `//`
    Update,
    /// `++`
    Concat,
    Add,
    Sub,
    Mul,
    Div,
}

/// Every construct the analyzer understands.
///
/// Binding constructs keep their entries in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Error-recovery marker. Valid anywhere an expression is expected.
    Null,
    Int(i64),
    Float(f64),
    Path(SmolStr),
    String(Vec<StringPart>),
    /// A variable reference.
    Var(Name),
    /// A binder name: lambda argument or formal.
    Identifier(Name),
    AttrName(AttrName),
    /// `a.b.c`, a non-empty list of [`NodeKind::AttrName`] nodes.
    AttrPath(Vec<NodeId>),
    /// `path = value;`
    Binding {
        path: NodeId,
        value: NodeId,
    },
    /// `inherit name...;` or `inherit (from) name...;`
    Inherit {
        from: Option<NodeId>,
        names: Vec<NodeId>,
    },
    Attrs {
        rec: bool,
        bindings: Vec<NodeId>,
    },
    Let {
        bindings: Vec<NodeId>,
        body: NodeId,
    },
    With {
        subject: NodeId,
        body: NodeId,
    },
    /// `arg: body`, `{ formals }: body` or `arg @ { formals }: body`
    Lambda {
        arg: Option<NodeId>,
        formals: Option<NodeId>,
        body: NodeId,
    },
    Formals {
        formals: Vec<NodeId>,
        ellipsis: bool,
    },
    Formal {
        name: NodeId,
        default: Option<NodeId>,
    },
    /// `expr.path` or `expr.path or default`
    Select {
        expr: NodeId,
        path: NodeId,
        default: Option<NodeId>,
    },
    /// `expr ? path`
    HasAttr {
        expr: NodeId,
        path: NodeId,
    },
    If {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: NodeId,
    },
    Assert {
        cond: NodeId,
        body: NodeId,
    },
    List(Vec<NodeId>),
    Call {
        func: NodeId,
        args: Vec<NodeId>,
    },
    UnaryOp {
        op: UnaryOp,
        operand: NodeId,
    },
    BinaryOp {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    Paren(NodeId),
}

impl NodeKind {
    /// Direct children in source order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Null
            | NodeKind::Int(_)
            | NodeKind::Float(_)
            | NodeKind::Path(_)
            | NodeKind::Var(_)
            | NodeKind::Identifier(_) => Vec::new(),
            NodeKind::String(parts) => parts
                .iter()
                .filter_map(|part| match part {
                    StringPart::Interpolation(expr) => Some(*expr),
                    StringPart::Literal(_) => None,
                })
                .collect(),
            NodeKind::AttrName(name) => match name {
                AttrName::Ident(_) => Vec::new(),
                AttrName::String(id) | AttrName::Interpolation(id) => vec![*id],
            },
            NodeKind::AttrPath(names) => names.clone(),
            NodeKind::Binding { path, value } => vec![*path, *value],
            NodeKind::Inherit { from, names } => from.iter().chain(names).copied().collect(),
            NodeKind::Attrs { bindings, .. } => bindings.clone(),
            NodeKind::Let { bindings, body } => {
                bindings.iter().chain(std::iter::once(body)).copied().collect()
            }
            NodeKind::With { subject, body } => vec![*subject, *body],
            NodeKind::Lambda { arg, formals, body } => arg
                .iter()
                .chain(formals)
                .chain(std::iter::once(body))
                .copied()
                .collect(),
            NodeKind::Formals { formals, .. } => formals.clone(),
            NodeKind::Formal { name, default } => {
                std::iter::once(name).chain(default).copied().collect()
            }
            NodeKind::Select {
                expr,
                path,
                default,
            } => [*expr, *path].into_iter().chain(*default).collect(),
            NodeKind::HasAttr { expr, path } => vec![*expr, *path],
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => vec![*cond, *then_branch, *else_branch],
            NodeKind::Assert { cond, body } => vec![*cond, *body],
            NodeKind::List(items) => items.clone(),
            NodeKind::Call { func, args } => std::iter::once(func).chain(args).copied().collect(),
            NodeKind::UnaryOp { operand, .. } => vec![*operand],
            NodeKind::BinaryOp { lhs, rhs, .. } => vec![*lhs, *rhs],
            NodeKind::Paren(inner) => vec![*inner],
        }
    }

    /// Whether this kind stands for a value-producing expression.
    ///
    /// Names, paths, bindings and formals are structural pieces of their
    /// parent expression.
    pub fn is_expression(&self) -> bool {
        !matches!(
            self,
            NodeKind::Identifier(_)
                | NodeKind::AttrName(_)
                | NodeKind::AttrPath(_)
                | NodeKind::Binding { .. }
                | NodeKind::Inherit { .. }
                | NodeKind::Formals { .. }
                | NodeKind::Formal { .. }
        )
    }

    /// Short lowercase name used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Null => "null",
            NodeKind::Int(_) => "int",
            NodeKind::Float(_) => "float",
            NodeKind::Path(_) => "path",
            NodeKind::String(_) => "string",
            NodeKind::Var(_) => "var",
            NodeKind::Identifier(_) => "identifier",
            NodeKind::AttrName(_) => "attrname",
            NodeKind::AttrPath(_) => "attrpath",
            NodeKind::Binding { .. } => "binding",
            NodeKind::Inherit { .. } => "inherit",
            NodeKind::Attrs { .. } => "attrs",
            NodeKind::Let { .. } => "let",
            NodeKind::With { .. } => "with",
            NodeKind::Lambda { .. } => "lambda",
            NodeKind::Formals { .. } => "formals",
            NodeKind::Formal { .. } => "formal",
            NodeKind::Select { .. } => "select",
            NodeKind::HasAttr { .. } => "hasattr",
            NodeKind::If { .. } => "if",
            NodeKind::Assert { .. } => "assert",
            NodeKind::List(_) => "list",
            NodeKind::Call { .. } => "call",
            NodeKind::UnaryOp { .. } => "unaryop",
            NodeKind::BinaryOp { .. } => "binaryop",
            NodeKind::Paren(_) => "paren",
        }
    }
}
