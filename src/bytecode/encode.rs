//! Tree → bytes.

use crate::syntax::{AttrName, NodeId, NodeKind, StringPart, SyntaxTree};

use super::tag;
use super::{MAGIC, NONE, VERSION};

/// Encode `tree` into the versioned byte format.
///
/// Encoding never fails; whether the tree is well formed is checked when
/// it is decoded or analysed.
pub fn encode(tree: &SyntaxTree) -> Vec<u8> {
    let mut writer = Writer::with_capacity(16 + tree.len() * 16);
    writer.bytes(&MAGIC);
    writer.u16(VERSION);
    writer.u32(tree.len() as u32);
    writer.id(tree.root());

    for (_, node) in tree.iter() {
        writer.u8(tag::of(&node.kind));
        writer.u32(node.range.start().into());
        writer.u32(node.range.end().into());
        writer.payload(&node.kind);
    }
    writer.finish()
}

struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    fn finish(self) -> Vec<u8> {
        self.buf
    }

    fn bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    fn u16(&mut self, value: u16) {
        self.bytes(&value.to_le_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.bytes(&value.to_le_bytes());
    }

    fn bool(&mut self, value: bool) {
        self.u8(u8::from(value));
    }

    fn str(&mut self, value: &str) {
        self.u32(value.len() as u32);
        self.bytes(value.as_bytes());
    }

    fn id(&mut self, id: NodeId) {
        self.u32(id.raw());
    }

    fn opt_id(&mut self, id: Option<NodeId>) {
        self.u32(id.map_or(NONE, NodeId::raw));
    }

    fn ids(&mut self, ids: &[NodeId]) {
        self.u32(ids.len() as u32);
        for &id in ids {
            self.id(id);
        }
    }

    fn payload(&mut self, kind: &NodeKind) {
        match kind {
            NodeKind::Null => {}
            NodeKind::Int(value) => self.bytes(&value.to_le_bytes()),
            NodeKind::Float(value) => self.bytes(&value.to_bits().to_le_bytes()),
            NodeKind::Path(text) | NodeKind::Var(text) | NodeKind::Identifier(text) => self.str(text),
            NodeKind::String(parts) => {
                self.u32(parts.len() as u32);
                for part in parts {
                    match part {
                        StringPart::Literal(text) => {
                            self.u8(tag::part::LITERAL);
                            self.str(text);
                        }
                        StringPart::Interpolation(expr) => {
                            self.u8(tag::part::INTERPOLATION);
                            self.id(*expr);
                        }
                    }
                }
            }
            NodeKind::AttrName(name) => match name {
                AttrName::Ident(text) => {
                    self.u8(tag::attr_name::IDENT);
                    self.str(text);
                }
                AttrName::String(string) => {
                    self.u8(tag::attr_name::STRING);
                    self.id(*string);
                }
                AttrName::Interpolation(expr) => {
                    self.u8(tag::attr_name::INTERPOLATION);
                    self.id(*expr);
                }
            },
            NodeKind::AttrPath(names) => self.ids(names),
            NodeKind::Binding { path, value } => {
                self.id(*path);
                self.id(*value);
            }
            NodeKind::Inherit { from, names } => {
                self.opt_id(*from);
                self.ids(names);
            }
            NodeKind::Attrs { rec, bindings } => {
                self.bool(*rec);
                self.ids(bindings);
            }
            NodeKind::Let { bindings, body } => {
                self.ids(bindings);
                self.id(*body);
            }
            NodeKind::With { subject, body } => {
                self.id(*subject);
                self.id(*body);
            }
            NodeKind::Lambda { arg, formals, body } => {
                self.opt_id(*arg);
                self.opt_id(*formals);
                self.id(*body);
            }
            NodeKind::Formals { formals, ellipsis } => {
                self.ids(formals);
                self.bool(*ellipsis);
            }
            NodeKind::Formal { name, default } => {
                self.id(*name);
                self.opt_id(*default);
            }
            NodeKind::Select {
                expr,
                path,
                default,
            } => {
                self.id(*expr);
                self.id(*path);
                self.opt_id(*default);
            }
            NodeKind::HasAttr { expr, path } => {
                self.id(*expr);
                self.id(*path);
            }
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.id(*cond);
                self.id(*then_branch);
                self.id(*else_branch);
            }
            NodeKind::Assert { cond, body } => {
                self.id(*cond);
                self.id(*body);
            }
            NodeKind::List(items) => self.ids(items),
            NodeKind::Call { func, args } => {
                self.id(*func);
                self.ids(args);
            }
            NodeKind::UnaryOp { op, operand } => {
                self.u8(tag::unary_op(*op));
                self.id(*operand);
            }
            NodeKind::BinaryOp { op, lhs, rhs } => {
                self.u8(tag::binary_op(*op));
                self.id(*lhs);
                self.id(*rhs);
            }
            NodeKind::Paren(inner) => self.id(*inner),
        }
    }
}
