//! Stable byte tags for node kinds and operators.
//!
//! Values are part of the on-disk format: never renumber, only append.

use crate::syntax::{BinaryOp, NodeKind, UnaryOp};

pub const NULL: u8 = 0;
pub const INT: u8 = 1;
pub const FLOAT: u8 = 2;
pub const PATH: u8 = 3;
pub const STRING: u8 = 4;
pub const VAR: u8 = 5;
pub const IDENTIFIER: u8 = 6;
pub const ATTR_NAME: u8 = 7;
pub const ATTR_PATH: u8 = 8;
pub const BINDING: u8 = 9;
pub const INHERIT: u8 = 10;
pub const ATTRS: u8 = 11;
pub const LET: u8 = 12;
pub const WITH: u8 = 13;
pub const LAMBDA: u8 = 14;
pub const FORMALS: u8 = 15;
pub const FORMAL: u8 = 16;
pub const SELECT: u8 = 17;
pub const HAS_ATTR: u8 = 18;
pub const IF: u8 = 19;
pub const ASSERT: u8 = 20;
pub const LIST: u8 = 21;
pub const CALL: u8 = 22;
pub const UNARY_OP: u8 = 23;
pub const BINARY_OP: u8 = 24;
pub const PAREN: u8 = 25;

/// Sub-tags of string parts.
pub mod part {
    pub const LITERAL: u8 = 0;
    pub const INTERPOLATION: u8 = 1;
}

/// Sub-tags of attribute names.
pub mod attr_name {
    pub const IDENT: u8 = 0;
    pub const STRING: u8 = 1;
    pub const INTERPOLATION: u8 = 2;
}

pub fn of(kind: &NodeKind) -> u8 {
    match kind {
        NodeKind::Null => NULL,
        NodeKind::Int(_) => INT,
        NodeKind::Float(_) => FLOAT,
        NodeKind::Path(_) => PATH,
        NodeKind::String(_) => STRING,
        NodeKind::Var(_) => VAR,
        NodeKind::Identifier(_) => IDENTIFIER,
        NodeKind::AttrName(_) => ATTR_NAME,
        NodeKind::AttrPath(_) => ATTR_PATH,
        NodeKind::Binding { .. } => BINDING,
        NodeKind::Inherit { .. } => INHERIT,
        NodeKind::Attrs { .. } => ATTRS,
        NodeKind::Let { .. } => LET,
        NodeKind::With { .. } => WITH,
        NodeKind::Lambda { .. } => LAMBDA,
        NodeKind::Formals { .. } => FORMALS,
        NodeKind::Formal { .. } => FORMAL,
        NodeKind::Select { .. } => SELECT,
        NodeKind::HasAttr { .. } => HAS_ATTR,
        NodeKind::If { .. } => IF,
        NodeKind::Assert { .. } => ASSERT,
        NodeKind::List(_) => LIST,
        NodeKind::Call { .. } => CALL,
        NodeKind::UnaryOp { .. } => UNARY_OP,
        NodeKind::BinaryOp { .. } => BINARY_OP,
        NodeKind::Paren(_) => PAREN,
    }
}

pub fn unary_op(op: UnaryOp) -> u8 {
    match op {
        UnaryOp::Not => 0,
        UnaryOp::Negate => 1,
    }
}

pub fn decode_unary_op(byte: u8) -> Option<UnaryOp> {
    match byte {
        0 => Some(UnaryOp::Not),
        1 => Some(UnaryOp::Negate),
        _ => None,
    }
}

const BINARY_OPS: [BinaryOp; 15] = [
    BinaryOp::Eq,
    BinaryOp::NotEq,
    BinaryOp::Less,
    BinaryOp::LessEq,
    BinaryOp::Greater,
    BinaryOp::GreaterEq,
    BinaryOp::And,
    BinaryOp::Or,
    BinaryOp::Implication,
    BinaryOp::Update,
    BinaryOp::Concat,
    BinaryOp::Add,
    BinaryOp::Sub,
    BinaryOp::Mul,
    BinaryOp::Div,
];

pub fn binary_op(op: BinaryOp) -> u8 {
    BINARY_OPS
        .iter()
        .position(|candidate| *candidate == op)
        .map_or(u8::MAX, |index| index as u8)
}

pub fn decode_binary_op(byte: u8) -> Option<BinaryOp> {
    BINARY_OPS.get(byte as usize).copied()
}
