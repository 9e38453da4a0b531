//! Syntax tree: the analyzer's read-only input.
//!
//! Parsing source text is not part of this crate. A parser (or a test)
//! produces a [`SyntaxTree`] through [`TreeBuilder`]; the bytecode module can
//! also rebuild one from bytes.

mod builder;
mod node;
mod parent_map;
mod tree;

pub use builder::TreeBuilder;
pub use node::{AttrName, BinaryOp, Node, NodeId, NodeKind, StringPart, UnaryOp};
pub use parent_map::ParentMap;
pub use tree::SyntaxTree;
