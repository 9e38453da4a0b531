//! Error types for tree decoding.

use thiserror::Error;

/// Errors raised while decoding a tree from bytes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer does not start with the format magic.
    #[error("bad magic: expected NXSB, found {found:?}")]
    BadMagic { found: Vec<u8> },

    #[error("unsupported format version {found} (supported: {supported})")]
    UnsupportedVersion { found: u16, supported: u16 },

    /// The buffer ended in the middle of a value.
    #[error("unexpected end of input at byte {offset} while reading {what}")]
    UnexpectedEof { offset: usize, what: &'static str },

    #[error("unknown {what} tag {tag} at byte {offset}")]
    UnknownTag {
        what: &'static str,
        tag: u8,
        offset: usize,
    },

    #[error("invalid UTF-8 in string at byte {offset}")]
    InvalidUtf8 { offset: usize },

    /// A child id that does not precede its parent.
    #[error("node {node} refers to child {child} that does not precede it")]
    DanglingChild { node: u32, child: u32 },

    /// A child already referenced by an earlier parent.
    #[error("node {node} refers to child {child} that already has a parent")]
    SharedChild { node: u32, child: u32 },

    /// The root id names no node.
    #[error("root {root} is outside the tree ({count} nodes)")]
    RootOutOfRange { root: u32, count: u32 },

    #[error("node {node} has inverted range {start}..{end}")]
    InvalidRange { node: u32, start: u32, end: u32 },

    /// Bytes remain after the last node.
    #[error("{0} trailing bytes after the last node")]
    TrailingBytes(usize),
}

impl DecodeError {
    pub(crate) fn eof(offset: usize, what: &'static str) -> Self {
        Self::UnexpectedEof { offset, what }
    }

    pub(crate) fn unknown_tag(what: &'static str, tag: u8, offset: usize) -> Self {
        Self::UnknownTag { what, tag, offset }
    }
}
