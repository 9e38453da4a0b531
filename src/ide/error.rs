//! Errors of the IDE layer.

use thiserror::Error;

use crate::base::{FileId, TextSize};
use crate::bytecode::DecodeError;
use crate::sema::SemaError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdeError {
    #[error("unknown file {0}")]
    UnknownFile(FileId),

    /// The cursor is not on a binding or a reference to one.
    #[error("nothing to rename at offset {0:?}")]
    NothingToRename(TextSize),

    #[error("`{name}` cannot be renamed: {reason}")]
    NotRenameable { name: String, reason: &'static str },

    #[error("`{0}` is not a valid identifier")]
    InvalidName(String),

    #[error("analysis failed: {0}")]
    Sema(#[from] SemaError),

    #[error("cannot decode tree: {0}")]
    Decode(#[from] DecodeError),
}

impl IdeError {
    pub fn not_renameable(name: impl Into<String>, reason: &'static str) -> Self {
        Self::NotRenameable {
            name: name.into(),
            reason,
        }
    }
}
