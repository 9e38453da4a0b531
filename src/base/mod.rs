//! Foundation types for nixsema.
//!
//! This module provides fundamental types used throughout the analyzer:
//! - [`FileId`] - Document identifiers handed out by the host
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`Position`], [`Span`] - Line/column ranges for editor-facing output
//! - [`Name`] - Identifier strings
//!
//! This module has NO dependencies on other nixsema modules.

mod file_id;
mod position;
mod span;

pub use file_id::FileId;
pub use position::{Position, Span};
pub use span::{LineCol, LineIndex, TextRange, TextSize};

/// An identifier as it appears in source (variable, attribute or formal name).
///
/// Names are short and cloned often, so they are stored inline when possible.
pub type Name = smol_str::SmolStr;

// Re-export text-size types for convenience
pub use text_size;
