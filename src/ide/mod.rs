//! IDE features: High-level APIs for editor-protocol handlers.
//!
//! Each function answers one editor request from a syntax tree and its
//! [`Analysis`](crate::sema::Analysis):
//!
//! 1. **Pure functions**: take a tree, an analysis and an offset, return data
//! 2. **No LSP types**: offsets and ranges are byte based; conversion happens
//!    at the protocol boundary
//!
//! ## Usage
//!
//! The recommended way to use this module is through `AnalysisHost`:
//!
//! ```ignore
//! use nixsema::ide::AnalysisHost;
//!
//! let mut host = AnalysisHost::new();
//! let file = host.set_tree("default.nix", tree);
//! let references = host.find_references(file, offset, true)?;
//! ```

mod analysis;
mod completion;
mod error;
mod goto;
mod references;
mod rename;
mod target;

pub use analysis::AnalysisHost;
pub use completion::{CompletionItem, CompletionKind, completions};
pub use error::IdeError;
pub use goto::{GotoResult, GotoTarget, goto_definition};
pub use references::{Reference, ReferenceResult, find_references};
pub use rename::{RenameResult, is_valid_identifier, rename};
