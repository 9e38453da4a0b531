//! # nixsema
//!
//! Semantic analysis for the Nix expression language: name resolution,
//! definition/use tracking and diagnostics over a parsed syntax tree.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide       → goto-definition, references, rename, completion, AnalysisHost
//!   ↓
//! sema      → Environment, definition/use graph, attribute sets, driver
//!   ↓
//! bytecode  → Versioned encode/decode of syntax trees
//!   ↓
//! syntax    → Arena syntax tree, TreeBuilder, ParentMap
//!   ↓
//! base      → Primitives (FileId, Name, TextRange, LineIndex)
//! ```

// ============================================================================
// MODULES (dependency order: base → syntax → bytecode → sema → ide)
// ============================================================================

/// Foundation types: FileId, Name, TextRange
pub mod base;

/// Syntax: arena tree produced by the parser
pub mod syntax;

/// Byte encoding of syntax trees
pub mod bytecode;

/// Semantic analysis: scopes, definitions, uses, diagnostics
pub mod sema;

/// IDE features: goto-definition, find-references, rename, completion
pub mod ide;

// Re-export foundation types
pub use base::{FileId, LineCol, LineIndex, Name, Position, Span, TextRange, TextSize};

// Re-export the analysis entry points
pub use sema::{Analysis, Diagnostic, DiagnosticKind, SemaConfig, SemaError, Severity, analyze};
pub use syntax::{NodeId, NodeKind, SyntaxTree, TreeBuilder};
