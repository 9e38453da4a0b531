//! Semantic analysis of Nix syntax trees.
//!
//! One call to [`analyze`] walks a [`SyntaxTree`](crate::syntax::SyntaxTree)
//! once and produces an [`Analysis`]:
//!
//! - a definition/use graph linking every binding to its references,
//! - the resolution of every variable reference (static, provided by a
//!   `with`, or unresolved),
//! - a scope tree for "what is visible here" queries,
//! - diagnostics in traversal order.
//!
//! Problems in the analysed code never fail the pass; only a tree that
//! breaks its structural contract yields a [`SemaError`].

mod analysis;
mod attrs;
mod builtins;
mod config;
mod definition;
mod diagnostics;
mod driver;
mod env;
mod error;
mod inherit;
mod scope;
mod stack;

pub use analysis::Analysis;
pub use attrs::{Attr, AttrSetAnalyzer, AttrSetScratch, AttrValue, SetOwner};
pub use builtins::{PrimOpLookup, global_names, is_builtins_constant, is_constant, lookup_primop};
pub use config::{LintOptions, SemaConfig};
pub use definition::{DefId, DefUseGraph, Definition, DefinitionSource};
pub use diagnostics::{
    Diagnostic, DiagnosticCollector, DiagnosticKind, Fix, RelatedInfo, Severity, TextEdit, codes,
};
pub use driver::{analyze, analyze_with_cancel};
pub use env::{Environment, FrameHandle, FrameKind, Lookup, PoppedFrame, Resolution};
pub use error::SemaError;
pub use inherit::{DesugaredInherit, InheritedName, desugar_inherit};
pub use scope::{Scope, ScopeId, ScopeTree};

#[cfg(feature = "json")]
pub use diagnostics::to_json;
