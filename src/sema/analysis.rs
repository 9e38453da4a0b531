//! The immutable result of one Sema pass.

use rustc_hash::FxHashMap;

use crate::base::Name;
use crate::syntax::NodeId;

use super::definition::{DefId, DefUseGraph, Definition};
use super::diagnostics::{Diagnostic, Severity};
use super::env::Resolution;
use super::scope::{ScopeId, ScopeTree};

/// Definition/use graph, resolutions, scopes and diagnostics of one tree.
///
/// Nothing here refers back to the pass that produced it, so a snapshot can
/// be shared between threads and compared with the result of another pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Analysis {
    pub(crate) graph: DefUseGraph,
    pub(crate) resolutions: FxHashMap<NodeId, Resolution>,
    pub(crate) with_uses: FxHashMap<NodeId, Vec<NodeId>>,
    pub(crate) scopes: ScopeTree,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) complete: bool,
}

impl Analysis {
    pub fn graph(&self) -> &DefUseGraph {
        &self.graph
    }

    pub fn definitions(&self) -> impl Iterator<Item = (DefId, &Definition)> + '_ {
        self.graph.iter()
    }

    pub fn definition(&self, id: DefId) -> Option<&Definition> {
        self.graph.get(id)
    }

    /// The definition introduced by `node` (a binding name, formal or key).
    pub fn to_def(&self, node: NodeId) -> Option<DefId> {
        self.graph.to_def(node)
    }

    /// How the variable reference at `node` was resolved.
    pub fn resolution(&self, node: NodeId) -> Option<&Resolution> {
        self.resolutions.get(&node)
    }

    /// The definition a reference resolves to, if static.
    pub fn resolved_def(&self, node: NodeId) -> Option<DefId> {
        match self.resolutions.get(&node)? {
            Resolution::Defined(def) => Some(*def),
            Resolution::Dynamic(_) | Resolution::Unresolved => None,
        }
    }

    pub fn uses(&self, def: DefId) -> &[NodeId] {
        self.graph.get(def).map(Definition::uses).unwrap_or_default()
    }

    /// References that may be provided by the `with` expression `with`.
    pub fn with_uses(&self, with: NodeId) -> &[NodeId] {
        self.with_uses.get(&with).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|diagnostic| diagnostic.severity == Severity::Error)
            .count()
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn scope_of(&self, node: NodeId) -> Option<ScopeId> {
        self.scopes.scope_of(node)
    }

    /// Names visible where `node` was visited, innermost first.
    pub fn visible_names(&self, node: NodeId) -> Vec<(Name, DefId)> {
        self.scope_of(node)
            .map(|scope| self.scopes.visible_names(scope))
            .unwrap_or_default()
    }

    /// `false` when the pass was cancelled before visiting every node.
    pub fn is_complete(&self) -> bool {
        self.complete
    }
}
