//! Scope tree: the frames of a finished pass, kept for queries.
//!
//! The [`Environment`](super::env::Environment) forgets a frame as soon as
//! its subtree is done. Tooling still wants to know which names are visible
//! at a node, so every frame leaves a [`Scope`] record behind.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::Name;
use crate::syntax::NodeId;

use super::definition::DefId;
use super::env::FrameKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One frame's record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scope {
    pub kind: FrameKind,
    pub syntax: Option<NodeId>,
    pub parent: Option<ScopeId>,
    pub names: IndexMap<Name, DefId>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    /// The innermost scope active while each expression was visited.
    node_scopes: FxHashMap<NodeId, ScopeId>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, kind: FrameKind, syntax: Option<NodeId>, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId::new(self.scopes.len() as u32);
        self.scopes.push(Scope {
            kind,
            syntax,
            parent,
            names: IndexMap::new(),
        });
        id
    }

    pub fn bind(&mut self, scope: ScopeId, name: Name, def: DefId) {
        if let Some(scope) = self.scopes.get_mut(scope.index()) {
            scope.names.entry(name).or_insert(def);
        }
    }

    pub fn record_node(&mut self, node: NodeId, scope: ScopeId) {
        self.node_scopes.insert(node, scope);
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn scope_of(&self, node: NodeId) -> Option<ScopeId> {
        self.node_scopes.get(&node).copied()
    }

    /// `id` followed by its enclosing scopes.
    pub fn ancestors(&self, id: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(id), move |current| {
            self.get(*current).and_then(|scope| scope.parent)
        })
    }

    /// Names visible in `id`, innermost first, shadowed names omitted.
    pub fn visible_names(&self, id: ScopeId) -> Vec<(Name, DefId)> {
        let mut seen = FxHashSet::default();
        let mut names = Vec::new();
        for scope in self.ancestors(id).filter_map(|scope| self.get(scope)) {
            for (name, def) in &scope.names {
                if seen.insert(name.clone()) {
                    names.push((name.clone(), *def));
                }
            }
        }
        names
    }

    /// Whether `id` sits inside a `with` body.
    pub fn has_dynamic_ancestor(&self, id: ScopeId) -> bool {
        self.ancestors(id)
            .filter_map(|scope| self.get(scope))
            .any(|scope| scope.kind.is_dynamic())
    }
}
