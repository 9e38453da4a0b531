//! Definition/use graph.
//!
//! A [`Definition`] is created once, when its binding construct is visited,
//! and afterwards only grows its use list. Use-sites are variable references,
//! or the name node of an `inherit` without a source, which stands for the
//! implicit `name = name` reference.

use rustc_hash::FxHashMap;

use crate::base::Name;
use crate::syntax::NodeId;

use super::env::Environment;

/// Index of a definition in a [`DefUseGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DefId(u32);

impl DefId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which construct introduced a definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DefinitionSource {
    /// `x: body`
    LambdaArg,
    /// `x @ { ... }: body`
    LambdaAtArg,
    /// A name inside `{ ... }: body`
    Formal,
    Let,
    /// A key of a `rec` set.
    RecAttr,
    /// A key of a plain attribute set. Never visible as a variable.
    AttrKey,
    /// A name introduced by `inherit`.
    Inherited,
    Builtin,
}

impl DefinitionSource {
    pub fn is_builtin(self) -> bool {
        self == DefinitionSource::Builtin
    }
}

/// One named binding and every place that refers to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Definition {
    name: Name,
    syntax: Option<NodeId>,
    source: DefinitionSource,
    uses: Vec<NodeId>,
}

impl Definition {
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// The node that introduces the binding; `None` for builtins.
    pub fn syntax(&self) -> Option<NodeId> {
        self.syntax
    }

    pub fn source(&self) -> DefinitionSource {
        self.source
    }

    /// Use-sites in the order they were resolved.
    pub fn uses(&self) -> &[NodeId] {
        &self.uses
    }

    pub fn is_used(&self) -> bool {
        !self.uses.is_empty()
    }
}

/// All definitions of one pass plus the node → definition index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DefUseGraph {
    definitions: Vec<Definition>,
    to_def: FxHashMap<NodeId, DefId>,
}

impl DefUseGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a definition without making it visible in any frame.
    pub fn add(&mut self, name: Name, syntax: Option<NodeId>, source: DefinitionSource) -> DefId {
        let id = DefId::new(self.definitions.len() as u32);
        if let Some(node) = syntax {
            self.to_def.entry(node).or_insert(id);
        }
        self.definitions.push(Definition {
            name,
            syntax,
            source,
            uses: Vec::new(),
        });
        id
    }

    /// Create a definition and register it in the innermost frame of `env`.
    ///
    /// If the frame already binds `name`, nothing is created and the existing
    /// definition is returned as the error.
    pub fn declare(
        &mut self,
        env: &mut Environment,
        name: Name,
        syntax: Option<NodeId>,
        source: DefinitionSource,
    ) -> Result<DefId, DefId> {
        if let Some(existing) = env.lookup_local(&name) {
            return Err(existing);
        }
        let id = self.add(name.clone(), syntax, source);
        env.define(name, id)?;
        Ok(id)
    }

    /// Append a use-site to `def`.
    pub fn record_use(&mut self, def: DefId, node: NodeId) {
        if let Some(definition) = self.definitions.get_mut(def.index()) {
            definition.uses.push(node);
        }
    }

    /// Map another node (a repeated path key, say) to an existing definition.
    pub fn alias(&mut self, node: NodeId, def: DefId) {
        self.to_def.entry(node).or_insert(def);
    }

    pub fn get(&self, id: DefId) -> Option<&Definition> {
        self.definitions.get(id.index())
    }

    /// The definition introduced by `node`, if any.
    pub fn to_def(&self, node: NodeId) -> Option<DefId> {
        self.to_def.get(&node).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DefId, &Definition)> + '_ {
        self.definitions
            .iter()
            .enumerate()
            .map(|(index, def)| (DefId::new(index as u32), def))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
