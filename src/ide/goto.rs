//! Go-to-definition implementation.

use std::sync::Arc;

use crate::base::{FileId, TextRange, TextSize};
use crate::sema::{Analysis, DefinitionSource, Resolution};
use crate::syntax::{NodeKind, SyntaxTree};

use super::target::node_at;

/// Result of a go-to-definition request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GotoResult {
    /// The targets to jump to.
    pub targets: Vec<GotoTarget>,
}

impl GotoResult {
    /// Create an empty result (no targets found).
    pub fn empty() -> Self {
        Self {
            targets: Vec::new(),
        }
    }

    /// Create a result with a single target.
    pub fn single(target: GotoTarget) -> Self {
        Self {
            targets: vec![target],
        }
    }

    /// Check if any targets were found.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// A target location for go-to-definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GotoTarget {
    pub file: FileId,
    pub range: TextRange,
    pub name: Arc<str>,
    /// `None` when the target is the subject of a `with` that may provide
    /// the name at run time.
    pub source: Option<DefinitionSource>,
}

/// Find where the name at `offset` is bound.
///
/// A statically bound reference jumps to its binding. A name that only a
/// `with` can provide jumps to the subjects of every enclosing `with`,
/// innermost first. Builtins have no location.
pub fn goto_definition(
    file: FileId,
    tree: &SyntaxTree,
    analysis: &Analysis,
    offset: TextSize,
) -> GotoResult {
    let Some(node) = node_at(tree, offset) else {
        return GotoResult::empty();
    };

    let def = match analysis.resolution(node) {
        Some(Resolution::Defined(def)) => Some(*def),
        Some(Resolution::Dynamic(withs)) => {
            let name = node_name(tree, node);
            let targets = withs
                .iter()
                .filter_map(|with| match tree.kind(*with) {
                    Some(NodeKind::With { subject, .. }) => tree.range(*subject),
                    _ => None,
                })
                .map(|range| GotoTarget {
                    file,
                    range,
                    name: name.clone(),
                    source: None,
                })
                .collect();
            return GotoResult { targets };
        }
        Some(Resolution::Unresolved) => return GotoResult::empty(),
        None => analysis.to_def(node),
    };

    let Some(definition) = def.and_then(|def| analysis.definition(def)) else {
        return GotoResult::empty();
    };
    match definition.syntax().and_then(|syntax| tree.range(syntax)) {
        Some(range) => GotoResult::single(GotoTarget {
            file,
            range,
            name: Arc::from(definition.name().as_str()),
            source: Some(definition.source()),
        }),
        None => GotoResult::empty(),
    }
}

fn node_name(tree: &SyntaxTree, node: crate::syntax::NodeId) -> Arc<str> {
    match tree.kind(node) {
        Some(NodeKind::Var(name)) => Arc::from(name.as_str()),
        _ => tree
            .static_attr_name(node)
            .map(|name| Arc::from(name.as_str()))
            .unwrap_or_else(|| Arc::from("")),
    }
}
