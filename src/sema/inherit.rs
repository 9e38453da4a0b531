//! Inherit desugaring.
//!
//! `inherit a b;` behaves like `a = a; b = b;` with the right-hand sides
//! looked up outside the set being built, and `inherit (e) a;` like
//! `a = e.a;`. Nothing is rewritten in the tree: each name becomes a
//! binding that feeds the attribute-set analyzer, and the source expression
//! is analysed once per clause.

use crate::base::Name;
use crate::syntax::{AttrName, NodeId, NodeKind, SyntaxTree};

use super::config::LintOptions;
use super::diagnostics::DiagnosticCollector;
use super::error::{SemaError, child_node};

/// One name introduced by an `inherit` clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InheritedName {
    /// The name node. For the plain form it also acts as the variable
    /// reference of the implicit `name = name`.
    pub key: NodeId,
    pub name: Name,
}

/// An `inherit` clause reduced to its bindings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DesugaredInherit {
    pub node: NodeId,
    pub from: Option<NodeId>,
    pub names: Vec<InheritedName>,
    /// Expressions inside rejected dynamic names, still to be analysed.
    pub rejected: Vec<NodeId>,
}

impl DesugaredInherit {
    /// `inherit (builtins) ...;`
    pub fn is_from_builtins(&self, tree: &SyntaxTree) -> bool {
        self.from
            .and_then(|from| tree.kind(from))
            .is_some_and(|kind| matches!(kind, NodeKind::Var(name) if name == "builtins"))
    }
}

/// Reduce the `inherit` clause at `node` to its bindings.
///
/// Interpolated names are rejected with a diagnostic. An empty clause is
/// reported when the lint is enabled.
pub fn desugar_inherit(
    tree: &SyntaxTree,
    node: NodeId,
    lints: &LintOptions,
    diags: &mut DiagnosticCollector,
) -> Result<DesugaredInherit, SemaError> {
    let inherit = tree.get(node).ok_or(SemaError::UnknownNode(node))?;
    let NodeKind::Inherit { from, names } = &inherit.kind else {
        return Err(SemaError::unexpected(node, "inherit", inherit.kind.name()));
    };
    if let Some(from) = from {
        child_node(tree, node, *from)?;
    }

    let mut desugared = DesugaredInherit {
        node,
        from: *from,
        names: Vec::with_capacity(names.len()),
        rejected: Vec::new(),
    };
    for &key in names {
        let name_node = child_node(tree, node, key)?;
        match &name_node.kind {
            NodeKind::Null => {}
            NodeKind::AttrName(attr) => match tree.static_attr_name(key) {
                Some(name) => desugared.names.push(InheritedName { key, name }),
                None => {
                    diags.dynamic_inherit(name_node.range);
                    match attr {
                        AttrName::String(inner) | AttrName::Interpolation(inner) => {
                            child_node(tree, key, *inner)?;
                            desugared.rejected.push(*inner);
                        }
                        AttrName::Ident(_) => {}
                    }
                }
            },
            other => return Err(SemaError::unexpected(key, "attrname", other.name())),
        }
    }

    if names.is_empty() && lints.empty_inherit {
        diags.empty_inherit(inherit.range);
    }
    Ok(desugared)
}
