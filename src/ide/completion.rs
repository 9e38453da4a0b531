//! Completion suggestions implementation.

use std::sync::Arc;

use crate::base::TextSize;
use crate::sema::{Analysis, Definition, DefinitionSource, ScopeId};
use crate::syntax::{NodeKind, ParentMap, SyntaxTree};

use super::target::node_at;

/// Kind of completion item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionKind {
    /// `let` binding or inherited name.
    Variable,
    /// Lambda argument or formal.
    Parameter,
    /// Key of an enclosing `rec` set.
    Field,
    Builtin,
}

impl CompletionKind {
    /// Convert to LSP completion item kind number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            CompletionKind::Variable => 6,  // Variable
            CompletionKind::Parameter => 6, // Variable
            CompletionKind::Field => 5,     // Field
            CompletionKind::Builtin => 3,   // Function
        }
    }

    fn of(source: DefinitionSource) -> Self {
        match source {
            DefinitionSource::LambdaArg | DefinitionSource::LambdaAtArg | DefinitionSource::Formal => {
                CompletionKind::Parameter
            }
            DefinitionSource::RecAttr | DefinitionSource::AttrKey => CompletionKind::Field,
            DefinitionSource::Builtin => CompletionKind::Builtin,
            DefinitionSource::Let | DefinitionSource::Inherited => CompletionKind::Variable,
        }
    }
}

/// A completion suggestion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionItem {
    /// The text to insert.
    pub label: Arc<str>,
    /// The kind of completion.
    pub kind: CompletionKind,
    /// Detail text (shown after label).
    pub detail: Option<Arc<str>>,
    /// Sort priority (lower = higher priority).
    pub sort_priority: u32,
}

impl CompletionItem {
    /// Create a new completion item.
    pub fn new(label: impl Into<Arc<str>>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            sort_priority: 100,
        }
    }

    /// Set the detail text.
    pub fn with_detail(mut self, detail: impl Into<Arc<str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Set the sort priority.
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.sort_priority = priority;
        self
    }

    fn from_definition(definition: &Definition, rank: usize) -> Self {
        let kind = CompletionKind::of(definition.source());
        let priority = match kind {
            CompletionKind::Builtin => 1000,
            _ => rank as u32,
        };
        Self::new(definition.name().as_str(), kind)
            .with_detail(describe(definition.source()))
            .with_priority(priority)
    }
}

fn describe(source: DefinitionSource) -> &'static str {
    match source {
        DefinitionSource::LambdaArg => "lambda argument",
        DefinitionSource::LambdaAtArg => "lambda argument (@)",
        DefinitionSource::Formal => "formal",
        DefinitionSource::Let => "let binding",
        DefinitionSource::RecAttr => "rec attribute",
        DefinitionSource::AttrKey => "attribute",
        DefinitionSource::Inherited => "inherited",
        DefinitionSource::Builtin => "builtin",
    }
}

/// Names visible at `offset`, innermost first.
///
/// When the cursor is on a variable, only names starting with what has been
/// typed so far are offered.
pub fn completions(tree: &SyntaxTree, analysis: &Analysis, offset: TextSize) -> Vec<CompletionItem> {
    let node = node_at(tree, offset);
    let scope = node
        .and_then(|node| {
            let parents = ParentMap::new(tree);
            std::iter::once(node)
                .chain(parents.ancestors(node))
                .find_map(|id| analysis.scope_of(id))
        })
        .or_else(|| (!analysis.scopes().is_empty()).then(|| ScopeId::new(0)));
    let Some(scope) = scope else {
        return Vec::new();
    };

    let prefix = match node.and_then(|node| tree.kind(node)) {
        Some(NodeKind::Var(name)) => name.as_str(),
        _ => "",
    };

    analysis
        .scopes()
        .visible_names(scope)
        .into_iter()
        .enumerate()
        .filter(|(_, (name, _))| name.starts_with(prefix))
        .filter_map(|(rank, (_, def))| {
            analysis
                .definition(def)
                .map(|definition| CompletionItem::from_definition(definition, rank))
        })
        .collect()
}
