//! Find references implementation.

use crate::base::{FileId, TextRange, TextSize};
use crate::sema::Analysis;
use crate::syntax::SyntaxTree;

use super::target::definition_at;

/// Result of a find-references request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceResult {
    /// All references found.
    pub references: Vec<Reference>,
    /// Include the definition in the results.
    pub include_declaration: bool,
}

impl ReferenceResult {
    /// Create an empty result.
    pub fn empty() -> Self {
        Self {
            references: Vec::new(),
            include_declaration: false,
        }
    }

    /// Check if any references were found.
    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    /// Get the number of references.
    pub fn len(&self) -> usize {
        self.references.len()
    }
}

/// A reference to a binding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub file: FileId,
    pub range: TextRange,
    /// Whether this is the binding itself rather than a use.
    pub is_definition: bool,
}

/// Every use of the binding at `offset`, in resolution order.
///
/// The cursor may sit on the binding or on any of its uses. Builtins have
/// uses but no declaration.
pub fn find_references(
    file: FileId,
    tree: &SyntaxTree,
    analysis: &Analysis,
    offset: TextSize,
    include_declaration: bool,
) -> ReferenceResult {
    let Some(def) = definition_at(tree, analysis, offset) else {
        return ReferenceResult::empty();
    };
    let Some(definition) = analysis.definition(def) else {
        return ReferenceResult::empty();
    };

    let mut references = Vec::with_capacity(definition.uses().len() + 1);
    if include_declaration {
        if let Some(range) = definition.syntax().and_then(|syntax| tree.range(syntax)) {
            references.push(Reference {
                file,
                range,
                is_definition: true,
            });
        }
    }
    references.extend(
        definition
            .uses()
            .iter()
            .filter_map(|node| tree.range(*node))
            .map(|range| Reference {
                file,
                range,
                is_definition: false,
            }),
    );

    ReferenceResult {
        references,
        include_declaration,
    }
}
