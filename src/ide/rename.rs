//! Rename implementation.

use crate::base::{FileId, TextSize};
use crate::sema::{Analysis, DefinitionSource, TextEdit};
use crate::syntax::{NodeKind, SyntaxTree};

use super::error::IdeError;
use super::target::definition_at;

const KEYWORDS: &[&str] = &[
    "assert", "else", "if", "in", "inherit", "let", "or", "rec", "then", "with",
];

/// Edits that rename one binding and all of its uses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameResult {
    pub file: FileId,
    /// Sorted by position.
    pub edits: Vec<TextEdit>,
}

/// Rename the binding at `offset` to `new_name`.
///
/// Builtins cannot be renamed, and neither can names that an `inherit`
/// ties to an attribute: changing one side would change the other.
pub fn rename(
    file: FileId,
    tree: &SyntaxTree,
    analysis: &Analysis,
    offset: TextSize,
    new_name: &str,
) -> Result<RenameResult, IdeError> {
    if !is_valid_identifier(new_name) {
        return Err(IdeError::InvalidName(new_name.to_string()));
    }
    let definition = definition_at(tree, analysis, offset)
        .and_then(|def| analysis.definition(def))
        .ok_or(IdeError::NothingToRename(offset))?;

    match definition.source() {
        DefinitionSource::Builtin => {
            return Err(IdeError::not_renameable(definition.name().as_str(), "it is a builtin"));
        }
        DefinitionSource::Inherited => {
            return Err(IdeError::not_renameable(
                definition.name().as_str(),
                "it is introduced by `inherit`",
            ));
        }
        _ => {}
    }
    let inherited_use = definition
        .uses()
        .iter()
        .any(|node| matches!(tree.kind(*node), Some(NodeKind::AttrName(_))));
    if inherited_use {
        return Err(IdeError::not_renameable(
            definition.name().as_str(),
            "it is used by `inherit`",
        ));
    }

    let mut edits: Vec<TextEdit> = definition
        .syntax()
        .into_iter()
        .chain(definition.uses().iter().copied())
        .filter_map(|node| tree.range(node))
        .map(|range| TextEdit {
            range,
            new_text: new_name.into(),
        })
        .collect();
    edits.sort_by_key(|edit| edit.range.start());
    edits.dedup_by_key(|edit| edit.range);

    tracing::debug!(
        "[IDE] rename `{}` -> `{}`: {} edits",
        definition.name(),
        new_name,
        edits.len()
    );
    Ok(RenameResult { file, edits })
}

/// `[A-Za-z_][A-Za-z0-9_'-]*`, excluding keywords.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '\'' | '-'))
        && !KEYWORDS.contains(&name)
}
