//! Diagnostics: findings about the analysed code.
//!
//! Every finding carries a byte range into the analysed tree, a stable code
//! and short name, and optional related notes and fixes. The collector is
//! append-only: diagnostics come out in the order the traversal produced them.

use std::sync::Arc;

use crate::base::{LineIndex, Span, TextRange};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// What a diagnostic is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    UndefinedVariable,
    PrimOpNeedsPrefix,
    DuplicateAttr,
    DuplicateBinding,
    DuplicateFormal,
    DuplicateFormalArg,
    DynamicInherit,
    LetDynamic,
    MergeDiffRec,
    EmptyInherit,
    ExtraRec,
    ExtraWith,
    PrimOpOverridden,
    ConstantOverridden,
    DynamicKeyCollision,
    UnusedDefinition,
    EscapingWith,
    PrimOpUnknown,
    PrimOpRemovablePrefix,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::UndefinedVariable
            | DiagnosticKind::PrimOpNeedsPrefix
            | DiagnosticKind::DuplicateAttr
            | DiagnosticKind::DuplicateBinding
            | DiagnosticKind::DuplicateFormal
            | DiagnosticKind::DuplicateFormalArg
            | DiagnosticKind::DynamicInherit
            | DiagnosticKind::LetDynamic => Severity::Error,
            DiagnosticKind::MergeDiffRec
            | DiagnosticKind::EmptyInherit
            | DiagnosticKind::ExtraRec
            | DiagnosticKind::ExtraWith
            | DiagnosticKind::PrimOpOverridden
            | DiagnosticKind::ConstantOverridden
            | DiagnosticKind::PrimOpUnknown => Severity::Warning,
            DiagnosticKind::DynamicKeyCollision
            | DiagnosticKind::UnusedDefinition
            | DiagnosticKind::EscapingWith
            | DiagnosticKind::PrimOpRemovablePrefix => Severity::Hint,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::UndefinedVariable => codes::UNDEFINED_VARIABLE,
            DiagnosticKind::PrimOpNeedsPrefix => codes::PRIMOP_NEEDS_PREFIX,
            DiagnosticKind::DuplicateAttr => codes::DUPLICATE_ATTR,
            DiagnosticKind::DuplicateBinding => codes::DUPLICATE_BINDING,
            DiagnosticKind::DuplicateFormal => codes::DUPLICATE_FORMAL,
            DiagnosticKind::DuplicateFormalArg => codes::DUPLICATE_FORMAL_ARG,
            DiagnosticKind::DynamicInherit => codes::DYNAMIC_INHERIT,
            DiagnosticKind::LetDynamic => codes::LET_DYNAMIC,
            DiagnosticKind::MergeDiffRec => codes::MERGE_DIFF_REC,
            DiagnosticKind::EmptyInherit => codes::EMPTY_INHERIT,
            DiagnosticKind::ExtraRec => codes::EXTRA_REC,
            DiagnosticKind::ExtraWith => codes::EXTRA_WITH,
            DiagnosticKind::PrimOpOverridden => codes::PRIMOP_OVERRIDDEN,
            DiagnosticKind::ConstantOverridden => codes::CONSTANT_OVERRIDDEN,
            DiagnosticKind::DynamicKeyCollision => codes::DYNAMIC_KEY_COLLISION,
            DiagnosticKind::UnusedDefinition => codes::UNUSED_DEFINITION,
            DiagnosticKind::EscapingWith => codes::ESCAPING_WITH,
            DiagnosticKind::PrimOpUnknown => codes::PRIMOP_UNKNOWN,
            DiagnosticKind::PrimOpRemovablePrefix => codes::PRIMOP_REMOVABLE_PREFIX,
        }
    }

    /// Stable short name, e.g. `sema-undefined-variable`.
    pub fn sname(self) -> &'static str {
        match self {
            DiagnosticKind::UndefinedVariable => "sema-undefined-variable",
            DiagnosticKind::PrimOpNeedsPrefix => "sema-primop-needs-prefix",
            DiagnosticKind::DuplicateAttr => "sema-duplicated-attrname",
            DiagnosticKind::DuplicateBinding => "sema-duplicated-binding",
            DiagnosticKind::DuplicateFormal => "sema-dup-formal",
            DiagnosticKind::DuplicateFormalArg => "sema-dup-formal-arg",
            DiagnosticKind::DynamicInherit => "sema-dynamic-inherit",
            DiagnosticKind::LetDynamic => "let-dynamic",
            DiagnosticKind::MergeDiffRec => "merge-diff-rec",
            DiagnosticKind::EmptyInherit => "empty-inherit",
            DiagnosticKind::ExtraRec => "sema-extra-rec",
            DiagnosticKind::ExtraWith => "sema-extra-with",
            DiagnosticKind::PrimOpOverridden => "sema-primop-overridden",
            DiagnosticKind::ConstantOverridden => "sema-constant-overridden",
            DiagnosticKind::DynamicKeyCollision => "sema-dynamic-key-collision",
            DiagnosticKind::UnusedDefinition => "sema-def-not-used",
            DiagnosticKind::EscapingWith => "sema-escaping-with",
            DiagnosticKind::PrimOpUnknown => "sema-primop-unknown",
            DiagnosticKind::PrimOpRemovablePrefix => "sema-primop-removable-prefix",
        }
    }
}

/// A secondary location attached to a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct RelatedInfo {
    pub range: TextRange,
    pub message: Arc<str>,
}

/// Replace `range` with `new_text`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct TextEdit {
    pub range: TextRange,
    pub new_text: Arc<str>,
}

impl TextEdit {
    pub fn insertion(at: crate::base::TextSize, text: impl Into<Arc<str>>) -> Self {
        Self {
            range: TextRange::empty(at),
            new_text: text.into(),
        }
    }

    pub fn removal(range: TextRange) -> Self {
        Self {
            range,
            new_text: Arc::from(""),
        }
    }
}

/// A suggested source change that resolves a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct Fix {
    pub message: Arc<str>,
    pub edits: Vec<TextEdit>,
}

/// A diagnostic anchored in the analysed tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: Severity,
    pub range: TextRange,
    pub message: Arc<str>,
    pub related: Vec<RelatedInfo>,
    pub fixes: Vec<Fix>,
}

impl Diagnostic {
    /// Create a diagnostic with the default severity of `kind`.
    pub fn new(kind: DiagnosticKind, range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self {
            kind,
            severity: kind.severity(),
            range,
            message: message.into(),
            related: Vec::new(),
            fixes: Vec::new(),
        }
    }

    /// Add related information.
    pub fn with_related(mut self, range: TextRange, message: impl Into<Arc<str>>) -> Self {
        self.related.push(RelatedInfo {
            range,
            message: message.into(),
        });
        self
    }

    /// Attach a fix.
    pub fn with_fix(mut self, message: impl Into<Arc<str>>, edits: Vec<TextEdit>) -> Self {
        self.fixes.push(Fix {
            message: message.into(),
            edits,
        });
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Line/column span of the primary range in the text `index` was built from.
    pub fn span(&self, index: &LineIndex) -> Span {
        index.span(self.range)
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Stable diagnostic codes.
///
/// ## Code Ranges
///
/// - **E0101-E0199**: Errors in the analysed code
/// - **W0101-W0199**: Warnings
/// - **H0101-H0199**: Hints and advisories
pub mod codes {
    /// Variable with no binding and no enclosing `with`.
    pub const UNDEFINED_VARIABLE: &str = "E0101";
    /// Attribute key declared twice in one set.
    pub const DUPLICATE_ATTR: &str = "E0102";
    /// Name bound twice in one `let`.
    pub const DUPLICATE_BINDING: &str = "E0103";
    /// Formal listed twice.
    pub const DUPLICATE_FORMAL: &str = "E0104";
    /// `@`-argument named like a formal.
    pub const DUPLICATE_FORMAL_ARG: &str = "E0105";
    /// Interpolated name in `inherit`.
    pub const DYNAMIC_INHERIT: &str = "E0106";
    /// Interpolated key in `let`.
    pub const LET_DYNAMIC: &str = "E0107";
    /// Prefixed-only primop used without `builtins.`.
    pub const PRIMOP_NEEDS_PREFIX: &str = "E0108";

    pub const MERGE_DIFF_REC: &str = "W0101";
    pub const EMPTY_INHERIT: &str = "W0102";
    pub const EXTRA_REC: &str = "W0103";
    pub const EXTRA_WITH: &str = "W0104";
    pub const PRIMOP_OVERRIDDEN: &str = "W0105";
    pub const CONSTANT_OVERRIDDEN: &str = "W0106";
    /// `builtins.<name>` where no such primop exists.
    pub const PRIMOP_UNKNOWN: &str = "W0107";

    pub const DYNAMIC_KEY_COLLISION: &str = "H0101";
    pub const UNUSED_DEFINITION: &str = "H0102";
    pub const ESCAPING_WITH: &str = "H0103";
    pub const PRIMOP_REMOVABLE_PREFIX: &str = "H0104";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during semantic analysis.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        tracing::trace!(
            code = diagnostic.code(),
            start = u32::from(diagnostic.range.start()),
            "{}",
            diagnostic.message
        );
        self.diagnostics.push(diagnostic);
    }

    /// Get all collected diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Get the error count.
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    /// Get the warning count.
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    // ------------------------------------------------------------------------
    // Structural
    // ------------------------------------------------------------------------

    /// A key repeated inside one attribute set.
    pub fn duplicate_attr(&mut self, name: &str, range: TextRange, previous: TextRange) {
        self.add(
            Diagnostic::new(
                DiagnosticKind::DuplicateAttr,
                range,
                format!("duplicated attrname `{name}`"),
            )
            .with_related(previous, "previously declared here"),
        );
    }

    /// A name repeated inside one `let`.
    pub fn duplicate_binding(&mut self, name: &str, range: TextRange, previous: TextRange) {
        self.add(
            Diagnostic::new(
                DiagnosticKind::DuplicateBinding,
                range,
                format!("duplicated binding `{name}`"),
            )
            .with_related(previous, "previously declared here"),
        );
    }

    pub fn duplicate_formal(&mut self, name: &str, range: TextRange, previous: TextRange) {
        self.add(
            Diagnostic::new(
                DiagnosticKind::DuplicateFormal,
                range,
                format!("duplicated function formal `{name}`"),
            )
            .with_related(previous, "first declared here"),
        );
    }

    pub fn duplicate_formal_arg(&mut self, arg: TextRange, formal: TextRange) {
        self.add(
            Diagnostic::new(
                DiagnosticKind::DuplicateFormalArg,
                arg,
                "function argument duplicated to a function formal",
            )
            .with_related(formal, "duplicated to this formal"),
        );
    }

    pub fn dynamic_inherit(&mut self, range: TextRange) {
        self.add(Diagnostic::new(
            DiagnosticKind::DynamicInherit,
            range,
            "dynamic attributes are not allowed in inherit",
        ));
    }

    pub fn let_dynamic(&mut self, range: TextRange) {
        self.add(Diagnostic::new(
            DiagnosticKind::LetDynamic,
            range,
            "dynamic attributes are not allowed in let ... in ... expression",
        ));
    }

    pub fn merge_diff_rec(&mut self, range: TextRange, first: TextRange) {
        self.add(
            Diagnostic::new(
                DiagnosticKind::MergeDiffRec,
                range,
                "merging two attributes with different `rec` modifiers, the latter will be implicitly ignored",
            )
            .with_related(first, "this modifier is kept"),
        );
    }

    pub fn empty_inherit(&mut self, range: TextRange) {
        self.add(
            Diagnostic::new(DiagnosticKind::EmptyInherit, range, "empty inherit expression")
                .with_fix("remove `inherit` keyword", vec![TextEdit::removal(range)]),
        );
    }

    // ------------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------------

    /// `scope` is the nearest enclosing binding construct, if any.
    pub fn undefined_variable(&mut self, name: &str, range: TextRange, scope: Option<TextRange>) {
        let mut diagnostic = Diagnostic::new(
            DiagnosticKind::UndefinedVariable,
            range,
            format!("undefined variable `{name}`"),
        );
        if let Some(scope) = scope {
            diagnostic = diagnostic.with_related(scope, "not bound in this scope");
        }
        self.add(diagnostic);
    }

    pub fn primop_needs_prefix(&mut self, name: &str, range: TextRange) {
        self.add(
            Diagnostic::new(
                DiagnosticKind::PrimOpNeedsPrefix,
                range,
                format!("`{name}` is only available as `builtins.{name}`"),
            )
            .with_fix(
                "use `builtins.` prefix",
                vec![TextEdit::insertion(range.start(), "builtins.")],
            ),
        );
    }

    pub fn primop_unknown(&mut self, name: &str, range: TextRange) {
        self.add(Diagnostic::new(
            DiagnosticKind::PrimOpUnknown,
            range,
            format!("unknown primop `builtins.{name}`"),
        ));
    }

    pub fn escaping_with(&mut self, range: TextRange, definition: Option<TextRange>) {
        let mut diagnostic = Diagnostic::new(
            DiagnosticKind::EscapingWith,
            range,
            "this variable comes from the scope outside of the `with` expression",
        );
        if let Some(definition) = definition {
            diagnostic = diagnostic.with_related(definition, "bound here");
        }
        self.add(diagnostic);
    }

    // ------------------------------------------------------------------------
    // Lints
    // ------------------------------------------------------------------------

    pub fn unused_definition(&mut self, name: &str, range: TextRange) {
        self.add(Diagnostic::new(
            DiagnosticKind::UnusedDefinition,
            range,
            format!("definition `{name}` is not used"),
        ));
    }

    /// `keyword` is the range of `rec` itself.
    pub fn extra_rec(&mut self, range: TextRange, keyword: TextRange) {
        self.add(
            Diagnostic::new(
                DiagnosticKind::ExtraRec,
                range,
                "attrset is not necessary to be `rec`ursive",
            )
            .with_fix("remove `rec` keyword", vec![TextEdit::removal(keyword)]),
        );
    }

    /// `removal` spans `with subject;` up to the body.
    pub fn extra_with(&mut self, range: TextRange, removal: TextRange) {
        self.add(
            Diagnostic::new(DiagnosticKind::ExtraWith, range, "unused `with` expression")
                .with_fix("remove `with` expression", vec![TextEdit::removal(removal)]),
        );
    }

    pub fn builtin_overridden(&mut self, name: &str, range: TextRange, constant: bool) {
        let (kind, what) = if constant {
            (DiagnosticKind::ConstantOverridden, "constant")
        } else {
            (DiagnosticKind::PrimOpOverridden, "primop")
        };
        self.add(Diagnostic::new(
            kind,
            range,
            format!("overriding {what} `{name}`"),
        ));
    }

    /// `builtins.name` where `name` alone resolves to the same primop.
    /// `removal` spans `builtins.`.
    pub fn primop_removable_prefix(&mut self, name: &str, range: TextRange, removal: TextRange) {
        self.add(
            Diagnostic::new(
                DiagnosticKind::PrimOpRemovablePrefix,
                range,
                format!("prefix `builtins.` can be omitted for builtin function `{name}`"),
            )
            .with_fix("remove `builtins.` prefix", vec![TextEdit::removal(removal)]),
        );
    }

    /// `inherit (builtins) name;` in a `let` where `name` is already global.
    pub fn inherit_removable_prefix(&mut self, name: &str, key: TextRange) {
        self.add(
            Diagnostic::new(
                DiagnosticKind::PrimOpRemovablePrefix,
                key,
                format!("`{name}` is available without inheriting it from `builtins`"),
            )
            .with_fix("remove unnecessary inherit", vec![TextEdit::removal(key)]),
        );
    }

    /// One advisory per set that mixes static and dynamic keys.
    pub fn dynamic_key_collision(&mut self, dynamic: TextRange, first_static: TextRange) {
        self.add(
            Diagnostic::new(
                DiagnosticKind::DynamicKeyCollision,
                dynamic,
                "dynamic attribute may collide with static attributes of this set",
            )
            .with_related(first_static, "static attribute declared here"),
        );
    }
}

// ============================================================================
// JSON OUTPUT
// ============================================================================

#[cfg(feature = "json")]
mod json {
    use serde::Serialize;

    use super::{Diagnostic, Fix, RelatedInfo, Severity};
    use crate::base::TextRange;

    #[derive(Serialize)]
    struct JsonDiagnostic<'a> {
        sname: &'static str,
        code: &'static str,
        severity: Severity,
        message: &'a str,
        range: TextRange,
        notes: &'a [RelatedInfo],
        fixes: &'a [Fix],
    }

    /// Render diagnostics as a JSON array.
    pub fn to_json(diagnostics: &[Diagnostic]) -> serde_json::Result<String> {
        let view: Vec<JsonDiagnostic<'_>> = diagnostics
            .iter()
            .map(|d| JsonDiagnostic {
                sname: d.kind.sname(),
                code: d.code(),
                severity: d.severity,
                message: &d.message,
                range: d.range,
                notes: &d.related,
                fixes: &d.fixes,
            })
            .collect();
        serde_json::to_string(&view)
    }
}

#[cfg(feature = "json")]
pub use json::to_json;
