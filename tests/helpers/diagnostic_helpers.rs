//! Analysis and diagnostic assertion helpers.

use nixsema::sema::{Analysis, Diagnostic, DiagnosticKind, SemaConfig, analyze};
use nixsema::SyntaxTree;

/// Analyse with every lint off.
pub fn analyze_default(tree: &SyntaxTree) -> Analysis {
    analyze(tree, &SemaConfig::default()).unwrap()
}

/// Analyse with every lint on.
pub fn analyze_linted(tree: &SyntaxTree) -> Analysis {
    analyze(tree, &SemaConfig::all_lints()).unwrap()
}

/// Diagnostic kinds in emission order.
pub fn kinds(analysis: &Analysis) -> Vec<DiagnosticKind> {
    analysis.diagnostics().iter().map(|d| d.kind).collect()
}

fn describe(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("  {} {:?}: {}", d.code(), d.range, d.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assert the analysis reported nothing.
pub fn assert_no_diagnostics(analysis: &Analysis) {
    let diagnostics = analysis.diagnostics();
    assert!(
        diagnostics.is_empty(),
        "Expected no diagnostics, got {}:\n{}",
        diagnostics.len(),
        describe(diagnostics)
    );
}

/// Assert the analysis reported exactly one diagnostic, of `kind`, and return it.
pub fn single_diagnostic(analysis: &Analysis, kind: DiagnosticKind) -> &Diagnostic {
    let diagnostics = analysis.diagnostics();
    assert!(
        diagnostics.len() == 1 && diagnostics[0].kind == kind,
        "Expected a single {kind:?}, got:\n{}",
        describe(diagnostics)
    );
    &diagnostics[0]
}
