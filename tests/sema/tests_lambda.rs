#![allow(clippy::unwrap_used)]

use crate::helpers::diagnostic_helpers::*;
use crate::helpers::tree_helpers::*;
use nixsema::sema::{DefinitionSource, DiagnosticKind};
use nixsema::TreeBuilder;

// =============================================================================
// ARGUMENTS
// =============================================================================

#[test]
fn test_simple_argument() {
    let mut b = TreeBuilder::new();
    let body = b.var("x");
    let root = b.lambda("x", body);
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    assert_no_diagnostics(&analysis);
    let def = analysis.resolved_def(body).unwrap();
    assert_eq!(analysis.to_def(lambda_arg(&tree, root)), Some(def));
    assert_eq!(analysis.definition(def).unwrap().source(), DefinitionSource::LambdaArg);
}

#[test]
fn test_at_argument_next_to_formals() {
    let mut b = TreeBuilder::new();
    let a = b.formal("a", None);
    let formals = b.formals(vec![a], true);
    let body = b.var("args");
    let root = b.lambda_formals(Some("args"), formals, body);
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    assert_no_diagnostics(&analysis);
    let def = analysis.resolved_def(body).unwrap();
    assert_eq!(analysis.definition(def).unwrap().source(), DefinitionSource::LambdaAtArg);
    assert_eq!(analysis.definition(def).unwrap().syntax(), Some(lambda_arg(&tree, root)));
}

#[test]
fn test_argument_is_not_visible_outside_lambda() {
    let mut b = TreeBuilder::new();
    let body = b.int(1);
    let lambda = b.lambda("x", body);
    let x = b.var("x");
    let root = b.call(lambda, vec![x]);
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    let diagnostic = single_diagnostic(&analysis, DiagnosticKind::UndefinedVariable);
    assert_eq!(diagnostic.range, tree.range(x).unwrap());
}

// =============================================================================
// FORMALS
// =============================================================================

#[test]
fn test_duplicate_formal_keeps_first() {
    let mut b = TreeBuilder::new();
    let first = b.formal("a", None);
    let second = b.formal("a", None);
    let formals = b.formals(vec![first, second], false);
    let body = b.var("a");
    let root = b.lambda_formals(None, formals, body);
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    let diagnostic = single_diagnostic(&analysis, DiagnosticKind::DuplicateFormal);
    assert_eq!(diagnostic.range, tree.range(formal_ident(&tree, second)).unwrap());
    assert_eq!(
        diagnostic.related[0].range,
        tree.range(formal_ident(&tree, first)).unwrap()
    );

    let def = analysis.resolved_def(body).unwrap();
    assert_eq!(analysis.definition(def).unwrap().syntax(), Some(formal_ident(&tree, first)));
    assert_eq!(defs_named(&analysis, "a").len(), 1);
}

#[test]
fn test_at_argument_named_like_formal() {
    let mut b = TreeBuilder::new();
    let a = b.formal("a", None);
    let formals = b.formals(vec![a], false);
    let body = b.var("a");
    let root = b.lambda_formals(Some("a"), formals, body);
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    let diagnostic = single_diagnostic(&analysis, DiagnosticKind::DuplicateFormalArg);
    assert_eq!(diagnostic.range, tree.range(lambda_arg(&tree, root)).unwrap());
    assert_eq!(diagnostic.related[0].range, tree.range(formal_ident(&tree, a)).unwrap());

    let def = analysis.resolved_def(body).unwrap();
    assert_eq!(analysis.definition(def).unwrap().source(), DefinitionSource::Formal);
}

#[test]
fn test_default_refers_to_later_formal() {
    let mut b = TreeBuilder::new();
    let b_ref = b.var("b");
    let a = b.formal("a", Some(b_ref));
    let bf = b.formal("b", None);
    let formals = b.formals(vec![a, bf], false);
    let body = b.var("a");
    let root = b.lambda_formals(None, formals, body);
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    assert_no_diagnostics(&analysis);
    let def = analysis.resolved_def(b_ref).unwrap();
    assert_eq!(analysis.definition(def).unwrap().syntax(), Some(formal_ident(&tree, bf)));
}

#[test]
fn test_default_refers_to_enclosing_let() {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let y = b.bind("y", one);
    let y_ref = b.var("y");
    let a = b.formal("a", Some(y_ref));
    let formals = b.formals(vec![a], false);
    let body = b.var("a");
    let lambda = b.lambda_formals(None, formals, body);
    let root = b.let_in(vec![y], lambda);
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    assert_no_diagnostics(&analysis);
    let def = analysis.resolved_def(y_ref).unwrap();
    assert_eq!(analysis.definition(def).unwrap().source(), DefinitionSource::Let);
}

#[test]
fn test_missing_formal_is_skipped() {
    let mut b = TreeBuilder::new();
    let hole = b.null();
    let a = b.formal("a", None);
    let formals = b.formals(vec![hole, a], false);
    let body = b.var("a");
    let root = b.lambda_formals(None, formals, body);
    let tree = b.finish(root);

    assert_no_diagnostics(&analyze_default(&tree));
}

// =============================================================================
// UNUSED PARAMETERS
// =============================================================================

#[test]
fn test_unused_formal_is_reported() {
    let mut b = TreeBuilder::new();
    let a = b.formal("a", None);
    let unused = b.formal("b", None);
    let formals = b.formals(vec![a, unused], false);
    let body = b.var("a");
    let root = b.lambda_formals(None, formals, body);
    let tree = b.finish(root);

    assert_no_diagnostics(&analyze_default(&tree));

    let analysis = analyze_linted(&tree);
    let diagnostic = single_diagnostic(&analysis, DiagnosticKind::UnusedDefinition);
    assert_eq!(diagnostic.range, tree.range(formal_ident(&tree, unused)).unwrap());
}

#[test]
fn test_unused_plain_argument_is_not_reported() {
    let mut b = TreeBuilder::new();
    let body = b.int(1);
    let root = b.lambda("x", body);
    let tree = b.finish(root);

    assert_no_diagnostics(&analyze_linted(&tree));
}

#[test]
fn test_unused_at_argument_is_reported() {
    let mut b = TreeBuilder::new();
    let a = b.formal("a", None);
    let formals = b.formals(vec![a], false);
    let body = b.var("a");
    let root = b.lambda_formals(Some("args"), formals, body);
    let tree = b.finish(root);

    let analysis = analyze_linted(&tree);
    let diagnostic = single_diagnostic(&analysis, DiagnosticKind::UnusedDefinition);
    assert_eq!(diagnostic.range, tree.range(lambda_arg(&tree, root)).unwrap());
}
