#![allow(clippy::unwrap_used)]

use rstest::rstest;

use crate::helpers::diagnostic_helpers::*;
use crate::helpers::tree_helpers::*;
use nixsema::sema::{DefinitionSource, DiagnosticKind, FrameKind, Resolution, ScopeId};
use nixsema::syntax::BinaryOp;
use nixsema::{NodeKind, SyntaxTree, TreeBuilder};

// =============================================================================
// UNDEFINED VARIABLES
// =============================================================================

#[test]
fn test_free_variable_is_undefined() {
    let mut b = TreeBuilder::new();
    let x = b.var("x");
    let tree = b.finish(x);

    let analysis = analyze_default(&tree);
    let diagnostic = single_diagnostic(&analysis, DiagnosticKind::UndefinedVariable);
    assert_eq!(diagnostic.range, tree.range(x).unwrap());
    assert_eq!(diagnostic.code(), "E0101");
    assert!(diagnostic.related.is_empty());
    assert_eq!(analysis.resolution(x), Some(&Resolution::Unresolved));
    assert_eq!(analysis.error_count(), 1);
}

#[test]
fn test_undefined_variable_points_at_enclosing_scope() {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let a = b.bind("a", one);
    let missing = b.var("missing");
    let root = b.let_in(vec![a], missing);
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    let diagnostic = single_diagnostic(&analysis, DiagnosticKind::UndefinedVariable);
    assert_eq!(diagnostic.related.len(), 1);
    assert_eq!(diagnostic.related[0].range, tree.range(root).unwrap());
    assert!(diagnostic.message.contains("missing"));
}

#[test]
fn test_prefixed_primop_suggests_builtins_prefix() {
    let mut b = TreeBuilder::new();
    let names = b.var("attrNames");
    let set = b.attrs(vec![]);
    let root = b.call(names, vec![set]);
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    let diagnostic = single_diagnostic(&analysis, DiagnosticKind::PrimOpNeedsPrefix);
    let edit = &diagnostic.fixes[0].edits[0];
    assert_eq!(edit.new_text.as_ref(), "builtins.");
    assert_eq!(edit.range.start(), offset_of(&tree, names));
    assert!(edit.range.is_empty());
}

// =============================================================================
// BUILTINS
// =============================================================================

#[rstest]
#[case("map")]
#[case("toString")]
#[case("import")]
#[case("true")]
#[case("null")]
#[case("builtins")]
#[case("__attrNames")]
fn test_global_names_resolve_to_builtins(#[case] name: &str) {
    let mut b = TreeBuilder::new();
    let var = b.var(name);
    let tree = b.finish(var);

    let analysis = analyze_default(&tree);
    assert_no_diagnostics(&analysis);
    let def = analysis.resolved_def(var).unwrap();
    let definition = analysis.definition(def).unwrap();
    assert_eq!(definition.source(), DefinitionSource::Builtin);
    assert_eq!(definition.syntax(), None);
}

#[test]
fn test_selected_attribute_names_are_not_variables() {
    let mut b = TreeBuilder::new();
    let builtins = b.var("builtins");
    let root = b.select(builtins, &["attrNames"], None);
    let tree = b.finish(root);

    assert_no_diagnostics(&analyze_default(&tree));
}

// =============================================================================
// SHADOWING
// =============================================================================

#[test]
fn test_inner_let_shadows_outer_let() {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let outer = b.bind("x", one);
    let two = b.int(2);
    let inner = b.bind("x", two);
    let x = b.var("x");
    let inner_let = b.let_in(vec![inner], x);
    let root = b.let_in(vec![outer], inner_let);
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    assert_no_diagnostics(&analysis);

    let resolved = analysis.resolved_def(x).unwrap();
    assert_eq!(analysis.definition(resolved).unwrap().syntax(), Some(binding_key(&tree, inner)));

    let outer_def = analysis.to_def(binding_key(&tree, outer)).unwrap();
    assert!(analysis.uses(outer_def).is_empty());
    assert_eq!(analysis.uses(resolved), &[x]);
}

#[test]
fn test_lambda_argument_shadows_builtin() {
    let mut b = TreeBuilder::new();
    let body = b.var("map");
    let root = b.lambda("map", body);
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    assert_no_diagnostics(&analysis);
    let def = analysis.resolved_def(body).unwrap();
    assert_eq!(analysis.definition(def).unwrap().source(), DefinitionSource::LambdaArg);
    assert_eq!(analysis.definition(def).unwrap().syntax(), Some(lambda_arg(&tree, root)));
}

#[test]
fn test_let_values_see_each_other() {
    let mut b = TreeBuilder::new();
    let b_ref = b.var("b");
    let a = b.bind("a", b_ref);
    let one = b.int(1);
    let bb = b.bind("b", one);
    let body = b.var("a");
    let root = b.let_in(vec![a, bb], body);
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    assert_no_diagnostics(&analysis);
    let def = analysis.resolved_def(b_ref).unwrap();
    assert_eq!(analysis.definition(def).unwrap().source(), DefinitionSource::Let);
}

// =============================================================================
// WITH FALLBACK
// =============================================================================

#[test]
fn test_unbound_variable_falls_back_to_with() {
    let mut b = TreeBuilder::new();
    let empty = b.attrs(vec![]);
    let s = b.bind("s", empty);
    let s_ref = b.var("s");
    let x = b.var("x");
    let with = b.with(s_ref, x);
    let root = b.let_in(vec![s], with);
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    assert_no_diagnostics(&analysis);
    assert_eq!(analysis.resolution(x), Some(&Resolution::Dynamic(vec![with])));
    assert_eq!(analysis.resolved_def(x), None);
    assert_eq!(analysis.with_uses(with), &[x]);

    let (s_def, _) = def_named(&analysis, "s");
    assert_eq!(analysis.uses(s_def), &[s_ref]);
}

#[test]
fn test_nested_withs_are_listed_innermost_first() {
    let mut b = TreeBuilder::new();
    let outer_subject = b.attrs(vec![]);
    let inner_subject = b.attrs(vec![]);
    let z = b.var("z");
    let inner = b.with(inner_subject, z);
    let outer = b.with(outer_subject, inner);
    let tree = b.finish(outer);

    let analysis = analyze_default(&tree);
    assert_no_diagnostics(&analysis);
    assert_eq!(analysis.resolution(z), Some(&Resolution::Dynamic(vec![inner, outer])));
    assert_eq!(analysis.with_uses(outer), &[z]);
    assert_eq!(analysis.with_uses(inner), &[z]);
}

#[test]
fn test_with_subject_is_resolved_outside_the_with() {
    let mut b = TreeBuilder::new();
    let subject = b.var("pkgs");
    let one = b.int(1);
    let root = b.with(subject, one);
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    let diagnostic = single_diagnostic(&analysis, DiagnosticKind::UndefinedVariable);
    assert_eq!(diagnostic.range, tree.range(subject).unwrap());
}

#[test]
fn test_static_binding_beats_with() {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let x_bind = b.bind("x", one);
    let subject = b.attrs(vec![]);
    let x = b.var("x");
    let with = b.with(subject, x);
    let root = b.let_in(vec![x_bind], with);
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    assert_no_diagnostics(&analysis);
    let def = analysis.resolved_def(x).unwrap();
    assert_eq!(analysis.definition(def).unwrap().source(), DefinitionSource::Let);
    assert!(analysis.with_uses(with).is_empty());
}

// =============================================================================
// ERROR RECOVERY
// =============================================================================

#[test]
fn test_null_nodes_are_skipped() {
    let mut b = TreeBuilder::new();
    let hole = b.null();
    let a = b.bind("a", hole);
    let y = b.var("y");
    let bb = b.bind("b", y);
    let stray = b.null();
    let root = b.attrs(vec![a, stray, bb]);
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    assert!(analysis.is_complete());
    let diagnostic = single_diagnostic(&analysis, DiagnosticKind::UndefinedVariable);
    assert_eq!(diagnostic.range, tree.range(y).unwrap());
}

#[test]
fn test_value_behind_missing_path_is_still_analysed() {
    let mut b = TreeBuilder::new();
    let z = b.var("z");
    let path = b.null();
    let binding = b.binding(path, z);
    let one = b.int(1);
    let root = b.let_in(vec![binding], one);
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    let diagnostic = single_diagnostic(&analysis, DiagnosticKind::UndefinedVariable);
    assert_eq!(diagnostic.range, tree.range(z).unwrap());
}

#[test]
fn test_null_root_analyses_cleanly() {
    let mut b = TreeBuilder::new();
    let root = b.null();
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    assert_no_diagnostics(&analysis);
    assert!(analysis.is_complete());
}

// =============================================================================
// PROPERTIES
// =============================================================================

fn identity() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let body = b.var("x");
    let root = b.lambda("x", body);
    b.finish(root)
}

fn let_chain() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let a = b.bind("a", one);
    let a_ref = b.var("a");
    let bb = b.bind("b", a_ref);
    let body = b.var("b");
    let root = b.let_in(vec![a, bb], body);
    b.finish(root)
}

fn rec_set() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let a = b.bind("a", one);
    let a_ref = b.var("a");
    let two = b.int(2);
    let sum = b.binary(BinaryOp::Add, a_ref, two);
    let bb = b.bind("b", sum);
    let root = b.rec_attrs(vec![a, bb]);
    b.finish(root)
}

fn formals_with_default() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let a = b.formal("a", None);
    let a_ref = b.var("a");
    let bf = b.formal("b", Some(a_ref));
    let formals = b.formals(vec![a, bf], true);
    let body = b.var("b");
    let root = b.lambda_formals(None, formals, body);
    b.finish(root)
}

fn builtin_call() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let map = b.var("map");
    let to_string = b.var("toString");
    let one = b.int(1);
    let list = b.list(vec![one]);
    let root = b.call(map, vec![to_string, list]);
    b.finish(root)
}

fn inherit_from_let() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let y = b.bind("y", one);
    let inner = b.attrs(vec![y]);
    let s = b.bind("s", inner);
    let s_ref = b.var("s");
    let inherit = b.inherit_from(s_ref, &["y"]);
    let body = b.attrs(vec![inherit]);
    let root = b.let_in(vec![s], body);
    b.finish(root)
}

fn conditional() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let cond = b.var("true");
    let then_branch = b.var("x");
    let else_branch = b.null();
    let body = b.if_then_else(cond, then_branch, else_branch);
    let root = b.lambda("x", body);
    b.finish(root)
}

#[rstest]
#[case::identity(identity())]
#[case::let_chain(let_chain())]
#[case::rec_set(rec_set())]
#[case::formals(formals_with_default())]
#[case::builtin_call(builtin_call())]
#[case::inherit_from(inherit_from_let())]
#[case::conditional(conditional())]
fn test_closed_trees_have_no_diagnostics(#[case] tree: SyntaxTree) {
    let analysis = analyze_default(&tree);
    assert_no_diagnostics(&analysis);
    assert!(analysis.is_complete());
}

#[rstest]
#[case::identity(identity())]
#[case::rec_set(rec_set())]
#[case::inherit_from(inherit_from_let())]
fn test_analysis_is_deterministic(#[case] tree: SyntaxTree) {
    let first = analyze_linted(&tree);
    let second = analyze_linted(&tree);
    assert_eq!(first, second);
}

#[test]
fn test_every_variable_gets_a_resolution() {
    let tree = let_chain();
    let analysis = analyze_default(&tree);
    for (id, node) in tree.iter() {
        if matches!(node.kind, NodeKind::Var(_)) {
            assert!(analysis.resolution(id).is_some(), "{id:?} was not resolved");
        }
    }
}

#[test]
fn test_scopes_nest_under_the_global_scope() {
    let tree = let_chain();
    let analysis = analyze_default(&tree);

    let global = analysis.scopes().get(ScopeId::new(0)).unwrap();
    assert_eq!(global.kind, FrameKind::Global);
    assert_eq!(global.parent, None);

    let let_scope = analysis.scopes().get(ScopeId::new(1)).unwrap();
    assert_eq!(let_scope.kind, FrameKind::Let);
    assert_eq!(let_scope.syntax, Some(tree.root()));
    assert_eq!(let_scope.parent, Some(ScopeId::new(0)));
    let names: Vec<&str> = let_scope.names.keys().map(|name| name.as_str()).collect();
    assert_eq!(names, vec!["a", "b"]);
}
