#![allow(clippy::unwrap_used)]

use rstest::rstest;

use crate::helpers::diagnostic_helpers::*;
use crate::helpers::tree_helpers::*;
use nixsema::sema::{DiagnosticKind, LintOptions, SemaConfig, Severity, analyze};
use nixsema::{NodeId, NodeKind, SyntaxTree, TextRange, TreeBuilder};

// =============================================================================
// FIXTURES
// =============================================================================

/// `let a = 1; b = 2; in a`
fn unused_let() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let a = b.bind("a", one);
    let two = b.int(2);
    let bb = b.bind("b", two);
    let body = b.var("a");
    let root = b.let_in(vec![a, bb], body);
    b.finish(root)
}

/// `rec { a = 1; }`
fn needless_rec() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let a = b.bind("a", one);
    let root = b.rec_attrs(vec![a]);
    b.finish(root)
}

/// `with {}; 1`
fn needless_with() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let subject = b.attrs(vec![]);
    let one = b.int(1);
    let root = b.with(subject, one);
    b.finish(root)
}

/// `let x = 1; in with {}; x`
fn escaping_with() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let x = b.bind("x", one);
    let subject = b.attrs(vec![]);
    let x_ref = b.var("x");
    let with = b.with(subject, x_ref);
    let root = b.let_in(vec![x], with);
    b.finish(root)
}

/// `let true = 1; in true`
fn overridden_constant() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let t = b.bind("true", one);
    let body = b.var("true");
    let root = b.let_in(vec![t], body);
    b.finish(root)
}

/// `builtins.map`
fn prefixed_global_primop() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let builtins = b.var("builtins");
    let root = b.select(builtins, &["map"], None);
    b.finish(root)
}

/// `let inherit (builtins) map; in map`
fn inherited_global_primop() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    let builtins = b.var("builtins");
    let inherit = b.inherit_from(builtins, &["map"]);
    let body = b.var("map");
    let root = b.let_in(vec![inherit], body);
    b.finish(root)
}

// =============================================================================
// DEFAULT CONFIGURATION
// =============================================================================

#[rstest]
#[case::unused_let(unused_let())]
#[case::needless_rec(needless_rec())]
#[case::needless_with(needless_with())]
#[case::escaping_with(escaping_with())]
#[case::overridden_constant(overridden_constant())]
#[case::prefixed_global_primop(prefixed_global_primop())]
#[case::inherited_global_primop(inherited_global_primop())]
fn test_lints_are_off_by_default(#[case] tree: SyntaxTree) {
    assert_no_diagnostics(&analyze_default(&tree));
}

#[rstest]
#[case::unused_let(unused_let(), vec![DiagnosticKind::UnusedDefinition])]
#[case::needless_rec(needless_rec(), vec![DiagnosticKind::ExtraRec])]
#[case::needless_with(needless_with(), vec![DiagnosticKind::ExtraWith])]
#[case::escaping_with(escaping_with(), vec![DiagnosticKind::EscapingWith, DiagnosticKind::ExtraWith])]
#[case::overridden_constant(overridden_constant(), vec![DiagnosticKind::ConstantOverridden])]
#[case::prefixed_global_primop(prefixed_global_primop(), vec![DiagnosticKind::PrimOpRemovablePrefix])]
#[case::inherited_global_primop(inherited_global_primop(), vec![DiagnosticKind::PrimOpRemovablePrefix])]
fn test_lints_when_enabled(#[case] tree: SyntaxTree, #[case] expected: Vec<DiagnosticKind>) {
    assert_eq!(kinds(&analyze_linted(&tree)), expected);
}

#[test]
fn test_single_lint_can_be_enabled() {
    let tree = escaping_with();
    let config = SemaConfig {
        lints: LintOptions {
            extra_with: true,
            ..LintOptions::default()
        },
        ..SemaConfig::default()
    };
    let analysis = analyze(&tree, &config).unwrap();
    assert_eq!(kinds(&analysis), vec![DiagnosticKind::ExtraWith]);
}

// =============================================================================
// DETAILS
// =============================================================================

#[test]
fn test_unused_let_points_at_binding_name() {
    let tree = unused_let();
    let analysis = analyze_linted(&tree);
    let diagnostic = single_diagnostic(&analysis, DiagnosticKind::UnusedDefinition);
    assert_eq!(diagnostic.severity, Severity::Hint);
    assert!(diagnostic.message.contains("`b`"));
}

#[test]
fn test_rec_with_used_key_is_fine() {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let a = b.bind("a", one);
    let a_ref = b.var("a");
    let bb = b.bind("b", a_ref);
    let root = b.rec_attrs(vec![a, bb]);
    let tree = b.finish(root);

    assert_no_diagnostics(&analyze_linted(&tree));
}

#[test]
fn test_extra_with_removes_prefix() {
    let tree = needless_with();
    let analysis = analyze_linted(&tree);
    let diagnostic = single_diagnostic(&analysis, DiagnosticKind::ExtraWith);
    assert_eq!(diagnostic.severity, Severity::Warning);

    let Some(NodeKind::With { body, .. }) = tree.kind(tree.root()) else {
        panic!("root is not a with");
    };
    let with_range = tree.range(tree.root()).unwrap();
    let body_start = tree.range(*body).unwrap().start();
    assert_eq!(diagnostic.range, with_range);
    assert_eq!(
        diagnostic.fixes[0].edits[0].range,
        TextRange::new(with_range.start(), body_start)
    );
}

#[test]
fn test_with_providing_a_variable_is_fine() {
    let mut b = TreeBuilder::new();
    let subject = b.attrs(vec![]);
    let y = b.var("y");
    let root = b.with(subject, y);
    let tree = b.finish(root);

    assert_no_diagnostics(&analyze_linted(&tree));
}

#[test]
fn test_builtins_inside_with_do_not_escape() {
    let mut b = TreeBuilder::new();
    let subject = b.attrs(vec![]);
    let t = b.var("true");
    let root = b.with(subject, t);
    let tree = b.finish(root);

    assert_eq!(kinds(&analyze_linted(&tree)), vec![DiagnosticKind::ExtraWith]);
}

#[test]
fn test_escaping_with_points_at_binding() {
    let tree = escaping_with();
    let analysis = analyze_linted(&tree);
    let escaping = &analysis.diagnostics()[0];
    assert_eq!(escaping.kind, DiagnosticKind::EscapingWith);

    let (_, x) = def_named(&analysis, "x");
    assert_eq!(escaping.range, tree.range(x.uses()[0]).unwrap());
    assert_eq!(escaping.related[0].range, tree.range(x.syntax().unwrap()).unwrap());
}

#[test]
fn test_overriding_primop_in_formal() {
    let mut b = TreeBuilder::new();
    let map = b.formal("map", None);
    let formals = b.formals(vec![map], false);
    let body = b.var("map");
    let root = b.lambda_formals(None, formals, body);
    let tree = b.finish(root);

    let analysis = analyze_linted(&tree);
    let diagnostic = single_diagnostic(&analysis, DiagnosticKind::PrimOpOverridden);
    assert_eq!(diagnostic.range, tree.range(formal_ident(&tree, map)).unwrap());
}

#[test]
fn test_extra_rec_removes_keyword() {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let a = b.bind("a", one);
    let root = b.push(
        NodeKind::Attrs {
            rec: true,
            bindings: vec![a],
        },
        TextRange::new(10.into(), 30.into()),
    );
    let tree = b.finish(root);

    let analysis = analyze_linted(&tree);
    let diagnostic = single_diagnostic(&analysis, DiagnosticKind::ExtraRec);
    assert_eq!(diagnostic.range, TextRange::new(10.into(), 30.into()));
    let edit = &diagnostic.fixes[0].edits[0];
    assert_eq!(edit.range, TextRange::new(10.into(), 13.into()));
    assert!(edit.new_text.is_empty());
}

// =============================================================================
// BUILTINS PREFIX
// =============================================================================

/// The name node of a single-name select.
fn selected_name(tree: &SyntaxTree, select: NodeId) -> NodeId {
    let Some(NodeKind::Select { path, .. }) = tree.kind(select) else {
        panic!("{select:?} is not a select");
    };
    match tree.kind(*path) {
        Some(NodeKind::AttrPath(names)) => names[0],
        other => panic!("{path:?} is not an attribute path: {other:?}"),
    }
}

#[test]
fn test_removable_prefix_fix_drops_builtins() {
    let tree = prefixed_global_primop();
    let analysis = analyze_linted(&tree);
    let diagnostic = single_diagnostic(&analysis, DiagnosticKind::PrimOpRemovablePrefix);
    assert_eq!(diagnostic.severity, Severity::Hint);

    let Some(NodeKind::Select { expr, .. }) = tree.kind(tree.root()) else {
        panic!("root is not a select");
    };
    let name = selected_name(&tree, tree.root());
    assert_eq!(
        diagnostic.fixes[0].edits[0].range,
        TextRange::new(offset_of(&tree, *expr), offset_of(&tree, name))
    );
}

#[test]
fn test_removable_inherit_fix_drops_key() {
    let tree = inherited_global_primop();
    let analysis = analyze_linted(&tree);
    let diagnostic = single_diagnostic(&analysis, DiagnosticKind::PrimOpRemovablePrefix);

    let Some(NodeKind::Let { bindings, .. }) = tree.kind(tree.root()) else {
        panic!("root is not a let");
    };
    let key = tree.range(inherit_keys(&tree, bindings[0])[0]).unwrap();
    assert_eq!(diagnostic.range, key);
    assert_eq!(diagnostic.fixes[0].edits[0].range, key);
}

#[test]
fn test_inherit_from_builtins_in_set_is_kept() {
    let mut b = TreeBuilder::new();
    let builtins = b.var("builtins");
    let inherit = b.inherit_from(builtins, &["map"]);
    let root = b.attrs(vec![inherit]);
    let tree = b.finish(root);

    assert_no_diagnostics(&analyze_linted(&tree));
}

#[rstest]
#[case::prefixed_only("attrNames")]
#[case::constant("currentSystem")]
#[case::constant_without_underscores("nixVersion")]
fn test_known_builtins_select_is_fine(#[case] name: &str) {
    let mut b = TreeBuilder::new();
    let builtins = b.var("builtins");
    let root = b.select(builtins, &[name], None);
    let tree = b.finish(root);

    assert_no_diagnostics(&analyze_linted(&tree));
}

#[test]
fn test_unknown_primop_is_reported() {
    let mut b = TreeBuilder::new();
    let builtins = b.var("builtins");
    let root = b.select(builtins, &["nope"], None);
    let tree = b.finish(root);

    let analysis = analyze_default(&tree);
    let diagnostic = single_diagnostic(&analysis, DiagnosticKind::PrimOpUnknown);
    assert_eq!(diagnostic.severity, Severity::Warning);
    assert_eq!(diagnostic.range, tree.range(selected_name(&tree, root)).unwrap());
    assert!(diagnostic.message.contains("builtins.nope"));
}

#[test]
fn test_shadowed_builtins_is_not_checked() {
    let mut b = TreeBuilder::new();
    let empty = b.attrs(vec![]);
    let bind = b.bind("builtins", empty);
    let builtins = b.var("builtins");
    let body = b.select(builtins, &["nope"], None);
    let root = b.let_in(vec![bind], body);
    let tree = b.finish(root);

    assert_no_diagnostics(&analyze_linted(&tree));
}
