#![allow(clippy::unwrap_used)]

use tokio_util::sync::CancellationToken;

use crate::helpers::diagnostic_helpers::*;
use nixsema::sema::{SemaConfig, SemaError, analyze, analyze_with_cancel};
use nixsema::bytecode;
use nixsema::syntax::{BinaryOp, Node};
use nixsema::{NodeId, NodeKind, SyntaxTree, TextRange, TreeBuilder};

fn node(kind: NodeKind) -> Node {
    Node {
        kind,
        range: TextRange::new(0.into(), 1.into()),
    }
}

// =============================================================================
// MALFORMED TREES
// =============================================================================

#[test]
fn test_root_outside_tree() {
    let tree = SyntaxTree::from_parts(vec![node(NodeKind::Int(1))], NodeId::new(4));
    let err = analyze(&tree, &SemaConfig::default()).unwrap_err();
    assert_eq!(
        err,
        SemaError::MissingRoot {
            root: NodeId::new(4),
            len: 1
        }
    );
}

#[test]
fn test_self_referencing_node() {
    let tree = SyntaxTree::from_parts(vec![node(NodeKind::Paren(NodeId::new(0)))], NodeId::new(0));
    let err = analyze(&tree, &SemaConfig::default()).unwrap_err();
    assert!(matches!(err, SemaError::ForwardChild { .. }));
    assert!(err.to_string().contains("does not precede"));
}

#[test]
fn test_binding_slot_holding_expression() {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let root = b.push(
        NodeKind::Attrs {
            rec: false,
            bindings: vec![one],
        },
        TextRange::new(0.into(), 5.into()),
    );
    let tree = b.finish(root);

    let err = analyze(&tree, &SemaConfig::default()).unwrap_err();
    assert_eq!(
        err,
        SemaError::UnexpectedKind {
            node: one,
            expected: "binding",
            found: "int"
        }
    );
}

#[test]
fn test_formals_slot_holding_expression() {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let body = b.int(2);
    let root = b.push(
        NodeKind::Lambda {
            arg: None,
            formals: Some(one),
            body,
        },
        TextRange::new(0.into(), 5.into()),
    );
    let tree = b.finish(root);

    let err = analyze(&tree, &SemaConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        SemaError::UnexpectedKind {
            expected: "formals",
            ..
        }
    ));
}

#[test]
fn test_error_deep_in_tree_aborts_pass() {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let bad = b.push(
        NodeKind::Attrs {
            rec: false,
            bindings: vec![one],
        },
        TextRange::new(0.into(), 1.into()),
    );
    let body = b.var("undefined");
    let lambda = b.lambda("x", bad);
    let root = b.list(vec![body, lambda]);
    let tree = b.finish(root);

    assert!(analyze(&tree, &SemaConfig::default()).is_err());
}

#[test]
fn test_shared_child_is_rejected() {
    let mut b = TreeBuilder::new();
    let x = b.var("x");
    let sum = b.binary(BinaryOp::Add, x, x);
    let root = b.lambda("x", sum);
    let tree = b.finish(root);

    let err = analyze(&tree, &SemaConfig::default()).unwrap_err();
    assert_eq!(err, SemaError::SharedChild { parent: sum, child: x });
    assert!(err.to_string().contains("already has a parent"));
}

#[test]
fn test_child_shared_across_subtrees_is_rejected() {
    let mut b = TreeBuilder::new();
    let one = b.int(1);
    let left = b.paren(one);
    let right = b.paren(one);
    let root = b.list(vec![left, right]);
    let tree = b.finish(root);

    let err = analyze(&tree, &SemaConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        SemaError::SharedChild { parent, child } if child == one && (parent == left || parent == right)
    ));
}

// =============================================================================
// DEEP TREES
// =============================================================================

const DEPTH: usize = 10_000;

/// Runs on a thread with a deliberately small stack.
fn analyze_on_small_stack(tree: SyntaxTree) -> nixsema::Analysis {
    std::thread::Builder::new()
        .stack_size(256 * 1024)
        .spawn(move || analyze(&tree, &SemaConfig::all_lints()).unwrap())
        .unwrap()
        .join()
        .unwrap()
}

#[test]
fn test_deeply_nested_parens() {
    let mut b = TreeBuilder::new();
    let x = b.var("x");
    let mut inner = x;
    for _ in 0..DEPTH {
        inner = b.paren(inner);
    }
    let root = b.lambda("x", inner);
    let tree = b.finish(root);

    let analysis = analyze_on_small_stack(tree);
    assert_no_diagnostics(&analysis);
    assert!(analysis.resolved_def(x).is_some());
}

#[test]
fn test_long_concat_chain() {
    let mut b = TreeBuilder::new();
    let mut acc = b.var("xs");
    for _ in 0..DEPTH {
        let item = b.var("xs");
        let list = b.list(vec![item]);
        acc = b.binary(BinaryOp::Concat, acc, list);
    }
    let root = b.lambda("xs", acc);
    let tree = b.finish(root);

    let analysis = analyze_on_small_stack(tree);
    assert_no_diagnostics(&analysis);
    let def = analysis.resolved_def(NodeId::new(0)).unwrap();
    assert_eq!(analysis.uses(def).len(), DEPTH + 1);
}

#[test]
fn test_deep_tree_survives_encoding() {
    let mut b = TreeBuilder::new();
    let mut inner = b.var("undefined");
    for _ in 0..DEPTH {
        inner = b.paren(inner);
    }
    let tree = b.finish(inner);

    let decoded = bytecode::decode(&bytecode::encode(&tree)).unwrap();
    assert_eq!(decoded, tree);
    let analysis = analyze_on_small_stack(decoded);
    assert_eq!(kinds(&analysis), vec![nixsema::DiagnosticKind::UndefinedVariable]);
}

// =============================================================================
// CANCELLATION
// =============================================================================

#[test]
fn test_cancelled_pass_reports_incomplete() {
    let mut b = TreeBuilder::new();
    let x = b.var("x");
    let root = b.lambda("y", x);
    let tree = b.finish(root);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let analysis = analyze_with_cancel(&tree, &SemaConfig::all_lints(), &cancel).unwrap();
    assert!(!analysis.is_complete());
    assert!(analysis.diagnostics().is_empty());
    assert_eq!(analysis.resolution(x), None);
}

#[test]
fn test_uncancelled_token_matches_plain_analysis() {
    let mut b = TreeBuilder::new();
    let x = b.var("x");
    let root = b.lambda("y", x);
    let tree = b.finish(root);

    let cancel = CancellationToken::new();
    let with_token = analyze_with_cancel(&tree, &SemaConfig::all_lints(), &cancel).unwrap();
    assert!(with_token.is_complete());
    assert_eq!(with_token, analyze_linted(&tree));
}
