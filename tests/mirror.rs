use std::sync::Arc;

use parsetree_inspector::{
    MirrorNode, NodePath, ParseTree, RuleNames, Session, SourceTree, build_mirror,
};

fn names() -> RuleNames {
    RuleNames::new(vec!["A".into(), "B".into()])
}

/// root(A, B(C)) where C is an error token.
fn tree_with_error() -> ParseTree {
    ParseTree::rule(
        0,
        vec![
            ParseTree::token("A"),
            ParseTree::rule(1, vec![ParseTree::error("C")]),
        ],
    )
}

fn shape(node: &MirrorNode) -> String {
    if node.children.is_empty() {
        return node.source.to_string();
    }
    let kids: Vec<String> = node.children.iter().map(shape).collect();
    format!("{}({})", node.source, kids.join(","))
}

#[test]
fn absent_source_yields_no_mirror() {
    assert!(build_mirror(None).is_none());
}

#[test]
fn single_leaf() {
    let leaf = ParseTree::token("x");
    let m = build_mirror(Some(&leaf)).unwrap();
    assert!(m.is_leaf());
    assert!(!m.error_in_subtree);
    assert_eq!(m.source, NodePath::root());
}

#[test]
fn mirrors_shape_and_order() {
    let tree = tree_with_error();
    let m = build_mirror(Some(&tree)).unwrap();
    assert_eq!(shape(&m), "/(/0,/1(/1/0))");
    assert_eq!(m.node_count(), 4);
    for (i, child) in m.children.iter().enumerate() {
        assert_eq!(child.source, NodePath::root().child(i));
    }
}

#[test]
fn error_propagates_to_every_ancestor_only() {
    let tree = tree_with_error();
    let m = build_mirror(Some(&tree)).unwrap();
    assert!(m.error_in_subtree, "root");
    assert!(!m.children[0].error_in_subtree, "A has no error");
    assert!(m.children[1].error_in_subtree, "B contains C");
    assert!(m.children[1].children[0].error_in_subtree, "C itself");
}

#[test]
fn recovered_rule_counts_as_error() {
    let tree = ParseTree::rule(
        0,
        vec![ParseTree::failed_rule(1, "mismatched input", vec![ParseTree::token("q")])],
    );
    let m = build_mirror(Some(&tree)).unwrap();
    assert!(m.error_in_subtree);
    assert!(m.children[0].error_in_subtree);
    assert!(!m.children[0].children[0].error_in_subtree);
}

#[test]
fn building_twice_gives_equal_trees() {
    let tree = tree_with_error();
    let a = build_mirror(Some(&tree)).unwrap();
    let b = build_mirror(Some(&tree)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn text_comes_from_session_renderer() {
    let tree: Arc<dyn SourceTree> = Arc::new(tree_with_error());
    let session = Session::new(Arc::clone(&tree), names());
    let m = build_mirror(Some(tree.as_ref())).unwrap();
    assert_eq!(m.text(&session), "A");
    assert_eq!(m.children[0].text(&session), "A");
    assert_eq!(m.children[1].text(&session), "B");
    assert_eq!(m.children[1].children[0].text(&session), "C");
}

#[test]
fn find_walks_from_any_subtree() {
    let tree = tree_with_error();
    let m = build_mirror(Some(&tree)).unwrap();
    let c = NodePath::from_indices(vec![1, 0]);
    assert_eq!(m.find(&c).map(|n| &n.source), Some(&c));
    assert_eq!(m.children[1].find(&c).map(|n| &n.source), Some(&c));
    assert!(m.children[0].find(&c).is_none());
    assert!(m.find(&NodePath::from_indices(vec![3])).is_none());
}
