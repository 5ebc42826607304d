use parsetree_inspector::layout::*;
use parsetree_inspector::{NodePath, ParseTree, RuleNames};

struct FixedMeasurer(f32, f32);
impl Measurer for FixedMeasurer {
    fn measure(&self, _text: &str, _font_size: f32) -> (f32, f32) {
        (self.0, self.1)
    }
}

fn tree() -> ParseTree {
    ParseTree::rule(
        0,
        vec![
            ParseTree::token("left"),
            ParseTree::rule(1, vec![ParseTree::token("a"), ParseTree::error("b")]),
        ],
    )
}

fn names() -> RuleNames {
    RuleNames::new(vec!["expr".into(), "term".into()])
}

#[test]
fn parents_sit_above_and_centered_over_children() {
    let t = tree();
    let l = layout_tree(&t, &NodePath::root(), &names(), &FixedMeasurer(20.0, 10.0), Config::default());
    assert_eq!(l.nodes.len(), 5);
    let root = &l.nodes[0];
    assert_eq!(root.path, NodePath::root());
    assert_eq!(root.parent, None);
    let kids: Vec<&LaidOutNode> = l.nodes.iter().filter(|n| n.parent == Some(0)).collect();
    assert_eq!(kids.len(), 2);
    for k in &kids {
        assert!(k.rect.min.y > root.rect.max.y, "child row below parent");
    }
    assert!(kids[0].rect.max.x <= kids[1].rect.min.x, "siblings in index order without overlap");
    let cx = root.rect.center().x;
    assert!(cx >= kids[0].rect.min.x && cx <= kids[1].rect.max.x);
    assert_eq!(l.edges().count(), 4);
}

#[test]
fn no_two_boxes_overlap() {
    let t = tree();
    let l = layout_tree(&t, &NodePath::root(), &names(), &ApproxMeasurer, Config::default());
    for (i, a) in l.nodes.iter().enumerate() {
        for b in &l.nodes[i + 1..] {
            let apart = a.rect.max.x <= b.rect.min.x
                || b.rect.max.x <= a.rect.min.x
                || a.rect.max.y <= b.rect.min.y
                || b.rect.max.y <= a.rect.min.y;
            assert!(apart, "{} overlaps {}", a.text, b.text);
        }
        assert!(a.rect.max.x <= l.size.x && a.rect.max.y <= l.size.y);
    }
}

#[test]
fn only_error_nodes_are_flagged() {
    let t = tree();
    let l = layout_tree(&t, &NodePath::root(), &names(), &ApproxMeasurer, Config::default());
    let flagged: Vec<&str> = l.nodes.iter().filter(|n| n.flagged).map(|n| n.text.as_str()).collect();
    assert_eq!(flagged, vec!["b"]);
}

#[test]
fn scale_is_linear() {
    let t = tree();
    let one = layout_tree(&t, &NodePath::root(), &names(), &ApproxMeasurer, Config::scaled(1.0));
    let two = layout_tree(&t, &NodePath::root(), &names(), &ApproxMeasurer, Config::scaled(2.0));
    assert!((two.size.x - 2.0 * one.size.x).abs() < 1e-3);
    assert!((two.size.y - 2.0 * one.size.y).abs() < 1e-3);
    assert!((two.font_size - 22.0).abs() < 1e-6);
}

#[test]
fn focused_subtree_is_smaller() {
    let t = tree();
    let full = layout_tree(&t, &NodePath::root(), &names(), &ApproxMeasurer, Config::default());
    let sub = layout_tree(&t, &NodePath::from_indices(vec![1]), &names(), &ApproxMeasurer, Config::default());
    assert_eq!(sub.nodes.len(), 3);
    assert_eq!(sub.nodes[0].text, "term");
    assert_eq!(sub.nodes[0].path, NodePath::from_indices(vec![1]));
    assert!(sub.size.y < full.size.y);
    assert!(sub.size.x <= full.size.x);
}

#[test]
fn unresolvable_focus_gives_empty_layout() {
    let t = tree();
    let l = layout_tree(&t, &NodePath::from_indices(vec![7]), &names(), &ApproxMeasurer, Config::default());
    assert!(l.nodes.is_empty());
    assert_eq!(l.size, Vec2f::new(0.0, 0.0));
}

#[test]
fn node_at_hits_box() {
    let t = tree();
    let l = layout_tree(&t, &NodePath::root(), &names(), &ApproxMeasurer, Config::default());
    let c = l.nodes[2].rect.center();
    assert_eq!(l.node_at(c).map(|n| n.text.as_str()), Some("term"));
    assert!(l.node_at(Vec2f::new(-5.0, -5.0)).is_none());
}
