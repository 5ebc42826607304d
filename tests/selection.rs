use std::sync::Arc;

use parsetree_inspector::inspector::{WINDOW_TITLE, WindowSet};
use parsetree_inspector::selection::{
    ButtonPressed, SLIDER_MAX, SLIDER_MIN, scale_from_slider, slider_from_scale,
};
use parsetree_inspector::session::DEFAULT_SCALE;
use parsetree_inspector::{NodePath, ParseTree, RuleNames, Session, SourceTree};

fn session() -> Session {
    let tree = ParseTree::rule(
        0,
        vec![
            ParseTree::token("A"),
            ParseTree::rule(1, vec![ParseTree::error("C")]),
        ],
    );
    let root: Arc<dyn SourceTree> = Arc::new(tree);
    Session::new(root, RuleNames::new(vec!["root".into(), "B".into()]))
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn slider_mapping() {
    assert!(close(scale_from_slider(-999), 0.001));
    assert!(close(scale_from_slider(0), 1.0));
    assert!(close(scale_from_slider(1000), 2.0));
    assert!(close(scale_from_slider(-5000), 0.001), "clamped low");
    assert!(close(scale_from_slider(5000), 2.0), "clamped high");
    assert_eq!(slider_from_scale(DEFAULT_SCALE), 500);
    assert_eq!(slider_from_scale(1.0), 0);
    assert_eq!(slider_from_scale(10.0), SLIDER_MAX);
    assert_eq!(slider_from_scale(0.0), SLIDER_MIN);
}

#[test]
fn new_window_starts_unfocused_at_default_scale() {
    let mut windows = WindowSet::new();
    let handle = windows.open(session()).unwrap();
    assert!(handle.is_visible());
    let w = windows.get(handle.id()).unwrap();
    assert_eq!(w.title(), WINDOW_TITLE);
    let state = w.state();
    assert_eq!(state.slider_value, 500);
    assert!(close(state.view.scale(), 1.5));
    assert_eq!(state.session.focused(), &NodePath::root());
    assert!(state.session.is_open());
    assert!(state.outline.selected.is_none());
    assert!(!state.outline.style.show_icons);
}

#[test]
fn selecting_a_node_refocuses_the_view() {
    let mut windows = WindowSet::new();
    let id = windows.open(session()).unwrap().id();
    let w = windows.get_mut(id).unwrap();
    let full_nodes = w.state().view.layout().nodes.len();

    let b = NodePath::from_indices(vec![1]);
    w.select(b.clone());
    let state = w.state();
    assert_eq!(state.session.focused(), &b);
    assert_eq!(state.view.tree(), &b);
    assert_eq!(state.outline.selected.as_ref(), Some(&b));
    assert_eq!(state.view.layout().nodes.len(), 2);
    assert!(full_nodes > 2);

    // Selecting the same node again changes nothing.
    let before = w.state().view.layout().clone();
    w.select(b.clone());
    assert_eq!(w.state().view.layout(), &before);
    assert_eq!(w.state().session.focused(), &b);
}

#[test]
fn selection_outside_the_tree_is_ignored() {
    let mut windows = WindowSet::new();
    let id = windows.open(session()).unwrap().id();
    let w = windows.get_mut(id).unwrap();
    w.select(NodePath::from_indices(vec![9, 9]));
    assert_eq!(w.state().session.focused(), &NodePath::root());
    assert!(w.state().outline.selected.is_none());
}

#[test]
fn slider_rescales_view() {
    let mut windows = WindowSet::new();
    let id = windows.open(session()).unwrap().id();
    let w = windows.get_mut(id).unwrap();

    w.adjust_scale(0);
    assert!(close(w.state().view.scale(), 1.0));
    assert!(close(w.state().session.scale(), 1.0));
    let one = w.state().view.layout().size;

    w.adjust_scale(1000);
    assert!(close(w.state().view.scale(), 2.0));
    let two = w.state().view.layout().size;
    assert!((two.x - 2.0 * one.x).abs() < 1e-3);
    assert!((two.y - 2.0 * one.y).abs() < 1e-3);

    w.adjust_scale(-999);
    assert!(close(w.state().view.scale(), 0.001));

    w.adjust_scale(4000);
    assert_eq!(w.state().slider_value, SLIDER_MAX);
    assert!(close(w.state().view.scale(), 2.0));
}

#[test]
fn buttons_close_or_request_export() {
    let mut windows = WindowSet::new();
    let id = windows.open(session()).unwrap().id();
    {
        let w = windows.get_mut(id).unwrap();
        w.press(ButtonPressed::Export);
        assert!(w.take_export_request());
        assert!(!w.take_export_request(), "request is consumed");
        assert!(!w.close_requested());
        w.press(ButtonPressed::Ok);
        assert!(w.close_requested());
    }
    assert_eq!(windows.close_dismissed(), vec![id]);
    assert!(windows.is_empty());
}

#[test]
fn standard_wiring_names() {
    let mut windows = WindowSet::new();
    let id = windows.open(session()).unwrap().id();
    let wiring = windows.get(id).unwrap().wiring();
    assert_eq!(wiring.outline.handler_names().collect::<Vec<_>>(), vec!["focus-subtree"]);
    assert_eq!(wiring.scale.handler_names().collect::<Vec<_>>(), vec!["rescale-view"]);
    assert_eq!(
        wiring.buttons.handler_names().collect::<Vec<_>>(),
        vec!["dismiss", "export-png"]
    );
}

#[test]
fn windows_do_not_share_state() {
    let mut windows = WindowSet::new();
    let a = windows.open(session()).unwrap().id();
    let b = windows.open(session()).unwrap().id();
    assert_ne!(a, b);
    windows.get_mut(a).unwrap().select(NodePath::from_indices(vec![1]));
    windows.get_mut(a).unwrap().adjust_scale(0);
    let other = windows.get(b).unwrap().state();
    assert_eq!(other.session.focused(), &NodePath::root());
    assert_eq!(other.slider_value, 500);
}

#[test]
fn closing_marks_handle_closed() {
    let mut windows = WindowSet::new();
    let handle = windows.open(session()).unwrap();
    assert!(!handle.is_closed());
    assert!(windows.close(handle.id()));
    assert!(handle.is_closed());
    assert!(!windows.close(handle.id()), "already gone");
}
