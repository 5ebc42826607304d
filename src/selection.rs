//! Coupling between the outline view and the rendered view.
//!
//! Every control of an inspector window owns a typed [`EventSource`]. Handlers
//! are plain functions registered by name; they read the event payload,
//! mutate the window's [`InspectorState`] and refresh the rendered view once.
//! All handlers run on the UI coordination thread and are idempotent.

use std::fmt::Debug;

use tracing::{trace, warn};

use crate::inspector::InspectorState;
use crate::path::NodePath;

pub const SLIDER_MIN: i32 = -999;
pub const SLIDER_MAX: i32 = 1000;

/// Map a raw slider value to a view scale: `v / 1000 + 1`.
/// Values outside the slider range are clamped first.
pub fn scale_from_slider(value: i32) -> f32 {
    let v = value.clamp(SLIDER_MIN, SLIDER_MAX);
    v as f32 / 1000.0 + 1.0
}

/// Inverse of [`scale_from_slider`], truncating toward zero.
pub fn slider_from_scale(scale: f32) -> i32 {
    (((scale - 1.0) * 1000.0) as i32).clamp(SLIDER_MIN, SLIDER_MAX)
}

/// The outline selection moved to the node mirroring `node`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChanged {
    pub node: NodePath,
}

/// The scale slider reports a new raw value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleChanged {
    pub value: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonPressed {
    Ok,
    Export,
}

pub type Handler<E> = fn(&mut InspectorState, &E);

/// Named handler registrations for one control.
pub struct EventSource<E> {
    control: &'static str,
    handlers: Vec<(&'static str, Handler<E>)>,
}

impl<E: Debug> EventSource<E> {
    pub fn new(control: &'static str) -> Self {
        Self {
            control,
            handlers: Vec::new(),
        }
    }

    pub fn register(&mut self, name: &'static str, handler: Handler<E>) {
        self.handlers.push((name, handler));
    }

    pub fn handler_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.iter().map(|(n, _)| *n)
    }

    /// Deliver `event` to every registered handler in registration order.
    pub fn emit(&self, state: &mut InspectorState, event: &E) {
        for (name, handler) in &self.handlers {
            trace!(control = self.control, handler = name, ?event, "dispatch");
            handler(state, event);
        }
    }
}

/// Re-root the rendered view on the selected node.
pub fn on_selection_changed(state: &mut InspectorState, event: &SelectionChanged) {
    if state.mirror.find(&event.node).is_none() {
        warn!(node = %event.node, "selection does not name a node of this tree");
        return;
    }
    state.outline.selected = Some(event.node.clone());
    if state.session.set_focused(event.node.clone()) {
        state.view.set_tree(event.node.clone());
    }
}

/// Apply the slider value as the new view scale.
pub fn on_scale_changed(state: &mut InspectorState, event: &ScaleChanged) {
    let value = event.value.clamp(SLIDER_MIN, SLIDER_MAX);
    state.slider_value = value;
    let scale = scale_from_slider(value);
    if state.session.set_scale(scale) {
        state.view.set_scale(scale);
    }
}
