//! Per-invocation inspector state.

use std::sync::Arc;

use crate::path::NodePath;
use crate::source::{RuleNames, SourceTree};

/// Scale applied to a freshly opened inspector.
pub const DEFAULT_SCALE: f32 = 1.5;

/// State of one inspector invocation. Owned by exactly one window; two
/// concurrent inspectors never share a session.
pub struct Session {
    root: Arc<dyn SourceTree>,
    rule_names: RuleNames,
    focused: NodePath,
    scale: f32,
    open: bool,
}

impl Session {
    pub fn new(root: Arc<dyn SourceTree>, rule_names: RuleNames) -> Self {
        Self {
            root,
            rule_names,
            focused: NodePath::root(),
            scale: DEFAULT_SCALE,
            open: false,
        }
    }

    /// Override the initial scale. Non-positive or non-finite values are ignored.
    pub fn with_scale(mut self, scale: f32) -> Self {
        if scale.is_finite() && scale > 0.0 {
            self.scale = scale;
        }
        self
    }

    pub fn root(&self) -> &Arc<dyn SourceTree> {
        &self.root
    }

    pub fn rule_names(&self) -> &RuleNames {
        &self.rule_names
    }

    pub fn focused(&self) -> &NodePath {
        &self.focused
    }

    /// Returns true when the focus actually changed.
    pub fn set_focused(&mut self, path: NodePath) -> bool {
        if self.focused == path {
            return false;
        }
        self.focused = path;
        true
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) -> bool {
        if self.scale == scale {
            return false;
        }
        self.scale = scale;
        true
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub(crate) fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    /// Text rendering function shared by the outline and the rendered view.
    pub fn node_text(&self, path: &NodePath) -> String {
        match path.resolve(self.root.as_ref()) {
            Some(node) => self.rule_names.text_for(&node.label()),
            None => String::from("<gone>"),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("focused", &self.focused)
            .field("scale", &self.scale)
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}
