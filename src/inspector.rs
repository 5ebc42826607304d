//! Inspection surfaces and the UI-thread registry that owns them.
//!
//! An [`InspectorWindow`] is everything one `open()` call builds: the session,
//! its mirror tree, the outline state, the rendered view and the controls
//! wiring. [`WindowSet`] lives on the UI coordination thread and is the only
//! place windows are created, mutated and dropped.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::MarshalingError;
use crate::mirror::{MirrorNode, build_mirror};
use crate::open::{Lifecycle, WindowHandle};
use crate::path::NodePath;
use crate::selection::{
    ButtonPressed, EventSource, ScaleChanged, SelectionChanged, on_scale_changed,
    on_selection_changed, slider_from_scale,
};
use crate::session::Session;
use crate::view::TreeView;

pub const WINDOW_TITLE: &str = "Parse Tree Inspector";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "inspector-{}", self.0)
    }
}

/// Styling of one outline instance. Never shared between windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineStyle {
    pub show_icons: bool,
    /// RGB used for entries whose subtree contains an error.
    pub error_rgb: (u8, u8, u8),
}

impl Default for OutlineStyle {
    fn default() -> Self {
        Self {
            show_icons: false,
            error_rgb: (208, 16, 16),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutlineState {
    /// Single selection: at most one node.
    pub selected: Option<NodePath>,
    pub style: OutlineStyle,
}

/// Mutable state of one window, touched only by event handlers.
pub struct InspectorState {
    pub session: Session,
    pub mirror: MirrorNode,
    pub view: TreeView,
    pub outline: OutlineState,
    pub slider_value: i32,
    pub close_requested: bool,
    pub export_requested: bool,
}

/// Event sources of the window's controls.
pub struct Wiring {
    pub outline: EventSource<SelectionChanged>,
    pub scale: EventSource<ScaleChanged>,
    pub buttons: EventSource<ButtonPressed>,
}

impl Wiring {
    pub fn standard() -> Self {
        let mut outline = EventSource::new("outline");
        outline.register("focus-subtree", on_selection_changed);
        let mut scale = EventSource::new("scale-slider");
        scale.register("rescale-view", on_scale_changed);
        let mut buttons = EventSource::new("buttons");
        buttons.register("dismiss", on_dismiss);
        buttons.register("export-png", on_export);
        Self {
            outline,
            scale,
            buttons,
        }
    }
}

fn on_dismiss(state: &mut InspectorState, event: &ButtonPressed) {
    if *event == ButtonPressed::Ok {
        state.close_requested = true;
    }
}

fn on_export(state: &mut InspectorState, event: &ButtonPressed) {
    if *event == ButtonPressed::Export {
        state.export_requested = true;
    }
}

pub struct InspectorWindow {
    id: WindowId,
    state: InspectorState,
    wiring: Wiring,
    lifecycle: Arc<Lifecycle>,
}

impl InspectorWindow {
    fn construct(
        id: WindowId,
        mut session: Session,
        lifecycle: Arc<Lifecycle>,
    ) -> Result<Self, MarshalingError> {
        let mirror = build_mirror(Some(session.root().as_ref()))
            .ok_or_else(|| MarshalingError::Construction("source tree has no root".into()))?;
        let view = TreeView::for_session(&session);
        let slider_value = slider_from_scale(session.scale());
        session.set_open(true);
        Ok(Self {
            id,
            state: InspectorState {
                session,
                mirror,
                view,
                outline: OutlineState::default(),
                slider_value,
                close_requested: false,
                export_requested: false,
            },
            wiring: Wiring::standard(),
            lifecycle,
        })
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn title(&self) -> &'static str {
        WINDOW_TITLE
    }

    pub fn state(&self) -> &InspectorState {
        &self.state
    }

    pub fn wiring(&self) -> &Wiring {
        &self.wiring
    }

    pub fn select(&mut self, node: NodePath) {
        self.wiring
            .outline
            .emit(&mut self.state, &SelectionChanged { node });
    }

    pub fn adjust_scale(&mut self, value: i32) {
        self.wiring
            .scale
            .emit(&mut self.state, &ScaleChanged { value });
    }

    pub fn press(&mut self, button: ButtonPressed) {
        self.wiring.buttons.emit(&mut self.state, &button);
    }

    /// Consume a pending export request raised by the "png" button.
    pub fn take_export_request(&mut self) -> bool {
        std::mem::take(&mut self.state.export_requested)
    }

    pub fn close_requested(&self) -> bool {
        self.state.close_requested
    }
}

/// All windows owned by the UI coordination thread.
#[derive(Default)]
pub struct WindowSet {
    windows: Vec<InspectorWindow>,
    next_id: u64,
}

impl WindowSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the surface for `session` and make it visible.
    pub fn open(&mut self, session: Session) -> Result<WindowHandle, MarshalingError> {
        self.next_id += 1;
        let id = WindowId(self.next_id);
        let lifecycle = Arc::new(Lifecycle::default());
        let window = InspectorWindow::construct(id, session, Arc::clone(&lifecycle))?;
        self.windows.push(window);
        lifecycle.mark_shown();
        info!(window = %id, "inspector shown");
        Ok(WindowHandle::new(id, lifecycle))
    }

    /// Hide and drop the window. Returns false when `id` is not open.
    pub fn close(&mut self, id: WindowId) -> bool {
        let Some(pos) = self.windows.iter().position(|w| w.id == id) else {
            warn!(window = %id, "close requested for unknown window");
            return false;
        };
        let mut window = self.windows.remove(pos);
        window.state.session.set_open(false);
        window.lifecycle.mark_closed();
        info!(window = %id, "inspector closed");
        true
    }

    /// Close every window whose "OK" button was pressed.
    pub fn close_dismissed(&mut self) -> Vec<WindowId> {
        let ids: Vec<WindowId> = self
            .windows
            .iter()
            .filter(|w| w.close_requested())
            .map(|w| w.id)
            .collect();
        for id in &ids {
            self.close(*id);
        }
        ids
    }

    /// Close everything, e.g. when the UI thread shuts down.
    pub fn close_all(&mut self) {
        let ids: Vec<WindowId> = self.windows.iter().map(|w| w.id).collect();
        for id in ids {
            self.close(id);
        }
    }

    pub fn get(&self, id: WindowId) -> Option<&InspectorWindow> {
        self.windows.iter().find(|w| w.id == id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut InspectorWindow> {
        self.windows.iter_mut().find(|w| w.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &InspectorWindow> {
        self.windows.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut InspectorWindow> {
        self.windows.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl Drop for WindowSet {
    fn drop(&mut self) {
        self.close_all();
    }
}
