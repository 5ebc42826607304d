//! The rendered (graphical) tree view.
//!
//! [`TreeView`] owns the cached layout of the focused subtree. Changing the
//! scale or the focused subtree recomputes the layout; painting only consumes
//! it. Painting goes through an SVG scene rendered by resvg so exports get
//! real text rendering with the system fonts.

use std::fmt::Write as _;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;
use tracing::debug;

use crate::error::RenderError;
use crate::layout::{self, ApproxMeasurer, Config, TreeLayout};
use crate::path::NodePath;
use crate::session::Session;
use crate::source::{RuleNames, SourceTree};

pub const BACKGROUND: &str = "#ffffff";
pub const NODE_FILL: &str = "#f4f4f4";
pub const NODE_STROKE: &str = "#a8a8a8";
pub const EDGE_STROKE: &str = "#404040";
pub const TEXT_COLOR: &str = "#000000";
pub const ERROR_TEXT_COLOR: &str = "#d01010";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

/// What the exporter needs from a view: its pixel bounds and a way to paint
/// its current state onto a bitmap of exactly those bounds.
pub trait RenderableView {
    fn size(&self) -> PixelSize;
    fn paint(&self, surface: &mut Pixmap) -> Result<(), RenderError>;
}

pub struct TreeView {
    root: Arc<dyn SourceTree>,
    rule_names: RuleNames,
    focus: NodePath,
    scale: f32,
    layout: TreeLayout,
}

impl TreeView {
    pub fn new(root: Arc<dyn SourceTree>, rule_names: RuleNames, scale: f32) -> Self {
        let mut view = Self {
            root,
            rule_names,
            focus: NodePath::root(),
            scale,
            layout: TreeLayout::empty(),
        };
        view.relayout();
        view
    }

    /// View showing the session's focused subtree at the session's scale.
    pub fn for_session(session: &Session) -> Self {
        let mut view = Self::new(
            Arc::clone(session.root()),
            session.rule_names().clone(),
            session.scale(),
        );
        view.set_tree(session.focused().clone());
        view
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        if self.scale != scale {
            self.scale = scale;
            self.relayout();
        }
    }

    pub fn tree(&self) -> &NodePath {
        &self.focus
    }

    /// Re-root the view on another subtree.
    pub fn set_tree(&mut self, focus: NodePath) {
        if self.focus != focus {
            self.focus = focus;
            self.relayout();
        }
    }

    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    fn relayout(&mut self) {
        self.layout = layout::layout_tree(
            self.root.as_ref(),
            &self.focus,
            &self.rule_names,
            &ApproxMeasurer,
            Config::scaled(self.scale),
        );
        debug!(
            focus = %self.focus,
            scale = self.scale,
            nodes = self.layout.nodes.len(),
            "relayout"
        );
    }

    /// SVG scene of the current layout.
    pub fn to_svg(&self) -> String {
        let size = self.size();
        let l = &self.layout;
        let stroke_w = self.scale.max(0.1);
        let mut s = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(
            s,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = size.width,
            h = size.height
        );
        let _ = writeln!(s, r#"<rect width="{}" height="{}" fill="{}"/>"#, size.width, size.height, BACKGROUND);
        for (parent, child) in l.edges() {
            let (p, c) = (parent.center(), child.center());
            let _ = writeln!(
                s,
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.2}"/>"#,
                p.x, parent.max.y, c.x, child.min.y, EDGE_STROKE, stroke_w
            );
        }
        for n in &l.nodes {
            let r = n.rect;
            let _ = writeln!(
                s,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke="{}" stroke-width="{:.2}"/>"#,
                r.min.x,
                r.min.y,
                r.width(),
                r.height(),
                NODE_FILL,
                NODE_STROKE,
                stroke_w * 0.5
            );
            let color = if n.flagged { ERROR_TEXT_COLOR } else { TEXT_COLOR };
            let baseline = r.min.y + (r.height() + l.font_size * 0.7) * 0.5;
            let _ = writeln!(
                s,
                r#"<text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="{:.2}" text-anchor="middle" fill="{}">{}</text>"#,
                r.center().x,
                baseline,
                l.font_size,
                color,
                html_escape::encode_text(&n.text)
            );
        }
        s.push_str("</svg>\n");
        s
    }
}

impl RenderableView for TreeView {
    fn size(&self) -> PixelSize {
        PixelSize {
            width: self.layout.size.x.ceil().max(0.0) as u32,
            height: self.layout.size.y.ceil().max(0.0) as u32,
        }
    }

    fn paint(&self, surface: &mut Pixmap) -> Result<(), RenderError> {
        let size = self.size();
        if surface.width() != size.width || surface.height() != size.height {
            return Err(RenderError::SurfaceSize {
                expected_w: size.width,
                expected_h: size.height,
                actual_w: surface.width(),
                actual_h: surface.height(),
            });
        }
        let mut opt = usvg::Options::default();
        opt.fontdb = Arc::clone(system_fonts());
        let tree = usvg::Tree::from_str(&self.to_svg(), &opt)
            .map_err(|e| RenderError::Scene(e.to_string()))?;
        resvg::render(&tree, Transform::identity(), &mut surface.as_mut());
        Ok(())
    }
}

/// System font database, loaded once per process.
fn system_fonts() -> &'static Arc<usvg::fontdb::Database> {
    static FONTS: OnceCell<Arc<usvg::fontdb::Database>> = OnceCell::new();
    FONTS.get_or_init(|| {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        debug!(faces = db.len(), "loaded system fonts");
        Arc::new(db)
    })
}
