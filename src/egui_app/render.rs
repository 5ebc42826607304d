#![cfg(feature = "egui")]

use eframe::egui::{self, Align2, Color32, Pos2, Rect, Sense, Stroke, Vec2};

use crate::layout::{RectF, TreeLayout, Vec2f};
use crate::path::NodePath;

const EDGE_COLOR: Color32 = Color32::from_rgb(64, 64, 64);
const NODE_FILL: Color32 = Color32::from_rgb(244, 244, 244);
const NODE_STROKE: Color32 = Color32::from_rgb(168, 168, 168);
const ERROR_TEXT: Color32 = Color32::from_rgb(208, 16, 16);

fn to_screen(origin: Pos2, r: RectF) -> Rect {
    Rect::from_min_max(
        Pos2::new(origin.x + r.min.x, origin.y + r.min.y),
        Pos2::new(origin.x + r.max.x, origin.y + r.max.y),
    )
}

/// Paint `layout` into a freshly allocated area of exactly its size and
/// return the node clicked this frame, if any.
///
/// Uses the same geometry as the PNG export; only the text is drawn with
/// egui's own font.
pub fn paint_layout(ui: &mut egui::Ui, layout: &TreeLayout, scale: f32) -> Option<NodePath> {
    let size = Vec2::new(layout.size.x.ceil(), layout.size.y.ceil());
    let (response, painter) = ui.allocate_painter(size, Sense::click());
    let origin = response.rect.min;
    painter.rect_filled(response.rect, 0.0, Color32::WHITE);

    let stroke_w = scale.max(0.1);
    for (parent, child) in layout.edges() {
        let p = to_screen(origin, parent);
        let c = to_screen(origin, child);
        painter.line_segment(
            [Pos2::new(p.center().x, p.bottom()), Pos2::new(c.center().x, c.top())],
            Stroke::new(stroke_w, EDGE_COLOR),
        );
    }
    let font = egui::FontId::proportional(layout.font_size.max(1.0));
    for n in &layout.nodes {
        let r = to_screen(origin, n.rect);
        painter.rect_filled(r, 0.0, NODE_FILL);
        painter.rect_stroke(
            r,
            0.0,
            Stroke::new(stroke_w * 0.5, NODE_STROKE),
            egui::StrokeKind::Inside,
        );
        let color = if n.flagged { ERROR_TEXT } else { Color32::BLACK };
        painter.text(r.center(), Align2::CENTER_CENTER, &n.text, font.clone(), color);
    }

    if !response.clicked() {
        return None;
    }
    let pos = response.interact_pointer_pos()?;
    layout
        .node_at(Vec2f::new(pos.x - origin.x, pos.y - origin.y))
        .map(|n| n.path.clone())
}
