#![cfg(feature = "egui")]

use eframe::egui::{self, Color32, RichText};

use crate::inspector::{InspectorWindow, OutlineStyle};
use crate::mirror::MirrorNode;
use crate::path::NodePath;
use crate::session::Session;

fn entry_text(node: &MirrorNode, session: &Session, style: &OutlineStyle) -> RichText {
    let mut label = node.text(session);
    if style.show_icons {
        let icon = if node.is_leaf() { "🗋 " } else { "🗀 " };
        label.insert_str(0, icon);
    }
    let text = RichText::new(label);
    if node.error_in_subtree {
        let (r, g, b) = style.error_rgb;
        text.color(Color32::from_rgb(r, g, b))
    } else {
        text
    }
}

fn show_node(
    ui: &mut egui::Ui,
    node: &MirrorNode,
    session: &Session,
    style: &OutlineStyle,
    selected: Option<&NodePath>,
    id_salt: egui::Id,
    clicked: &mut Option<NodePath>,
) {
    let is_selected = selected == Some(&node.source);
    if node.is_leaf() {
        if ui
            .selectable_label(is_selected, entry_text(node, session, style))
            .clicked()
        {
            *clicked = Some(node.source.clone());
        }
        return;
    }
    let id = id_salt.with(&node.source);
    egui::collapsing_header::CollapsingState::load_with_default_open(ui.ctx(), id, node.source.is_root())
        .show_header(ui, |ui| {
            if ui
                .selectable_label(is_selected, entry_text(node, session, style))
                .clicked()
            {
                *clicked = Some(node.source.clone());
            }
        })
        .body(|ui| {
            for child in &node.children {
                show_node(ui, child, session, style, selected, id_salt, clicked);
            }
        });
}

/// Draw the outline of `window`'s mirror tree. Returns the node the user
/// clicked this frame, if any.
pub fn show_outline(ui: &mut egui::Ui, window: &InspectorWindow) -> Option<NodePath> {
    let state = window.state();
    let id_salt = egui::Id::new(("outline_tree", window.id()));
    let mut clicked = None;
    show_node(
        ui,
        &state.mirror,
        &state.session,
        &state.outline.style,
        state.outline.selected.as_ref(),
        id_salt,
        &mut clicked,
    );
    clicked
}
