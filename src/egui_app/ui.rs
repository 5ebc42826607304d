#![cfg(feature = "egui")]

use eframe::egui::{self, Color32, RichText};

use crate::export::{ExportOutcome, NotificationKind, PendingExport};
use crate::inspector::{InspectorWindow, WindowId};
use crate::selection::{ButtonPressed, SLIDER_MAX, SLIDER_MIN};

use super::outline::show_outline;
use super::render::paint_layout;
use super::state::{SavePromptState, WindowUi};

/// Outline panel width: one third of the initial 600 px window.
const OUTLINE_WIDTH: f32 = 200.0;

/// Id of a panel inside one inspector. Panel ids are global to the egui
/// context, so each window gets its own.
pub fn panel_id(window: WindowId, name: &'static str) -> egui::Id {
    egui::Id::new((name, window))
}

/// Draw one inspector window into `ui` and feed user input back through the
/// window's controls.
pub fn show_inspector(ui: &mut egui::Ui, window: &mut InspectorWindow, wui: &mut WindowUi) {
    let modal = wui.is_modal();

    egui::TopBottomPanel::bottom(panel_id(window.id(), "controls")).show_inside(ui, |ui| {
        ui.add_enabled_ui(!modal, |ui| {
            let mut value = window.state().slider_value;
            let slider = ui.add(
                egui::Slider::new(&mut value, SLIDER_MIN..=SLIDER_MAX)
                    .show_value(false)
                    .text(format!("scale {:.3}", window.state().view.scale())),
            );
            if slider.changed() {
                window.adjust_scale(value);
            }
            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    window.press(ButtonPressed::Ok);
                }
                if ui.button("png").clicked() {
                    window.press(ButtonPressed::Export);
                }
            });
        });
    });

    egui::SidePanel::left(panel_id(window.id(), "outline"))
        .resizable(true)
        .default_width(OUTLINE_WIDTH)
        .show_inside(ui, |ui| {
            egui::ScrollArea::both()
                .id_salt("outline_scroll")
                .show(ui, |ui| {
                    ui.add_enabled_ui(!modal, |ui| {
                        if let Some(path) = show_outline(ui, window) {
                            window.select(path);
                        }
                    });
                });
        });

    let canvas_click = egui::CentralPanel::default()
        .frame(egui::Frame::NONE.fill(Color32::WHITE))
        .show_inside(ui, |ui| {
            egui::ScrollArea::both()
                .id_salt("view_scroll")
                .show(ui, |ui| {
                    let view = &window.state().view;
                    paint_layout(ui, view.layout(), view.scale())
                })
                .inner
        })
        .inner;
    if let Some(path) = canvas_click.filter(|_| !modal) {
        window.select(path);
    }

    if window.take_export_request() {
        match PendingExport::begin(&window.state().view) {
            Ok(pending) => wui.save_prompt = Some(SavePromptState::new(pending)),
            Err(e) => {
                if let Some(n) = ExportOutcome::Failed(e).notification() {
                    wui.notifications.push(n);
                }
            }
        }
    }

    show_save_prompt(ui.ctx(), wui);
    show_notification(ui.ctx(), wui);
}

enum PromptAnswer {
    Save,
    Cancel,
}

fn show_save_prompt(ctx: &egui::Context, wui: &mut WindowUi) {
    let Some(prompt) = &mut wui.save_prompt else {
        return;
    };
    let mut answer = None;
    egui::Window::new("Save PNG")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(RichText::new("File name").strong());
            let edit = ui.add(
                egui::TextEdit::singleline(&mut prompt.path_text)
                    .desired_width(360.0)
                    .hint_text("parse_tree.png"),
            );
            if edit.changed() {
                prompt.confirm_overwrite = false;
            }
            ui.label(RichText::new("PNG Files (*.png)").weak());
            let target = prompt.chosen_path();
            let exists = target.as_ref().is_some_and(|p| p.exists());
            if exists && prompt.confirm_overwrite {
                ui.colored_label(Color32::from_rgb(200, 120, 0), "File exists. Overwrite?");
            }
            ui.horizontal(|ui| {
                let save_label = if exists && prompt.confirm_overwrite {
                    "Overwrite"
                } else {
                    "Save"
                };
                if ui
                    .add_enabled(target.is_some(), egui::Button::new(save_label))
                    .clicked()
                {
                    if exists && !prompt.confirm_overwrite {
                        prompt.confirm_overwrite = true;
                    } else {
                        answer = Some(PromptAnswer::Save);
                    }
                }
                if ui.button("Cancel").clicked() {
                    answer = Some(PromptAnswer::Cancel);
                }
            });
        });

    let Some(answer) = answer else {
        return;
    };
    let Some(prompt) = wui.save_prompt.take() else {
        return;
    };
    let choice = match answer {
        PromptAnswer::Save => prompt.chosen_path(),
        PromptAnswer::Cancel => None,
    };
    let outcome = prompt.pending.finish(choice, wui.revealer.as_ref());
    if let Some(n) = outcome.notification() {
        wui.notifications.push(n);
    }
}

fn show_notification(ctx: &egui::Context, wui: &mut WindowUi) {
    let Some(n) = wui.notifications.first() else {
        return;
    };
    let mut dismissed = false;
    egui::Window::new(n.title.as_str())
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            match n.kind {
                NotificationKind::Error => ui.colored_label(Color32::RED, &n.message),
                NotificationKind::Info => ui.label(&n.message),
            };
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });
    if dismissed {
        wui.notifications.remove(0);
    }
}
