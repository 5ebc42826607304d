#![cfg(feature = "egui")]

use std::collections::HashMap;
use std::thread;

use anyhow::Context as _;
use eframe::egui::{self, ViewportBuilder, ViewportClass, ViewportCommand, ViewportId};
use tracing::{debug, info};

use crate::inspector::{InspectorWindow, WindowId, WindowSet, WINDOW_TITLE};
use crate::open::{self, UiQueue, ui_channel};
use crate::session::Session;

use super::state::WindowUi;
use super::ui::show_inspector;

pub const WINDOW_SIZE: [f32; 2] = [600.0, 500.0];

#[derive(Debug, Clone, Copy)]
pub struct HostOptions {
    /// Quit the event loop once the last inspector has been closed.
    pub exit_when_idle: bool,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            exit_when_idle: true,
        }
    }
}

/// eframe application acting as the UI coordination thread.
///
/// The first open inspector is drawn in the root viewport, every further one
/// in its own native viewport.
pub struct InspectorHost {
    queue: UiQueue,
    windows: WindowSet,
    ui: HashMap<WindowId, WindowUi>,
    options: HostOptions,
    seen_window: bool,
}

impl InspectorHost {
    pub fn new(queue: UiQueue, options: HostOptions) -> Self {
        Self {
            queue,
            windows: WindowSet::new(),
            ui: HashMap::new(),
            options,
            seen_window: false,
        }
    }

    fn show_root(&mut self, ctx: &egui::Context, window: Option<WindowId>) {
        let Some(id) = window else {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui| ui.label("No inspector open"));
            });
            return;
        };
        let Some(w) = self.windows.get_mut(id) else {
            return;
        };
        let wui = self.ui.entry(id).or_default();
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| show_inspector(ui, w, wui));
        if ctx.input(|i| i.viewport().close_requested()) {
            if self.windows.len() > 1 {
                ctx.send_viewport_cmd(ViewportCommand::CancelClose);
            }
            self.windows.close(id);
        }
    }
}

fn show_detached(ctx: &egui::Context, window: &mut InspectorWindow, wui: &mut WindowUi) -> bool {
    let id = window.id();
    let builder = ViewportBuilder::default()
        .with_title(format!("{} ({})", window.title(), id))
        .with_inner_size(WINDOW_SIZE);
    ctx.show_viewport_immediate(
        ViewportId::from_hash_of(id),
        builder,
        |ctx, class| match class {
            ViewportClass::Embedded => {
                let mut open = true;
                egui::Window::new(window.title())
                    .id(egui::Id::new(id))
                    .open(&mut open)
                    .default_size(WINDOW_SIZE)
                    .show(ctx, |ui| show_inspector(ui, window, wui));
                !open
            }
            _ => {
                egui::CentralPanel::default()
                    .frame(egui::Frame::NONE)
                    .show(ctx, |ui| show_inspector(ui, window, wui));
                ctx.input(|i| i.viewport().close_requested())
            }
        },
    )
}

impl eframe::App for InspectorHost {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let drained = self.queue.run_pending(&mut self.windows);
        if drained.ran > 0 {
            debug!(tasks = drained.ran, "ran UI tasks");
        }
        if drained.shutdown {
            self.windows.close_all();
            ctx.send_viewport_cmd(ViewportCommand::Close);
            return;
        }
        if !self.windows.is_empty() {
            self.seen_window = true;
        }

        let mut ids = self.windows.iter().map(|w| w.id());
        let root = ids.next();
        let detached: Vec<WindowId> = ids.collect();

        self.show_root(ctx, root);
        let mut os_closed = Vec::new();
        for id in detached {
            let Some(window) = self.windows.get_mut(id) else {
                continue;
            };
            let wui = self.ui.entry(id).or_default();
            if show_detached(ctx, window, wui) {
                os_closed.push(id);
            }
        }
        for id in os_closed {
            self.windows.close(id);
        }
        self.windows.close_dismissed();
        self.ui.retain(|id, _| self.windows.get(*id).is_some());

        if self.options.exit_when_idle && self.seen_window && self.windows.is_empty() {
            info!("last inspector closed, leaving event loop");
            ctx.send_viewport_cmd(ViewportCommand::Close);
        }
    }
}

/// Run the eframe event loop on the current thread, serving `queue`.
pub fn run_host(queue: UiQueue, options: HostOptions) -> anyhow::Result<()> {
    let native = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size(WINDOW_SIZE),
        ..Default::default()
    };
    eframe::run_native(
        WINDOW_TITLE,
        native,
        Box::new(move |cc| {
            let egui_ctx = cc.egui_ctx.clone();
            queue.set_waker(move || egui_ctx.request_repaint());
            Ok(Box::new(InspectorHost::new(queue, options)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

/// Open one inspector for `session` and block until it is closed.
///
/// The event loop has to own the main thread on most platforms, so the
/// opening side runs on a helper thread and talks to it like any other caller.
pub fn run_inspector(session: Session) -> anyhow::Result<()> {
    let (dispatcher, queue) = ui_channel();
    let caller = thread::Builder::new()
        .name("inspector-caller".into())
        .spawn(move || open::open_until_closed(&dispatcher, session))
        .context("spawn inspector caller thread")?;

    let hosted = run_host(queue, HostOptions::default());
    match caller.join() {
        Ok(result) => hosted.and(result.map_err(anyhow::Error::from)),
        Err(_) => hosted.and(Err(anyhow::anyhow!("inspector caller thread panicked"))),
    }
}
