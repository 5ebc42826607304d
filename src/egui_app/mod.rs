//! Egui front end for the inspector (feature = "egui").
//!
//! [`InspectorHost`] is the UI coordination thread: it drains the task queue
//! every frame and draws each open window with [`show_inspector`].

#![cfg(feature = "egui")]

mod host;
mod outline;
mod render;
mod state;
mod ui;

pub use host::{HostOptions, InspectorHost, WINDOW_SIZE, run_host, run_inspector};
pub use outline::show_outline;
pub use render::paint_layout;
pub use state::{SavePromptState, WindowUi};
pub use ui::{panel_id, show_inspector};
