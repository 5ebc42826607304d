#![cfg(feature = "egui")]

use std::path::PathBuf;

use crate::export::{FolderRevealer, Notification, PendingExport, SystemRevealer};

/// The save prompt of an export in progress.
pub struct SavePromptState {
    pub pending: PendingExport,
    pub path_text: String,
    /// Set once the user was warned that the target already exists.
    pub confirm_overwrite: bool,
}

impl SavePromptState {
    pub fn new(pending: PendingExport) -> Self {
        let path_text = pending.suggested_path().display().to_string();
        Self {
            pending,
            path_text,
            confirm_overwrite: false,
        }
    }

    pub fn chosen_path(&self) -> Option<PathBuf> {
        let t = self.path_text.trim();
        if t.is_empty() {
            None
        } else {
            Some(PathBuf::from(t))
        }
    }
}

/// Egui-side state of one inspector window that the core does not model:
/// modal dialogs and the revealer used after a successful export.
pub struct WindowUi {
    pub save_prompt: Option<SavePromptState>,
    pub notifications: Vec<Notification>,
    pub revealer: Box<dyn FolderRevealer>,
}

impl Default for WindowUi {
    fn default() -> Self {
        Self {
            save_prompt: None,
            notifications: Vec::new(),
            revealer: Box::new(SystemRevealer),
        }
    }
}

impl WindowUi {
    pub fn is_modal(&self) -> bool {
        self.save_prompt.is_some() || !self.notifications.is_empty()
    }
}
