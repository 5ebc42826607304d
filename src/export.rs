//! PNG export of the rendered view.
//!
//! Export runs in two steps so an immediate-mode UI can show its save prompt
//! across frames: [`PendingExport::begin`] rasterizes the view and picks a
//! default file name, [`PendingExport::finish`] writes the file once the user
//! answered. [`trigger_export`] chains both for callers with a blocking prompt.
//!
//! Only the save prompt can cancel an export. Write failures become error
//! notifications; a failure to reveal the folder afterwards is downgraded to
//! an informational notice naming the saved file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use resvg::tiny_skia::Pixmap;
use tracing::{error, info, warn};

use crate::error::{ExportIoError, RevealFolderError};
use crate::view::{PixelSize, RenderableView};

pub const DEFAULT_BASE_NAME: &str = "parse_tree";
pub const DEFAULT_EXTENSION: &str = "png";

/// First of `base.ext`, `base_1.ext`, `base_2.ext`, … that does not exist in `dir`.
/// Only checks for existence; nothing is created.
pub fn next_free_path(dir: &Path, base: &str, ext: &str) -> PathBuf {
    let mut candidate = dir.join(format!("{base}.{ext}"));
    let mut counter: u64 = 1;
    while candidate.exists() {
        candidate = dir.join(format!("{base}_{counter}.{ext}"));
        counter += 1;
    }
    candidate
}

/// Default export target in the process working directory.
pub fn default_export_path() -> PathBuf {
    let dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    next_free_path(&dir, DEFAULT_BASE_NAME, DEFAULT_EXTENSION)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}

/// Asks the user where to save. `None` means cancelled.
pub trait SavePrompt {
    fn prompt(&mut self, suggested: &Path) -> Option<PathBuf>;
}

/// Shows a modal message to the user.
pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

/// Opens a folder in the platform file manager.
pub trait FolderRevealer {
    fn reveal(&self, folder: &Path) -> Result<(), RevealFolderError>;
}

/// Launches `open`, `explorer` or `xdg-open` depending on the platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRevealer;

impl FolderRevealer for SystemRevealer {
    fn reveal(&self, folder: &Path) -> Result<(), RevealFolderError> {
        let program = if cfg!(target_os = "macos") {
            "open"
        } else if cfg!(windows) {
            "explorer"
        } else if cfg!(unix) {
            "xdg-open"
        } else {
            return Err(RevealFolderError::Unsupported);
        };
        let mut child = Command::new(program)
            .arg(folder)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| RevealFolderError::Launch {
                program: program.to_string(),
                source,
            })?;
        // Reap the launcher in the background.
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }
}

#[derive(Debug)]
pub enum ExportOutcome {
    Cancelled,
    Saved { path: PathBuf, revealed: bool },
    Failed(ExportIoError),
}

impl ExportOutcome {
    /// What to tell the user, if anything.
    pub fn notification(&self) -> Option<Notification> {
        match self {
            ExportOutcome::Cancelled => None,
            ExportOutcome::Saved { revealed: true, .. } => None,
            ExportOutcome::Saved {
                path,
                revealed: false,
            } => Some(Notification {
                kind: NotificationKind::Info,
                title: "Export".into(),
                message: format!("Saved PNG to: {}", path.display()),
            }),
            ExportOutcome::Failed(e) => Some(Notification {
                kind: NotificationKind::Error,
                title: "Error".into(),
                message: format!("Could not export to PNG: {e}"),
            }),
        }
    }

    pub fn is_saved(&self) -> bool {
        matches!(self, ExportOutcome::Saved { .. })
    }
}

/// A rasterized view waiting for the user to pick a destination.
pub struct PendingExport {
    bitmap: Pixmap,
    suggested: PathBuf,
}

impl PendingExport {
    /// Rasterize `view` and suggest a free name in the working directory.
    pub fn begin(view: &dyn RenderableView) -> Result<Self, ExportIoError> {
        let bitmap = rasterize(view)?;
        Ok(Self {
            bitmap,
            suggested: default_export_path(),
        })
    }

    pub fn suggested_path(&self) -> &Path {
        &self.suggested
    }

    pub fn size(&self) -> PixelSize {
        PixelSize {
            width: self.bitmap.width(),
            height: self.bitmap.height(),
        }
    }

    /// Complete the export with the user's answer to the save prompt.
    pub fn finish(self, choice: Option<PathBuf>, revealer: &dyn FolderRevealer) -> ExportOutcome {
        let Some(path) = choice else {
            info!("export cancelled");
            return ExportOutcome::Cancelled;
        };
        if let Err(e) = write_png(&self.bitmap, &path) {
            error!(path = %path.display(), error = %e, "export failed");
            return ExportOutcome::Failed(e);
        }
        let path = path.canonicalize().unwrap_or(path);
        info!(path = %path.display(), "exported parse tree");
        let revealed = match path.parent() {
            Some(folder) => revealer.reveal(folder),
            None => Err(RevealFolderError::NoParent(path.clone())),
        };
        let revealed = match revealed {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "could not reveal export folder");
                false
            }
        };
        ExportOutcome::Saved { path, revealed }
    }
}

/// Paint `view` onto a bitmap of exactly its pixel size.
pub fn rasterize(view: &dyn RenderableView) -> Result<Pixmap, ExportIoError> {
    let size = view.size();
    let mut bitmap = Pixmap::new(size.width, size.height).ok_or(
        crate::error::RenderError::EmptySurface {
            width: size.width,
            height: size.height,
        },
    )?;
    view.paint(&mut bitmap)?;
    Ok(bitmap)
}

/// Encode `bitmap` as PNG and write it to `path`. Either the complete file
/// appears at `path` or nothing changes there.
pub fn write_png(bitmap: &Pixmap, path: &Path) -> Result<(), ExportIoError> {
    let bytes = bitmap
        .encode_png()
        .map_err(|e| ExportIoError::Encode(e.to_string()))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let write_err = |source: std::io::Error| ExportIoError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(&bytes).map_err(write_err)?;
    tmp.flush().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Run a complete export: rasterize, prompt, write, reveal, notify.
pub fn trigger_export(
    view: &dyn RenderableView,
    prompt: &mut dyn SavePrompt,
    notifier: &mut dyn Notifier,
    revealer: &dyn FolderRevealer,
) -> ExportOutcome {
    let outcome = match PendingExport::begin(view) {
        Ok(pending) => {
            let choice = prompt.prompt(pending.suggested_path());
            pending.finish(choice, revealer)
        }
        Err(e) => {
            error!(error = %e, "could not rasterize view");
            ExportOutcome::Failed(e)
        }
    };
    if let Some(n) = outcome.notification() {
        notifier.notify(n);
    }
    outcome
}
