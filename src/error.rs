//! Error taxonomy of the inspector.
//!
//! Only [`MarshalingError`] ever reaches the embedding caller. Export errors are
//! turned into notifications inside [`crate::export`].

use std::path::PathBuf;

use thiserror::Error;

/// Failure to hand surface construction over to the UI coordination thread.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MarshalingError {
    /// No UI coordination thread is running (or it shut down before the task ran).
    #[error("no UI coordination thread is available")]
    Unavailable,
    /// Building the surface on the UI thread panicked.
    #[error("inspector construction failed: {0}")]
    Construction(String),
    /// The per-call marshaling thread could not be started.
    #[error("could not start marshaling thread: {0}")]
    Spawn(String),
}

/// Rasterizing the rendered view failed.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("view has an empty pixel area ({width}x{height})")]
    EmptySurface { width: u32, height: u32 },
    #[error("surface is {actual_w}x{actual_h}, view needs {expected_w}x{expected_h}")]
    SurfaceSize {
        expected_w: u32,
        expected_h: u32,
        actual_w: u32,
        actual_h: u32,
    },
    #[error("could not build scene: {0}")]
    Scene(String),
}

/// Export failed somewhere between rasterization and the final write.
#[derive(Debug, Error)]
pub enum ExportIoError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The OS file manager could not be asked to show the export folder.
#[derive(Debug, Error)]
pub enum RevealFolderError {
    #[error("{} has no containing folder", .0.display())]
    NoParent(PathBuf),
    #[error("failed to launch file manager `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("revealing folders is not supported on this platform")]
    Unsupported,
}
