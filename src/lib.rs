//! Parse tree inspector.
//!
//! This crate shows a parser's syntax tree as a navigable outline next to a
//! graphical rendering, highlights subtrees containing parse errors and
//! exports the rendering as PNG.
//!
//! The binary `parsetree-inspector` loads a JSON tree dump and either opens
//! the inspector, prints an outline or exports a PNG.

pub mod error;
pub mod export;
pub mod inspector;
pub mod layout;
pub mod mirror;
pub mod open;
pub mod path;
pub mod selection;
pub mod session;
pub mod source;
pub mod view;

// Optional GUI functionality lives behind the `egui` feature flag.
// It provides the UI coordination thread and the on-screen inspector window.
#[cfg(feature = "egui")]
pub mod egui_app;

pub use mirror::{MirrorNode, build_mirror};
pub use open::{OpenFuture, UiDispatcher, WindowHandle, open};
pub use path::NodePath;
pub use session::Session;
pub use source::{NodeLabel, ParseTree, ParseTreeDoc, RuleNames, SourceTree};
