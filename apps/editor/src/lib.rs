//! Résumé editor core: draft store, list editor, preview renderer, sync
//! controller and the export/score pipeline, wired together per editing
//! session.

pub mod backend;
pub mod commands;
pub mod config;
pub mod dispatch;
pub mod draft;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod preview;
pub mod session;
pub mod sync;

pub use errors::{EditorError, Notice, Severity};
pub use session::{EditorSession, SessionOptions};
