#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. format::FormatBinding)
    clippy::module_name_repetitions
)]

//! # Noteformat
//!
//! Format dispatch and list auto-continuation for note editors.
//!
//! Noteformat works with the lightweight markup dialects a note-taking app
//! edits: Markdown, Todo.txt, ZimWiki, txt2tags, key-value files and plain
//! text. It provides:
//! - Detection of a file's format from its name and first lines
//! - The converter / highlighter / action set bound to each format
//! - An input filter that continues bullets, numbers and checkboxes as
//!   the user types or pastes
//! - Ordered-list renumbering
//!
//! ## Example
//!
//! ```
//! use noteformat::autoformat::{EditEvent, IndentUnit};
//! use noteformat::format::TextFormat;
//!
//! let filter = TextFormat::Markdown.auto_formatter(IndentUnit::Tab).unwrap();
//! let text = "1. Buy milk";
//! let event = EditEvent::insert(text, text.len(), "\n");
//! assert_eq!(filter.filter(&event).apply(&event), "1. Buy milk\n2. ");
//! ```
//!
//! ## Modules
//!
//! - [`autoformat`]: Prefix patterns, the continuation filter, renumbering
//! - [`format`]: Format enum, bindings and detection
//! - [`editor`]: Rope-backed buffer that routes edits through the filter
//! - [`config`]: Saved command-line defaults

pub mod autoformat;
pub mod config;
pub mod editor;
pub mod error;
pub mod format;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::autoformat::{AutoFormatter, EditEvent, IndentUnit, Replacement};
    pub use crate::editor::EditorBuffer;
    pub use crate::format::{FormatBinding, TextFormat};
}
