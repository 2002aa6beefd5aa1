//! Lightweight editor buffer for driving the input filter.
//!
//! Provides a rope-backed text buffer with cursor management. Typed text,
//! line breaks, tabs and backspaces go through the attached
//! auto-formatter before they are applied.

mod buffer;

pub use buffer::{Cursor, EditorBuffer};
