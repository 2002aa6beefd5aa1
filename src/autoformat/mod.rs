//! List auto-formatting for lightweight markup dialects.
//!
//! This module handles:
//! - Recognizing list prefixes (bullets, numbers, checkboxes)
//! - Continuing a list when a line break is typed or pasted
//! - Indenting list lines on tab
//! - Renumbering ordered lists

mod filter;
mod patterns;
mod renumber;

pub use filter::{AutoFormatter, DeletionKind, EditEvent, IndentUnit, Replacement};
pub use patterns::{Marker, PrefixKind, PrefixMatch, PrefixPattern, PrefixPatterns, UNCHECKED};
pub use renumber::renumber_ordered_list;
