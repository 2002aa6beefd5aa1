use ropey::Rope;

use crate::autoformat::{AutoFormatter, EditEvent, Replacement, renumber_ordered_list};

/// Cursor position in the editor buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column (byte offset within the line).
    pub col: usize,
}

impl Cursor {
    pub const fn at(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// A text buffer backed by a rope data structure.
///
/// Every edit made through the buffer is offered to the attached
/// [`AutoFormatter`] first, the same way a host editor calls its input
/// filter before committing a keystroke.
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
    dirty: bool,
    formatter: Option<AutoFormatter>,
}

impl EditorBuffer {
    /// Create a new buffer from a string.
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::default(),
            dirty: false,
            formatter: None,
        }
    }

    /// Create an empty buffer.
    pub fn empty() -> Self {
        Self::from_text("")
    }

    /// Attach an input filter.
    #[must_use]
    pub fn with_formatter(mut self, formatter: Option<AutoFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub const fn formatter(&self) -> Option<&AutoFormatter> {
        self.formatter.as_ref()
    }

    /// The current cursor position.
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Whether the buffer has been modified since creation or last save.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the buffer as clean (e.g., after saving).
    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Total number of lines in the buffer.
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get the content of a line (without trailing newline).
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let s = self.rope.line(line_idx).to_string();
        Some(s.trim_end_matches('\n').trim_end_matches('\r').to_string())
    }

    /// Length of a line in bytes (without trailing newline).
    pub fn line_len(&self, line_idx: usize) -> usize {
        self.line_at(line_idx).map_or(0, |s| s.len())
    }

    /// The full text content of the buffer.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Type `s` at the cursor, through the input filter.
    pub fn type_text(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        let offset = self.cursor_offset();
        self.edit(offset..offset, s);
    }

    /// Split the current line at the cursor (Enter key).
    pub fn split_line(&mut self) {
        self.type_text("\n");
    }

    /// Tab key.
    pub fn indent(&mut self) {
        self.type_text("\t");
    }

    /// Delete the character before the cursor (Backspace).
    ///
    /// Returns `true` if a character was deleted.
    pub fn delete_back(&mut self) -> bool {
        let offset = self.cursor_offset();
        if offset == 0 {
            return false;
        }
        let char_idx = self.rope.byte_to_char(offset);
        let prev = self.rope.char_to_byte(char_idx - 1);
        self.edit(prev..offset, "");
        true
    }

    /// Renumber the ordered list under the cursor.
    ///
    /// Returns `true` if any number changed. Uses the attached formatter's
    /// patterns; without a formatter nothing happens.
    pub fn renumber_list(&mut self) -> bool {
        let Some(formatter) = &self.formatter else {
            return false;
        };
        let text = self.text();
        let offset = self.cursor_offset();
        let Replacement::Replace { range, text: numbered } =
            renumber_ordered_list(&text, offset, formatter.patterns())
        else {
            return false;
        };
        // Keep the cursor on the same line, at most at its end.
        let line = self.cursor.line;
        self.replace_bytes(range, &numbered);
        self.cursor.line = line;
        self.cursor.col = self.cursor.col.min(self.line_len(line));
        true
    }

    /// Move cursor to the end of the line (End).
    pub fn move_end(&mut self) {
        self.cursor.col = self.line_len(self.cursor.line);
    }

    /// Move cursor to a specific line and column.
    pub fn move_to(&mut self, line: usize, col: usize) {
        let max_line = self.line_count().saturating_sub(1);
        self.cursor.line = line.min(max_line);
        let max_col = self.line_len(self.cursor.line);
        let line_text = self.line_at(self.cursor.line).unwrap_or_default();
        let mut col = col.min(max_col);
        while !line_text.is_char_boundary(col) {
            col -= 1;
        }
        self.cursor.col = col;
    }

    // --- Private helpers ---

    /// Run `payload` replacing `range` through the filter and apply it.
    fn edit(&mut self, range: std::ops::Range<usize>, payload: &str) {
        let text = self.text();
        let event = EditEvent::new(&text, range, payload);
        let outcome = self
            .formatter
            .as_ref()
            .map_or(Replacement::Unchanged, |f| f.filter(&event));
        let cursor = outcome.cursor_after(&event);
        let (range, insert) = match &outcome {
            Replacement::Unchanged => (event.range(), payload),
            Replacement::Replace { range, text } => (range.clone(), text.as_str()),
        };
        self.replace_bytes(range, insert);
        self.set_cursor_offset(cursor);
    }

    fn replace_bytes(&mut self, range: std::ops::Range<usize>, insert: &str) {
        let start = self.rope.byte_to_char(range.start);
        let end = self.rope.byte_to_char(range.end);
        if end > start {
            self.rope.remove(start..end);
        }
        if !insert.is_empty() {
            self.rope.insert(start, insert);
        }
        self.dirty = true;
    }

    /// Byte offset of the cursor in the whole buffer.
    fn cursor_offset(&self) -> usize {
        let line_start = self.rope.line_to_byte(self.cursor.line);
        line_start + self.cursor.col.min(self.line_len(self.cursor.line))
    }

    fn set_cursor_offset(&mut self, offset: usize) {
        let offset = offset.min(self.rope.len_bytes());
        let line = self.rope.byte_to_line(offset);
        self.cursor.line = line;
        self.cursor.col = offset - self.rope.line_to_byte(line);
    }
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field(
                "rope",
                &format_args!("Rope({} lines)", self.rope.len_lines()),
            )
            .field("cursor", &self.cursor)
            .field("dirty", &self.dirty)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}
