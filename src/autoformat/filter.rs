//! The list auto-continuation input filter.
//!
//! [`AutoFormatter::filter`] is called by the host editor before it commits an
//! insertion. It looks at the line in front of the insertion point and, when
//! the payload contains line breaks, writes a list prefix after each of them.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use tracing::{debug, trace};

use super::patterns::{PrefixKind, PrefixMatch, PrefixPatterns};
use crate::error::{Error, Result};

/// Character used for one level of indentation.
///
/// Only a tab or a single space is accepted. Any other character would be
/// written in front of list lines without the patterns reading it back as
/// indentation, since they only match `[ \t]*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndentUnit {
    #[default]
    Tab,
    Space,
}

impl IndentUnit {
    pub const fn as_char(self) -> char {
        match self {
            Self::Tab => '\t',
            Self::Space => ' ',
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidIndent`] for anything but a tab or a space.
    pub fn from_char(ch: char) -> Result<Self> {
        match ch {
            '\t' => Ok(Self::Tab),
            ' ' => Ok(Self::Space),
            other => Err(Error::InvalidIndent(other.to_string())),
        }
    }
}

impl FromStr for IndentUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tab" | "\t" => Ok(Self::Tab),
            "space" | " " => Ok(Self::Space),
            other => Err(Error::InvalidIndent(other.to_string())),
        }
    }
}

impl fmt::Display for IndentUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tab => "tab",
            Self::Space => "space",
        })
    }
}

/// One pending edit, as presented by the host editor.
///
/// Offsets are byte offsets into `text`. They are normalized on
/// construction: clamped to the text length, moved down to a character
/// boundary, and swapped if reversed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditEvent<'a> {
    text: &'a str,
    range: Range<usize>,
    payload: &'a str,
}

impl<'a> EditEvent<'a> {
    /// Replace `range` of `text` with `payload`.
    pub fn new(text: &'a str, range: Range<usize>, payload: &'a str) -> Self {
        let mut start = floor_boundary(text, range.start);
        let mut end = floor_boundary(text, range.end);
        if start > end {
            std::mem::swap(&mut start, &mut end);
        }
        Self {
            text,
            range: start..end,
            payload,
        }
    }

    /// Insert `payload` at `at` without replacing anything.
    pub fn insert(text: &'a str, at: usize, payload: &'a str) -> Self {
        Self::new(text, at..at, payload)
    }

    /// Build an event from the classic input-filter argument list: the
    /// inserted text is `source[start..end]`, and it replaces
    /// `dest[dstart..dend]`.
    pub fn from_filter_args(
        source: &'a str,
        start: usize,
        end: usize,
        dest: &'a str,
        dstart: usize,
        dend: usize,
    ) -> Self {
        let mut from = floor_boundary(source, start);
        let mut to = floor_boundary(source, end);
        if from > to {
            std::mem::swap(&mut from, &mut to);
        }
        Self::new(dest, dstart..dend, &source[from..to])
    }

    /// Document text before the edit.
    pub const fn text(&self) -> &'a str {
        self.text
    }

    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Text being inserted.
    pub const fn payload(&self) -> &'a str {
        self.payload
    }

    pub fn is_deletion(&self) -> bool {
        self.payload.is_empty() && !self.range.is_empty()
    }
}

fn floor_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map_or(0, |i| i + 1)
}

fn line_end(text: &str, offset: usize) -> usize {
    text[offset..].find('\n').map_or(text.len(), |i| offset + i)
}

/// What the host should do with an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    /// Apply the original edit as-is.
    Unchanged,
    /// Put `text` in place of `range` of the document instead. `range`
    /// covers at least the edit's own range and may start earlier on the
    /// same line.
    Replace { range: Range<usize>, text: String },
}

impl Replacement {
    pub const fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    /// Document text after applying this outcome to `event`.
    pub fn apply(&self, event: &EditEvent<'_>) -> String {
        let (range, insert) = self.resolve(event);
        let text = event.text();
        let mut out = String::with_capacity(text.len() + insert.len());
        out.push_str(&text[..range.start]);
        out.push_str(insert);
        out.push_str(&text[range.end..]);
        out
    }

    /// Offset just past the inserted text once applied; where the caret goes.
    pub fn cursor_after(&self, event: &EditEvent<'_>) -> usize {
        let (range, insert) = self.resolve(event);
        range.start + insert.len()
    }

    fn resolve<'e>(&'e self, event: &EditEvent<'e>) -> (Range<usize>, &'e str) {
        match self {
            Self::Unchanged => (event.range(), event.payload()),
            Self::Replace { range, text } => (range.clone(), text.as_str()),
        }
    }
}

/// Why a deletion at the start of a line passes through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionKind {
    /// Exactly one indent unit removed from the line's leading whitespace.
    Dedent,
    /// The list marker (with or without its indentation) removed.
    PrefixRemoval,
    /// Any other deletion.
    Other,
}

/// Auto-continuation filter for one dialect.
#[derive(Debug, Clone)]
pub struct AutoFormatter {
    patterns: PrefixPatterns,
    indent: IndentUnit,
}

impl AutoFormatter {
    pub const fn new(patterns: PrefixPatterns, indent: IndentUnit) -> Self {
        Self { patterns, indent }
    }

    pub const fn patterns(&self) -> &PrefixPatterns {
        &self.patterns
    }

    pub const fn indent(&self) -> IndentUnit {
        self.indent
    }

    /// Classic input-filter entry point. See [`EditEvent::from_filter_args`].
    pub fn filter_args(
        &self,
        source: &str,
        start: usize,
        end: usize,
        dest: &str,
        dstart: usize,
        dend: usize,
    ) -> Replacement {
        self.filter(&EditEvent::from_filter_args(
            source, start, end, dest, dstart, dend,
        ))
    }

    /// Decide how to apply `event`.
    ///
    /// Never fails: anything the filter does not recognize is
    /// [`Replacement::Unchanged`].
    pub fn filter(&self, event: &EditEvent<'_>) -> Replacement {
        let payload = event.payload();
        if payload == "\t" {
            return self.indent_line(event).unwrap_or(Replacement::Unchanged);
        }
        if payload.is_empty() {
            if let Some(kind) = self.deletion_kind(event) {
                trace!(?kind, range = ?event.range(), "deletion passes through");
            }
            return Replacement::Unchanged;
        }
        if !payload.contains('\n') {
            return Replacement::Unchanged;
        }
        self.continue_lines(event)
    }

    /// Classify a deletion. `None` if `event` is not a deletion.
    pub fn deletion_kind(&self, event: &EditEvent<'_>) -> Option<DeletionKind> {
        if !event.is_deletion() {
            return None;
        }
        let text = event.text();
        let range = event.range();
        let start = line_start(text, range.start);
        let line = &text[start..line_end(text, start)];
        let deleted = &text[range.clone()];
        let column = range.start - start;

        let mut indent_char = [0u8; 4];
        let indent_str: &str = self.indent.as_char().encode_utf8(&mut indent_char);
        let leading = line.len() - line.trim_start_matches([' ', '\t']).len();
        if deleted == indent_str && range.end <= start + leading {
            return Some(DeletionKind::Dedent);
        }
        if let Some(m) = self.patterns.find(line) {
            let marker_start = m.indent().len();
            let prefix_end = m.prefix_len();
            if range.end - start == prefix_end && (column == 0 || column == marker_start) {
                return Some(DeletionKind::PrefixRemoval);
            }
        }
        Some(DeletionKind::Other)
    }

    /// A lone tab at the start of a line, or inside a list prefix, indents
    /// the whole line by one unit.
    fn indent_line(&self, event: &EditEvent<'_>) -> Option<Replacement> {
        let range = event.range();
        if !range.is_empty() {
            return None;
        }
        let text = event.text();
        let start = line_start(text, range.start);
        let line = &text[start..line_end(text, range.start)];
        if line.is_empty() {
            return None;
        }
        let column = range.start - start;
        let indent = self.indent.as_char();
        if column == 0 {
            debug!(line_start = start, "indenting line");
            return Some(Replacement::Replace {
                range,
                text: indent.to_string(),
            });
        }
        let m = self.patterns.find(line)?;
        if column > m.prefix_len() {
            return None;
        }
        debug!(line_start = start, kind = ?m.kind(), "indenting list item");
        Some(Replacement::Replace {
            range: start..range.end,
            text: format!("{indent}{}", &text[start..range.start]),
        })
    }

    fn continue_lines(&self, event: &EditEvent<'_>) -> Replacement {
        let text = event.text();
        let range = event.range();
        let payload = event.payload();
        let start = line_start(text, range.start);
        let before = &text[start..range.start];

        if payload == "\n" || payload == "\r\n" {
            let after = &text[range.end..line_end(text, range.end)];
            if let Some(m) = self.patterns.find(before) {
                if !m.has_content() && after.trim().is_empty() {
                    debug!(kind = ?m.kind(), "removing empty list item");
                    return Replacement::Replace {
                        range: start..range.end,
                        text: String::new(),
                    };
                }
            }
        }

        let mut segments = payload.split('\n');
        let first = segments.next().unwrap_or_default();
        let mut out = String::with_capacity(payload.len() + 16);
        out.push_str(first);
        // Text of the line being completed, from its start to the next break.
        let mut line = format!("{before}{first}");
        // Span of `out` holding a prefix we wrote on the current line.
        let mut synthesized: Option<Range<usize>> = None;

        for segment in segments {
            let completed = line.trim_end_matches('\r');
            let previous = self.patterns.find(completed).map(Continuation::from);
            let next = match previous {
                Some(mut prev) if prev.has_content => prev.prefix.take().map(|prefix| (prefix, prev)),
                Some(_) => {
                    if let Some(span) = synthesized.take() {
                        trace!("dropping prefix before empty pasted line");
                        out.replace_range(span, "");
                    }
                    None
                }
                None => None,
            };

            out.push('\n');
            synthesized = None;
            line.clear();

            let Some((prefix, prev)) = next else {
                out.push_str(segment);
                line.push_str(segment);
                continue;
            };
            match self.patterns.find(segment) {
                Some(pasted) => {
                    let renumbered = (prev.kind == PrefixKind::Ordered
                        && pasted.kind() == PrefixKind::Ordered
                        && pasted.indent() == prev.indent)
                        .then(|| prev.next_number.and_then(|n| pasted.renumbered(n)))
                        .flatten();
                    if let Some(renumbered) = renumbered {
                        line.push_str(&renumbered);
                        line.push_str(pasted.content());
                    } else {
                        line.push_str(segment);
                    }
                    out.push_str(&line);
                }
                None => {
                    trace!(%prefix, "continuing list");
                    synthesized = Some(out.len()..out.len() + prefix.len());
                    line.push_str(&prefix);
                    line.push_str(segment);
                    out.push_str(&line);
                }
            }
        }

        if out == payload {
            Replacement::Unchanged
        } else {
            debug!(inserted = out.len().saturating_sub(payload.len()), "list continuation");
            Replacement::Replace { range, text: out }
        }
    }
}

/// What the completed line contributes to the next one.
struct Continuation {
    kind: PrefixKind,
    indent: String,
    prefix: Option<String>,
    next_number: Option<u64>,
    has_content: bool,
}

impl From<PrefixMatch<'_>> for Continuation {
    fn from(m: PrefixMatch<'_>) -> Self {
        Self {
            kind: m.kind(),
            indent: m.indent().to_string(),
            prefix: m.continuation(),
            next_number: m.next_number(),
            has_content: m.has_content(),
        }
    }
}
