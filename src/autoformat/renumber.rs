//! Ordered-list renumbering.

use tracing::debug;

use super::filter::Replacement;
use super::patterns::{Marker, PrefixPatterns};

/// One nesting level of the list being walked.
struct Level {
    indent: usize,
    next: Option<u64>,
}

/// Renumber the ordered list around `cursor` so its items count up by one.
///
/// The list is the contiguous block of list lines (and indented
/// continuation lines) containing the cursor's line. Each run of ordered
/// items at one indentation keeps its first number and counts on from
/// there; nested runs are numbered on their own and restart whenever
/// their parent item changes. Returns [`Replacement::Unchanged`] when the
/// numbers are already consecutive or the cursor is not in a list.
pub fn renumber_ordered_list(text: &str, cursor: usize, patterns: &PrefixPatterns) -> Replacement {
    let lines: Vec<(usize, &str)> = text
        .split_inclusive('\n')
        .scan(0, |offset, raw| {
            let start = *offset;
            *offset += raw.len();
            Some((start, raw.strip_suffix('\n').unwrap_or(raw)))
        })
        .collect();

    let in_block = |body: &str| {
        patterns.find(body).is_some()
            || (!body.trim().is_empty() && body.starts_with([' ', '\t']))
    };
    let Some(current) = lines.iter().rposition(|(start, _)| *start <= cursor) else {
        return Replacement::Unchanged;
    };
    let (line_start, body) = lines[current];
    if cursor > line_start + body.len() || !in_block(body) {
        return Replacement::Unchanged;
    }

    let mut first = current;
    while first > 0 && in_block(lines[first - 1].1) {
        first -= 1;
    }
    let mut last = current;
    while last + 1 < lines.len() && in_block(lines[last + 1].1) {
        last += 1;
    }

    let mut levels: Vec<Level> = Vec::new();
    let mut out = String::new();
    for (i, (_, body)) in lines[first..=last].iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let Some(m) = patterns.find(body) else {
            out.push_str(body);
            continue;
        };
        let depth = m.indent().len();
        while levels.last().is_some_and(|level| level.indent > depth) {
            levels.pop();
        }
        let own = match m.marker() {
            Marker::Number { value, .. } => Some(value),
            _ => None,
        };
        let wanted = match levels.last_mut() {
            Some(level) if level.indent == depth => {
                let wanted = own.map(|value| level.next.unwrap_or(value));
                level.next = wanted.and_then(|n| n.checked_add(1));
                wanted
            }
            _ => {
                levels.push(Level {
                    indent: depth,
                    next: own.and_then(|n| n.checked_add(1)),
                });
                own
            }
        };
        match wanted.filter(|n| Some(*n) != own).and_then(|n| m.renumbered(n)) {
            Some(prefix) => {
                out.push_str(&prefix);
                out.push_str(m.content());
            }
            None => out.push_str(body),
        }
    }

    let range = lines[first].0..lines[last].0 + lines[last].1.len();
    if out == text[range.clone()] {
        return Replacement::Unchanged;
    }
    debug!(lines = last - first + 1, "renumbered ordered list");
    Replacement::Replace { range, text: out }
}
