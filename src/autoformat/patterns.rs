//! Line-prefix patterns recognized as list items.
//!
//! Each dialect declares an ordered [`PrefixPatterns`] set. Consumers try the
//! patterns in order and take the first match.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Glyph written into a continued checkbox.
pub const UNCHECKED: char = ' ';

/// Which kind of list marker a pattern recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixKind {
    Unordered,
    Ordered,
    Checkbox,
}

impl PrefixKind {
    /// Capture groups a pattern of this kind must define.
    const fn required_groups(self) -> &'static [&'static str] {
        match self {
            Self::Unordered => &["indent", "marker", "gap"],
            Self::Ordered => &["indent", "number", "delim", "gap"],
            Self::Checkbox => &["indent", "open", "state", "close"],
        }
    }
}

/// The marker part of a matched prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker<'t> {
    /// `-`, `*`, `+` followed by the whitespace gap.
    Bullet { symbol: &'t str, gap: &'t str },
    /// Decimal number, delimiter and gap. `pad` is the zero-padded width,
    /// or 0 when the number was written without leading zeros.
    Number {
        value: u64,
        pad: usize,
        delim: &'t str,
        gap: &'t str,
    },
    /// Everything up to the state glyph, the glyph, and everything after it.
    Checkbox {
        open: &'t str,
        state: char,
        close: &'t str,
    },
}

/// A successful prefix match against one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixMatch<'t> {
    line: &'t str,
    indent: &'t str,
    marker: Marker<'t>,
    len: usize,
}

impl<'t> PrefixMatch<'t> {
    pub const fn kind(&self) -> PrefixKind {
        match self.marker {
            Marker::Bullet { .. } => PrefixKind::Unordered,
            Marker::Number { .. } => PrefixKind::Ordered,
            Marker::Checkbox { .. } => PrefixKind::Checkbox,
        }
    }

    /// Leading whitespace before the marker.
    pub const fn indent(&self) -> &'t str {
        self.indent
    }

    pub const fn marker(&self) -> Marker<'t> {
        self.marker
    }

    /// Byte length of the whole prefix, indentation included.
    pub const fn prefix_len(&self) -> usize {
        self.len
    }

    pub fn prefix(&self) -> &'t str {
        &self.line[..self.len]
    }

    /// Text following the prefix.
    pub fn content(&self) -> &'t str {
        &self.line[self.len..]
    }

    /// Whether anything but whitespace follows the prefix.
    pub fn has_content(&self) -> bool {
        !self.content().trim().is_empty()
    }

    /// Number for the item following this one, if this is an ordered item
    /// whose number can still be incremented.
    pub const fn next_number(&self) -> Option<u64> {
        match self.marker {
            Marker::Number { value, .. } => value.checked_add(1),
            _ => None,
        }
    }

    /// Prefix to start the next line with.
    ///
    /// Bullets repeat, numbers count up, checkboxes come back unchecked.
    /// Returns `None` when an ordered number cannot be incremented.
    pub fn continuation(&self) -> Option<String> {
        match self.marker {
            Marker::Bullet { symbol, gap } => Some(format!("{}{symbol}{gap}", self.indent)),
            Marker::Number { .. } => self.renumbered(self.next_number()?),
            Marker::Checkbox { open, close, .. } => {
                Some(format!("{}{open}{UNCHECKED}{close}", self.indent))
            }
        }
    }

    /// This prefix with its number replaced by `value`.
    ///
    /// Zero padding and the delimiter are preserved. `None` for
    /// non-ordered prefixes.
    pub fn renumbered(&self, value: u64) -> Option<String> {
        match self.marker {
            Marker::Number { pad, delim, gap, .. } => Some(format!(
                "{}{}{delim}{gap}",
                self.indent,
                format_number(value, pad)
            )),
            _ => None,
        }
    }
}

fn format_number(value: u64, pad: usize) -> String {
    if pad > 0 {
        format!("{value:0pad$}")
    } else {
        value.to_string()
    }
}

/// A compiled prefix pattern of a given kind.
#[derive(Debug, Clone)]
pub struct PrefixPattern {
    kind: PrefixKind,
    regex: Regex,
}

impl PrefixPattern {
    /// Compile a custom pattern.
    ///
    /// The pattern must be anchored with `^` and define the named capture
    /// groups its kind needs: `indent` always, then `marker`/`gap` for
    /// unordered, `number`/`delim`/`gap` for ordered and
    /// `open`/`state`/`close` for checkboxes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the regex does not compile, is
    /// not anchored, or lacks a required group.
    pub fn new(kind: PrefixKind, pattern: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };
        if !pattern.starts_with('^') {
            return Err(invalid("pattern must be anchored with '^'".to_string()));
        }
        let regex = Regex::new(pattern).map_err(|e| invalid(e.to_string()))?;
        let names: Vec<&str> = regex.capture_names().flatten().collect();
        if let Some(missing) = kind
            .required_groups()
            .iter()
            .find(|group| !names.contains(group))
        {
            return Err(invalid(format!("missing capture group '{missing}'")));
        }
        Ok(Self { kind, regex })
    }

    fn builtin(kind: PrefixKind, pattern: &str) -> Self {
        Self::new(kind, pattern).expect("built-in prefix pattern must compile")
    }

    pub const fn kind(&self) -> PrefixKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Match this pattern at the start of `line`.
    ///
    /// Ordered numbers that do not fit in a `u64` do not match.
    pub fn match_line<'t>(&self, line: &'t str) -> Option<PrefixMatch<'t>> {
        let caps = self.regex.captures(line)?;
        let whole = caps.get(0)?;
        if whole.start() != 0 {
            return None;
        }
        let group = |name: &str| caps.name(name).map_or("", |m| m.as_str());
        let marker = match self.kind {
            PrefixKind::Unordered => Marker::Bullet {
                symbol: group("marker"),
                gap: group("gap"),
            },
            PrefixKind::Ordered => {
                let digits = group("number");
                let value = digits.parse::<u64>().ok()?;
                let pad = if digits.len() > 1 && digits.starts_with('0') {
                    digits.len()
                } else {
                    0
                };
                Marker::Number {
                    value,
                    pad,
                    delim: group("delim"),
                    gap: group("gap"),
                }
            }
            PrefixKind::Checkbox => Marker::Checkbox {
                open: group("open"),
                state: group("state").chars().next()?,
                close: group("close"),
            },
        };
        Some(PrefixMatch {
            line,
            indent: group("indent"),
            marker,
            len: whole.end(),
        })
    }
}

/// Ordered set of prefix patterns; the first match wins.
#[derive(Debug, Clone)]
pub struct PrefixPatterns {
    patterns: Vec<PrefixPattern>,
}

impl PrefixPatterns {
    pub const fn new(patterns: Vec<PrefixPattern>) -> Self {
        Self { patterns }
    }

    /// Markdown: `- [ ] `, `- `/`* `/`+ `, `1. `/`1) `.
    pub fn markdown() -> &'static Self {
        static MARKDOWN: LazyLock<PrefixPatterns> = LazyLock::new(|| {
            PrefixPatterns::new(vec![
                PrefixPattern::builtin(
                    PrefixKind::Checkbox,
                    r"^(?P<indent>[ \t]*)(?P<open>[-*+][ \t]+\[)(?P<state>[ xX])(?P<close>\][ \t]+)",
                ),
                PrefixPattern::builtin(
                    PrefixKind::Unordered,
                    r"^(?P<indent>[ \t]*)(?P<marker>[-*+])(?P<gap>[ \t]+)",
                ),
                PrefixPattern::builtin(
                    PrefixKind::Ordered,
                    r"^(?P<indent>[ \t]*)(?P<number>[0-9]+)(?P<delim>[.)])(?P<gap>[ \t]+)",
                ),
            ])
        });
        &MARKDOWN
    }

    /// ZimWiki: `[ ] `/`[x] `/`[*] `/`[>] `, `* `, `1. `.
    pub fn zimwiki() -> &'static Self {
        static ZIMWIKI: LazyLock<PrefixPatterns> =
            LazyLock::new(|| PrefixPatterns::wiki_style(r"\*"));
        &ZIMWIKI
    }

    /// txt2tags: `[ ] `/`[x] `/`[*] `/`[>] `, `- `/`+ `, `1. `.
    pub fn txt2tags() -> &'static Self {
        static TXT2TAGS: LazyLock<PrefixPatterns> =
            LazyLock::new(|| PrefixPatterns::wiki_style(r"[-+]"));
        &TXT2TAGS
    }

    fn wiki_style(bullets: &str) -> Self {
        Self::new(vec![
            PrefixPattern::builtin(
                PrefixKind::Checkbox,
                r"^(?P<indent>[ \t]*)(?P<open>\[)(?P<state>[ x*>])(?P<close>\][ \t]+)",
            ),
            PrefixPattern::builtin(
                PrefixKind::Unordered,
                &format!(r"^(?P<indent>[ \t]*)(?P<marker>{bullets})(?P<gap>[ \t]+)"),
            ),
            PrefixPattern::builtin(
                PrefixKind::Ordered,
                r"^(?P<indent>[ \t]*)(?P<number>[0-9]+)(?P<delim>\.)(?P<gap>[ \t]+)",
            ),
        ])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PrefixPattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// First pattern matching the start of `line`.
    pub fn find<'t>(&self, line: &'t str) -> Option<PrefixMatch<'t>> {
        self.patterns.iter().find_map(|p| p.match_line(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_sets() -> [(&'static str, &'static PrefixPatterns); 3] {
        [
            ("markdown", PrefixPatterns::markdown()),
            ("zimwiki", PrefixPatterns::zimwiki()),
            ("txt2tags", PrefixPatterns::txt2tags()),
        ]
    }

    #[test]
    fn test_markdown_first_match_kinds() {
        let set = PrefixPatterns::markdown();
        let cases = [
            ("- item", PrefixKind::Unordered),
            ("* item", PrefixKind::Unordered),
            ("+ item", PrefixKind::Unordered),
            ("- [ ] task", PrefixKind::Checkbox),
            ("* [x] done", PrefixKind::Checkbox),
            ("12. twelfth", PrefixKind::Ordered),
            ("3) third", PrefixKind::Ordered),
        ];
        for (line, kind) in cases {
            let m = set.find(line).unwrap_or_else(|| panic!("no match for {line:?}"));
            assert_eq!(m.kind(), kind, "line {line:?}");
        }
    }

    #[test]
    fn test_wiki_checkbox_states() {
        for state in [' ', 'x', '*', '>'] {
            let line = format!("[{state}] thing");
            let m = PrefixPatterns::zimwiki().find(&line).unwrap();
            assert_eq!(m.kind(), PrefixKind::Checkbox);
            assert!(matches!(m.marker(), Marker::Checkbox { state: s, .. } if s == state));
        }
        assert!(PrefixPatterns::zimwiki().find("[y] thing").is_none());
    }

    #[test]
    fn test_txt2tags_bullets() {
        let set = PrefixPatterns::txt2tags();
        assert_eq!(set.find("- a").map(|m| m.kind()), Some(PrefixKind::Unordered));
        assert_eq!(set.find("+ a").map(|m| m.kind()), Some(PrefixKind::Unordered));
        assert!(set.find("* a").is_none());
    }

    #[test]
    fn test_no_two_patterns_match_same_prefix() {
        let samples = [
            "- a", "* a", "+ a", "- [ ] a", "* [x] a", "[ ] a", "[x] a", "[*] a", "[>] a",
            "1. a", "2) a", "\t- a", "  10. a", "\t[ ] a",
        ];
        for (name, set) in all_sets() {
            for line in samples {
                let prefixes: Vec<&str> = set
                    .iter()
                    .filter_map(|p| p.match_line(line))
                    .map(|m| m.prefix())
                    .collect();
                for (i, a) in prefixes.iter().enumerate() {
                    for b in &prefixes[i + 1..] {
                        assert_ne!(a, b, "{name}: two patterns matched {a:?} in {line:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_indent_and_content_split() {
        let m = PrefixPatterns::markdown().find("\t\t- buy milk").unwrap();
        assert_eq!(m.indent(), "\t\t");
        assert_eq!(m.prefix(), "\t\t- ");
        assert_eq!(m.content(), "buy milk");
        assert!(m.has_content());
    }

    #[test]
    fn test_prefix_without_content() {
        let m = PrefixPatterns::markdown().find("-   ").unwrap();
        assert!(!m.has_content());
    }

    #[test]
    fn test_marker_requires_trailing_whitespace() {
        let set = PrefixPatterns::markdown();
        assert!(set.find("-item").is_none());
        assert!(set.find("1.5 litres").is_none());
        assert!(set.find("---").is_none());
    }

    #[test]
    fn test_continuation_bullet_repeats_marker_and_gap() {
        let m = PrefixPatterns::markdown().find("  *   spaced").unwrap();
        assert_eq!(m.continuation().as_deref(), Some("  *   "));
    }

    #[test]
    fn test_continuation_checkbox_is_unchecked() {
        let m = PrefixPatterns::markdown().find("- [X] shipped").unwrap();
        assert_eq!(m.continuation().as_deref(), Some("- [ ] "));
        let m = PrefixPatterns::zimwiki().find("\t[>] moved").unwrap();
        assert_eq!(m.continuation().as_deref(), Some("\t[ ] "));
    }

    #[test]
    fn test_continuation_increments_number_and_keeps_delimiter() {
        let m = PrefixPatterns::markdown().find("9) nine").unwrap();
        assert_eq!(m.continuation().as_deref(), Some("10) "));
    }

    #[test]
    fn test_continuation_preserves_zero_padding() {
        let m = PrefixPatterns::markdown().find("007. bond").unwrap();
        assert_eq!(m.continuation().as_deref(), Some("008. "));
        let m = PrefixPatterns::markdown().find("09. nine").unwrap();
        assert_eq!(m.continuation().as_deref(), Some("10. "));
    }

    #[test]
    fn test_number_too_large_does_not_match() {
        let line = "99999999999999999999999. huge";
        assert!(PrefixPatterns::markdown().find(line).is_none());
    }

    #[test]
    fn test_max_number_has_no_continuation() {
        let line = format!("{}. last", u64::MAX);
        let m = PrefixPatterns::markdown().find(&line).unwrap();
        assert_eq!(m.kind(), PrefixKind::Ordered);
        assert_eq!(m.continuation(), None);
    }

    #[test]
    fn test_renumbered_only_for_ordered() {
        let m = PrefixPatterns::markdown().find("1. a").unwrap();
        assert_eq!(m.renumbered(5).as_deref(), Some("5. "));
        let m = PrefixPatterns::markdown().find("- a").unwrap();
        assert_eq!(m.renumbered(5), None);
    }

    #[test]
    fn test_custom_pattern_requires_groups() {
        let err = PrefixPattern::new(PrefixKind::Ordered, r"^(?P<indent>\s*)(?P<number>[0-9]+)")
            .unwrap_err();
        assert!(err.to_string().contains("delim"), "{err}");
    }

    #[test]
    fn test_custom_pattern_requires_anchor() {
        let err =
            PrefixPattern::new(PrefixKind::Unordered, r"(?P<indent>\s*)(?P<marker>~)(?P<gap> )")
                .unwrap_err();
        assert!(err.to_string().contains("anchored"), "{err}");
    }

    #[test]
    fn test_custom_pattern_rejects_bad_regex() {
        assert!(PrefixPattern::new(PrefixKind::Unordered, r"^(?P<indent>[").is_err());
    }

    #[test]
    fn test_custom_pattern_matches() {
        let pattern =
            PrefixPattern::new(PrefixKind::Unordered, r"^(?P<indent>[ \t]*)(?P<marker>~)(?P<gap> +)")
                .unwrap();
        let set = PrefixPatterns::new(vec![pattern]);
        let m = set.find("~ wave").unwrap();
        assert_eq!(m.continuation().as_deref(), Some("~ "));
    }

    #[test]
    fn test_non_ascii_lines_do_not_match() {
        for (_, set) in all_sets() {
            assert!(set.find("—  dash").is_none());
            assert!(set.find("１. fullwidth").is_none());
        }
    }
}
