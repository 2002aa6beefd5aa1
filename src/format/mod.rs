//! Text formats and the collaborators attached to each.
//!
//! A document is edited in one [`TextFormat`]. The format decides which
//! converter renders it, which highlighter colors it, which action bar the
//! editor shows, and which list patterns the auto-formatter uses.

mod detect;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::autoformat::{AutoFormatter, IndentUnit, PrefixPatterns};
use crate::error::{Error, Result};

pub use detect::{detect_format, is_text_file, looks_like_text};

/// Supported markup dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    #[default]
    Markdown,
    TodoTxt,
    ZimWiki,
    Txt2tags,
    KeyValue,
    Plaintext,
}

/// Renders a document for viewing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Converter {
    Markdown,
    TodoTxt,
    ZimWiki,
    Txt2tags,
    KeyValue,
    Plaintext,
}

/// Colors a document while editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Highlighter {
    Markdown,
    TodoTxt,
    ZimWiki,
    Txt2tags,
    KeyValue,
    Plaintext,
}

/// Editor action bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionSet {
    Markdown,
    TodoTxt,
    ZimWiki,
    Txt2tags,
    Plaintext,
}

/// Everything attached to a document for one format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormatBinding {
    pub format: TextFormat,
    pub converter: Converter,
    pub highlighter: Highlighter,
    pub actions: ActionSet,
}

impl TextFormat {
    /// Order in which formats claim files during detection.
    pub const DETECTION_ORDER: [Self; 6] = [
        Self::Markdown,
        Self::TodoTxt,
        Self::ZimWiki,
        Self::Txt2tags,
        Self::KeyValue,
        Self::Plaintext,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            Self::Markdown => "markdown",
            Self::TodoTxt => "todotxt",
            Self::ZimWiki => "zimwiki",
            Self::Txt2tags => "txt2tags",
            Self::KeyValue => "keyvalue",
            Self::Plaintext => "plaintext",
        }
    }

    /// Look up a format by identifier, falling back to Markdown.
    pub fn from_id_or_default(id: &str) -> Self {
        id.parse().unwrap_or_default()
    }

    pub const fn binding(self) -> FormatBinding {
        let (converter, highlighter, actions) = match self {
            Self::Plaintext => (Converter::Plaintext, Highlighter::Plaintext, ActionSet::Plaintext),
            Self::TodoTxt => (Converter::TodoTxt, Highlighter::TodoTxt, ActionSet::TodoTxt),
            // Key-value files have no dedicated action bar.
            Self::KeyValue => (Converter::KeyValue, Highlighter::KeyValue, ActionSet::Plaintext),
            Self::ZimWiki => (Converter::ZimWiki, Highlighter::ZimWiki, ActionSet::ZimWiki),
            Self::Txt2tags => (Converter::Txt2tags, Highlighter::Txt2tags, ActionSet::Txt2tags),
            Self::Markdown => (Converter::Markdown, Highlighter::Markdown, ActionSet::Markdown),
        };
        FormatBinding {
            format: self,
            converter,
            highlighter,
            actions,
        }
    }

    /// List patterns for formats that auto-continue lists.
    pub fn prefix_patterns(self) -> Option<&'static PrefixPatterns> {
        match self {
            Self::Markdown => Some(PrefixPatterns::markdown()),
            Self::ZimWiki => Some(PrefixPatterns::zimwiki()),
            Self::Txt2tags => Some(PrefixPatterns::txt2tags()),
            Self::TodoTxt | Self::KeyValue | Self::Plaintext => None,
        }
    }

    /// Input filter for this format, if it has list patterns.
    pub fn auto_formatter(self, indent: IndentUnit) -> Option<AutoFormatter> {
        self.prefix_patterns()
            .map(|patterns| AutoFormatter::new(patterns.clone(), indent))
    }
}

impl fmt::Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for TextFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "todotxt" | "todo.txt" | "todo" => Ok(Self::TodoTxt),
            "zimwiki" | "zim" => Ok(Self::ZimWiki),
            "txt2tags" | "t2t" => Ok(Self::Txt2tags),
            "keyvalue" | "key-value" | "kv" => Ok(Self::KeyValue),
            "plaintext" | "plain" | "txt" => Ok(Self::Plaintext),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_table() {
        let rows = [
            (TextFormat::Plaintext, Converter::Plaintext, Highlighter::Plaintext, ActionSet::Plaintext),
            (TextFormat::TodoTxt, Converter::TodoTxt, Highlighter::TodoTxt, ActionSet::TodoTxt),
            (TextFormat::KeyValue, Converter::KeyValue, Highlighter::KeyValue, ActionSet::Plaintext),
            (TextFormat::ZimWiki, Converter::ZimWiki, Highlighter::ZimWiki, ActionSet::ZimWiki),
            (TextFormat::Txt2tags, Converter::Txt2tags, Highlighter::Txt2tags, ActionSet::Txt2tags),
            (TextFormat::Markdown, Converter::Markdown, Highlighter::Markdown, ActionSet::Markdown),
        ];
        for (format, converter, highlighter, actions) in rows {
            let binding = format.binding();
            assert_eq!(binding.format, format);
            assert_eq!(binding.converter, converter, "{format}");
            assert_eq!(binding.highlighter, highlighter, "{format}");
            assert_eq!(binding.actions, actions, "{format}");
        }
    }

    #[test]
    fn test_unknown_id_defaults_to_markdown() {
        assert_eq!(TextFormat::from_id_or_default("rst"), TextFormat::Markdown);
        assert_eq!(TextFormat::from_id_or_default("zimwiki"), TextFormat::ZimWiki);
        assert_eq!(TextFormat::default(), TextFormat::Markdown);
    }

    #[test]
    fn test_id_round_trips_through_parse() {
        for format in TextFormat::DETECTION_ORDER {
            assert_eq!(format.to_string().parse::<TextFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_parse_aliases_case_insensitive() {
        assert_eq!("MD".parse::<TextFormat>().unwrap(), TextFormat::Markdown);
        assert_eq!("t2t".parse::<TextFormat>().unwrap(), TextFormat::Txt2tags);
        assert!(matches!(
            "docx".parse::<TextFormat>(),
            Err(Error::UnknownFormat(name)) if name == "docx"
        ));
    }

    #[test]
    fn test_only_list_formats_have_auto_formatter() {
        assert!(TextFormat::Markdown.auto_formatter(IndentUnit::Tab).is_some());
        assert!(TextFormat::ZimWiki.auto_formatter(IndentUnit::Tab).is_some());
        assert!(TextFormat::Txt2tags.auto_formatter(IndentUnit::Tab).is_some());
        assert!(TextFormat::TodoTxt.auto_formatter(IndentUnit::Tab).is_none());
        assert!(TextFormat::KeyValue.auto_formatter(IndentUnit::Tab).is_none());
        assert!(TextFormat::Plaintext.auto_formatter(IndentUnit::Tab).is_none());
    }

    #[test]
    fn test_txt2tags_formatter_continues_checkbox() {
        let fmt = TextFormat::Txt2tags.auto_formatter(IndentUnit::Tab).unwrap();
        let text = "[*] important";
        let event = crate::autoformat::EditEvent::insert(text, text.len(), "\n");
        assert_eq!(fmt.filter(&event).apply(&event), "[*] important\n[ ] ");
    }

    #[test]
    fn test_binding_serializes_lowercase() {
        let json = serde_json::to_string(&TextFormat::KeyValue.binding()).unwrap();
        assert_eq!(
            json,
            r#"{"format":"keyvalue","converter":"keyvalue","highlighter":"keyvalue","actions":"plaintext"}"#
        );
    }
}
