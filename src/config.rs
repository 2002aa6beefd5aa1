use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::autoformat::IndentUnit;
use crate::format::TextFormat;

/// Defaults read from config files and the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub verbose: bool,
    /// Format to use instead of detecting one from the file name.
    pub format: Option<TextFormat>,
    pub indent: Option<IndentUnit>,
}

impl ConfigFlags {
    /// Merge two flag sets; options in `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            verbose: self.verbose || other.verbose,
            format: other.format.or(self.format),
            indent: other.indent.or(self.indent),
        }
    }

    pub fn indent_or_default(&self) -> IndentUnit {
        self.indent.unwrap_or_default()
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("noteformat").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("noteformat")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("noteformat").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("noteformat")
                .join("config");
        }
    }

    PathBuf::from(".noteformatrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".noteformatrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# noteformat defaults (saved with --save)".to_string());
    if flags.verbose {
        lines.push("--verbose".to_string());
    }
    if let Some(format) = flags.format {
        lines.push(format!("--format {format}"));
    }
    if let Some(indent) = flags.indent {
        lines.push(format!("--indent {indent}"));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the flags this crate knows out of `tokens`, ignoring the rest.
///
/// Unparsable values are skipped with a warning rather than failing, so a
/// stale config file never blocks editing.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--verbose" || token == "-v" {
            flags.verbose = true;
        } else if token == "--format" {
            if let Some(next) = tokens.get(i + 1) {
                flags.format = parse_value(token, next).or(flags.format);
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--format=") {
            flags.format = parse_value("--format", value).or(flags.format);
        } else if token == "--indent" {
            if let Some(next) = tokens.get(i + 1) {
                flags.indent = parse_value(token, next).or(flags.indent);
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--indent=") {
            flags.indent = parse_value("--indent", value).or(flags.indent);
        }
        i += 1;
    }
    flags
}

fn parse_value<T>(flag: &str, value: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            tracing::warn!(flag, value, %err, "ignoring invalid config value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = vec![
            "noteformat".to_string(),
            "--verbose".to_string(),
            "--format".to_string(),
            "zimwiki".to_string(),
            "--indent=space".to_string(),
            "notes.txt".to_string(),
        ];
        let flags = parse_flag_tokens(&args);
        assert!(flags.verbose);
        assert_eq!(flags.format, Some(TextFormat::ZimWiki));
        assert_eq!(flags.indent, Some(IndentUnit::Space));
    }

    #[test]
    fn test_parse_flag_tokens_skips_invalid_values() {
        let args = vec![
            "--format=markdown".to_string(),
            "--format".to_string(),
            "docx".to_string(),
            "--indent".to_string(),
            "four".to_string(),
        ];
        let flags = parse_flag_tokens(&args);
        assert_eq!(flags.format, Some(TextFormat::Markdown));
        assert_eq!(flags.indent, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            verbose: true,
            format: Some(TextFormat::Txt2tags),
            indent: Some(IndentUnit::Space),
        };
        let cli = ConfigFlags {
            format: Some(TextFormat::Markdown),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.verbose);
        assert_eq!(merged.format, Some(TextFormat::Markdown));
        assert_eq!(merged.indent_or_default(), IndentUnit::Space);
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(".noteformatrc");
        let flags = ConfigFlags {
            verbose: true,
            format: Some(TextFormat::TodoTxt),
            indent: Some(IndentUnit::Tab),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempdir().unwrap();
        let loaded = load_config_flags(&dir.path().join("absent")).unwrap();
        assert_eq!(loaded, ConfigFlags::default());
    }
}
