//! Noteformat - format detection and list auto-formatting from the shell.
//!
//! # Usage
//!
//! ```bash
//! noteformat detect notes.md --json
//! noteformat renumber todo.md --line 4 --write
//! noteformat type list.md --line 2 --text '\n'
//! ```

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use noteformat::autoformat::IndentUnit;
use noteformat::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use noteformat::editor::EditorBuffer;
use noteformat::format::{FormatBinding, TextFormat, detect_format, is_text_file};

/// Format detection and list auto-formatting for note files
#[derive(Parser, Debug)]
#[command(name = "noteformat", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Use this format instead of detecting one
    #[arg(long, global = true, value_name = "FORMAT")]
    format: Option<TextFormat>,

    /// Indentation unit for the tab key (tab or space)
    #[arg(long, global = true, value_name = "UNIT")]
    indent: Option<IndentUnit>,

    /// Log filter decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Save current command-line flags as defaults
    #[arg(long, global = true)]
    save: bool,

    /// Clear saved defaults
    #[arg(long, global = true)]
    clear: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the detected format and its bindings
    Detect {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Renumber the ordered list around a line
    Renumber {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// 1-based line inside the list
        #[arg(long)]
        line: usize,

        /// Write the result back instead of printing it
        #[arg(long)]
        write: bool,
    },
    /// Type text at a position through the format's input filter
    Type {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// 1-based line to type on
        #[arg(long)]
        line: usize,

        /// Byte column; defaults to the end of the line
        #[arg(long)]
        col: Option<usize>,

        /// Text to insert; `\n`, `\t` and `\\` escapes are understood
        #[arg(long)]
        text: String,

        /// Write the result back instead of printing it
        #[arg(long)]
        write: bool,
    },
}

#[derive(Serialize)]
struct DetectReport<'a> {
    path: &'a Path,
    detected: bool,
    binding: FormatBinding,
    auto_format: bool,
    text_file: bool,
}

/// Number of bytes read for content-based detection.
const HEAD_LEN: usize = 512;

fn read_head(path: &Path) -> Option<String> {
    let file = File::open(path).ok()?;
    let mut head = Vec::with_capacity(HEAD_LEN);
    file.take(HEAD_LEN as u64).read_to_end(&mut head).ok()?;
    Some(String::from_utf8_lossy(&head).into_owned())
}

fn resolve_format(path: &Path, forced: Option<TextFormat>) -> (TextFormat, bool) {
    if let Some(format) = forced {
        return (format, true);
    }
    let head = read_head(path);
    detect_format(path, head.as_deref()).map_or((TextFormat::default(), false), |f| (f, true))
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn load_buffer(path: &Path, flags: &ConfigFlags) -> Result<EditorBuffer> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let (format, _) = resolve_format(path, flags.format);
    tracing::debug!(%format, path = %path.display(), "loaded buffer");
    Ok(EditorBuffer::from_text(&content)
        .with_formatter(format.auto_formatter(flags.indent_or_default())))
}

fn check_line(buffer: &EditorBuffer, line: usize) -> Result<usize> {
    if line == 0 || line > buffer.line_count() {
        anyhow::bail!(
            "Line {line} is out of range (file has {} lines)",
            buffer.line_count()
        );
    }
    Ok(line - 1)
}

fn finish(path: &Path, buffer: &EditorBuffer, write: bool) -> Result<()> {
    if write {
        if buffer.is_dirty() {
            fs::write(path, buffer.text())
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    } else {
        print!("{}", buffer.text());
    }
    Ok(())
}

fn run(command: Command, flags: &ConfigFlags) -> Result<()> {
    match command {
        Command::Detect { file, json } => {
            let (format, detected) = resolve_format(&file, flags.format);
            let report = DetectReport {
                path: &file,
                detected,
                binding: format.binding(),
                auto_format: format.prefix_patterns().is_some(),
                text_file: is_text_file(&file),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let binding = report.binding;
                println!("format:      {format}{}", if detected { "" } else { " (default)" });
                println!("converter:   {:?}", binding.converter);
                println!("highlighter: {:?}", binding.highlighter);
                println!("actions:     {:?}", binding.actions);
                println!("auto-format: {}", report.auto_format);
                println!("text file:   {}", report.text_file);
            }
            Ok(())
        }
        Command::Renumber { file, line, write } => {
            let mut buffer = load_buffer(&file, flags)?;
            let line = check_line(&buffer, line)?;
            buffer.move_to(line, 0);
            if !buffer.renumber_list() {
                tracing::info!("list already numbered");
            }
            finish(&file, &buffer, write)
        }
        Command::Type {
            file,
            line,
            col,
            text,
            write,
        } => {
            let mut buffer = load_buffer(&file, flags)?;
            let line = check_line(&buffer, line)?;
            buffer.move_to(line, col.unwrap_or(usize::MAX));
            buffer.type_text(&unescape(&text));
            finish(&file, &buffer, write)
        }
    }
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&ConfigFlags {
        verbose: cli.verbose,
        format: cli.format,
        indent: cli.indent,
    });

    // Initialize logging
    let level = if effective.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    run(cli.command, &effective).context("noteformat failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"a\nb"), "a\nb");
        assert_eq!(unescape(r"\t"), "\t");
        assert_eq!(unescape(r"back\\slash"), "back\\slash");
        assert_eq!(unescape(r"keep\q"), "keep\\q");
        assert_eq!(unescape("trailing\\"), "trailing\\");
    }

    #[test]
    fn test_read_head_stops_at_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Home.txt");
        let body = format!("Content-Type: text/x-zim-wiki\n{}", "x".repeat(4 * HEAD_LEN));
        fs::write(&path, body).unwrap();

        let head = read_head(&path).unwrap();
        assert_eq!(head.len(), HEAD_LEN);
        assert_eq!(resolve_format(&path, None), (TextFormat::ZimWiki, true));
        assert!(read_head(&dir.path().join("missing")).is_none());
    }

    #[test]
    fn test_forced_format_wins() {
        let (format, detected) = resolve_format(Path::new("x.md"), Some(TextFormat::ZimWiki));
        assert_eq!(format, TextFormat::ZimWiki);
        assert!(detected);
    }

    #[test]
    fn test_unknown_file_defaults_to_markdown() {
        let (format, detected) = resolve_format(Path::new("does-not-exist.xyz"), None);
        assert_eq!(format, TextFormat::Markdown);
        assert!(!detected);
    }

    #[test]
    fn test_cli_parses_type_command() {
        let cli = Cli::try_parse_from([
            "noteformat", "type", "list.md", "--line", "2", "--text", r"\n", "--indent", "space",
        ])
        .unwrap();
        assert_eq!(cli.indent, Some(IndentUnit::Space));
        assert!(matches!(cli.command, Command::Type { line: 2, col: None, .. }));
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["noteformat", "detect", "a.md", "--format", "docx"]).is_err());
    }
}
