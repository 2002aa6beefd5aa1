//! Picking a format from a file's name and first lines.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use super::TextFormat;

const MARKDOWN_EXTENSIONS: &[&str] = &[
    "md", "markdown", "mkd", "mdown", "mkdn", "mdwn", "mdtext", "rmd",
];

const KEYVALUE_EXTENSIONS: &[&str] = &[
    "json", "yaml", "yml", "toml", "ini", "properties", "conf", "cfg", "env", "vcf", "ics", "csv",
];

const PLAINTEXT_EXTENSIONS: &[&str] = &[
    "txt", "text", "log", "rs", "py", "sh", "c", "h", "cpp", "java", "kt", "js", "ts", "go",
    "html", "css", "xml", "tex", "diff", "patch",
];

/// First line of a ZimWiki page.
const ZIM_HEADER: &str = "content-type: text/x-zim-wiki";

/// How many bytes of a file to look at when sniffing for text.
const SNIFF_LEN: usize = 8 * 1024;

fn extension(path: &str) -> Option<&str> {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    name.rsplit_once('.').map(|(_, ext)| ext)
}

fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Whether `format` claims the lowercase `path` (or `head`, the start of
/// the file's content).
fn claims(format: TextFormat, path: &str, head: Option<&str>) -> bool {
    let ext = extension(path);
    let has_ext = |list: &[&str]| ext.is_some_and(|ext| list.contains(&ext));
    match format {
        TextFormat::Markdown => has_ext(MARKDOWN_EXTENSIONS),
        TextFormat::TodoTxt => {
            let name = file_name(path);
            matches!(name, "todo.txt" | "done.txt")
                || name.ends_with(".todo.txt")
                || name.ends_with(".done.txt")
        }
        TextFormat::ZimWiki => {
            ext == Some("zim")
                || head.is_some_and(|head| {
                    head.trim_start_matches('\u{feff}')
                        .get(..ZIM_HEADER.len())
                        .is_some_and(|start| start.eq_ignore_ascii_case(ZIM_HEADER))
                })
        }
        TextFormat::Txt2tags => ext == Some("t2t"),
        TextFormat::KeyValue => has_ext(KEYVALUE_EXTENSIONS),
        TextFormat::Plaintext => has_ext(PLAINTEXT_EXTENSIONS),
    }
}

/// Detect the format of `path`, optionally looking at `head`, the first
/// lines of its content.
///
/// Formats are tried in [`TextFormat::DETECTION_ORDER`]; the first one that
/// claims the file wins.
pub fn detect_format(path: &Path, head: Option<&str>) -> Option<TextFormat> {
    let lowered = path.to_string_lossy().to_lowercase();
    let format = TextFormat::DETECTION_ORDER
        .into_iter()
        .find(|format| claims(*format, &lowered, head));
    debug!(path = %path.display(), ?format, "detected format");
    format
}

/// Whether `bytes` (the start of a file) look like text: valid UTF-8,
/// allowing a character cut off at the end, and no NUL bytes.
pub fn looks_like_text(bytes: &[u8]) -> bool {
    if bytes.contains(&0) {
        return false;
    }
    match std::str::from_utf8(bytes) {
        Ok(_) => true,
        Err(err) => err.error_len().is_none(),
    }
}

/// Whether `path` is a text file the editor can open.
///
/// True when a format claims the file name; otherwise the first bytes of
/// the file are sniffed. Unreadable files are not text.
pub fn is_text_file(path: &Path) -> bool {
    if detect_format(path, None).is_some() {
        return true;
    }
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut head = Vec::with_capacity(SNIFF_LEN);
    match file.take(SNIFF_LEN as u64).read_to_end(&mut head) {
        Ok(_) => looks_like_text(&head),
        Err(err) => {
            debug!(path = %path.display(), %err, "failed to sniff file");
            false
        }
    }
}
