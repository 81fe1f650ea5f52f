//! Markdown page parsing and normalisation.
//!
//! Turns the raw text of one documentation file into a [`Document`]:
//!
//! 1. Split an optional leading YAML front-matter block from the body.
//! 2. Strip Jekyll/Liquid directives (`{% ... %}`, `{{ ... }}`, comment
//!    blocks) and HTML comments from the body.
//! 3. Collapse runs of more than two blank lines and trim.
//! 4. Derive `title`, `description`, `section`, `url`, and `content_hash`.
//!
//! Everything here is pure: the same path and text always produce the
//! same document. Reading files is the caller's job.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::error::ParseError;
use crate::models::{Document, ROOT_SECTION};

/// Public documentation site the `url` field points into.
pub const DEFAULT_URL_BASE: &str = "https://spark.apache.org/docs/latest";

/// File extensions treated as documentation pages.
pub const DOC_EXTENSIONS: [&str; 2] = ["md", "markdown"];

// Order matters: comment blocks must go before the generic tag pattern
// eats their delimiters.
static LIQUID_COMMENT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\{%-?\s*comment\s*-?%\}.*?\{%-?\s*endcomment\s*-?%\}").unwrap()
});
static LIQUID_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{%.*?%\}").unwrap());
static LIQUID_OUTPUT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{\{.*?\}\}").unwrap());
static HTML_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// Metadata read from a front-matter block.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl FrontMatter {
    /// Reads `title` and `description` (or `summary`) from a YAML block.
    ///
    /// YAML that does not parse, or is not a mapping, yields empty
    /// metadata: the body is still recoverable in that case.
    pub fn from_yaml(yaml: &str) -> Self {
        match serde_yaml::from_str::<serde_yaml::Value>(yaml) {
            Ok(serde_yaml::Value::Mapping(map)) => Self {
                title: string_field(&map, &["title"]),
                description: string_field(&map, &["description", "summary"]),
            },
            Ok(_) => Self::default(),
            Err(e) => {
                tracing::debug!("ignoring unparseable front matter: {}", e);
                Self::default()
            }
        }
    }
}

fn string_field(map: &serde_yaml::Mapping, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        map.get(*key)
            .and_then(|value| value.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

/// Parse one documentation page.
///
/// `relative_path` is the forward-slash path from the documentation root
/// and becomes the document's identity.
pub fn parse_markdown(
    relative_path: &str,
    raw: &str,
    url_base: &str,
) -> Result<Document, ParseError> {
    if relative_path.is_empty() || relative_path.starts_with('/') {
        return Err(ParseError::OutsideRoot(relative_path.to_string()));
    }

    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    let normalized = raw.replace("\r\n", "\n");
    let (front_matter, body) = split_front_matter(&normalized);

    let content = clean_content(body);
    if content.is_empty() {
        return Err(ParseError::EmptyBody);
    }

    let title = front_matter
        .title
        .or_else(|| first_heading(&content))
        .unwrap_or_else(|| title_from_filename(relative_path));

    Ok(Document {
        path: relative_path.to_string(),
        title,
        description: front_matter.description,
        section: section_for(relative_path),
        url: compute_url(relative_path, url_base),
        content_hash: content_hash(&content),
        content,
    })
}

/// Split a leading `---` delimited front-matter block from the body.
///
/// Text without an opening delimiter is all body. So is text whose
/// opening `---` is never closed by a `---` (or `...`) line: that is a
/// markdown thematic break, not metadata.
pub fn split_front_matter(text: &str) -> (FrontMatter, &str) {
    let Some(rest) = text.strip_prefix("---") else {
        return (FrontMatter::default(), text);
    };

    let (opening_tail, after_open) = rest.split_once('\n').unwrap_or((rest, ""));
    if !opening_tail.trim().is_empty() {
        // `----` rule or `--- text`, not a delimiter
        return (FrontMatter::default(), text);
    }

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if trimmed == "---" || trimmed == "..." {
            let yaml = &after_open[..offset];
            let body = &after_open[offset + line.len()..];
            return (FrontMatter::from_yaml(yaml), body);
        }
        offset += line.len();
    }

    tracing::debug!("no closing front-matter delimiter; treating whole file as body");
    (FrontMatter::default(), text)
}

/// Strip templating artifacts, collapse blank-line runs, and trim.
pub fn clean_content(body: &str) -> String {
    let text = LIQUID_COMMENT_BLOCK.replace_all(body, "");
    let text = LIQUID_TAG.replace_all(&text, "");
    let text = LIQUID_OUTPUT.replace_all(&text, "");
    let text = HTML_COMMENT.replace_all(&text, "");

    collapse_blank_lines(&text).trim().to_string()
}

/// Keep at most two consecutive blank lines.
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;

    for line in text.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 2 {
                continue;
            }
            out.push('\n');
        } else {
            blank_run = 0;
            out.push_str(line);
            out.push('\n');
        }
    }

    out
}

/// First `# ` heading outside fenced code blocks.
fn first_heading(content: &str) -> Option<String> {
    let mut in_fence = false;

    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(rest) = line.strip_prefix("# ") {
            let heading = rest.trim().trim_end_matches('#').trim();
            if !heading.is_empty() {
                return Some(heading.to_string());
            }
        }
    }

    None
}

/// `structured_streaming-guide.md` → `Structured Streaming Guide`.
pub fn title_from_filename(relative_path: &str) -> String {
    let file_name = relative_path.rsplit('/').next().unwrap_or(relative_path);
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file_name,
    };

    let title = stem
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        file_name.to_string()
    } else {
        title
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Top-level directory of `relative_path`, or `root`.
pub fn section_for(relative_path: &str) -> String {
    match relative_path.split_once('/') {
        Some((first, _)) if !first.is_empty() => first.to_string(),
        _ => ROOT_SECTION.to_string(),
    }
}

/// Drop a trailing documentation extension, if any.
pub fn strip_doc_extension(relative_path: &str) -> &str {
    DOC_EXTENSIONS
        .iter()
        .find_map(|ext| {
            relative_path
                .strip_suffix(ext)
                .and_then(|rest| rest.strip_suffix('.'))
        })
        .unwrap_or(relative_path)
}

/// Whether `relative_path` carries a documentation extension.
pub fn is_doc_file(relative_path: &str) -> bool {
    strip_doc_extension(relative_path).len() != relative_path.len()
}

/// Public page URL: `sql-ref/syntax.md` → `<base>/sql-ref/syntax.html`.
pub fn compute_url(relative_path: &str, url_base: &str) -> String {
    format!(
        "{}/{}.html",
        url_base.trim_end_matches('/'),
        strip_doc_extension(relative_path)
    )
}

/// Hex SHA-256 digest of the cleaned content.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
