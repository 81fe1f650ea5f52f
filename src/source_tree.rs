//! Walking a materialised documentation tree.
//!
//! The tree is a local directory; how it got there is somebody else's
//! problem. Only `.md`/`.markdown` files are considered, further narrowed
//! by include/exclude globs matched against the forward-slash path
//! relative to the root.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use spark_docs_core::error::ParseError;
use spark_docs_core::models::Document;
use spark_docs_core::parse::{is_doc_file, parse_markdown};

use crate::config::SourceConfig;

/// Always excluded, in addition to the configured `exclude_globs`.
pub const DEFAULT_EXCLUDES: [&str; 3] = ["**/.git/**", "**/_site/**", "**/node_modules/**"];

/// List every documentation file under `root`, sorted by path.
///
/// Fails if `root` is missing or not a directory, or if any part of the
/// walk cannot be read. A partial listing is never returned, because the
/// caller uses it to decide which stored documents to remove.
pub fn scan_source_tree(root: &Path, config: &SourceConfig) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        bail!("Source directory does not exist: {}", root.display());
    }
    if !root.is_dir() {
        bail!("Source path is not a directory: {}", root.display());
    }

    let include_set = build_globset(&config.include_globs)?;

    let mut excludes: Vec<String> = DEFAULT_EXCLUDES.iter().map(|s| s.to_string()).collect();
    excludes.extend(config.exclude_globs.iter().cloned());
    let exclude_set = build_globset(&excludes)?;

    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(config.follow_symlinks) {
        let entry =
            entry.with_context(|| format!("Failed to walk source tree: {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(rel) = relative_path(entry.path(), root) else {
            continue;
        };

        if !is_doc_file(&rel) || exclude_set.is_match(&rel) || !include_set.is_match(&rel) {
            continue;
        }

        files.push(entry.into_path());
    }

    files.sort();
    Ok(files)
}

/// Forward-slash path of `file` relative to `root`, or `None` if `file`
/// is not under `root`.
pub fn relative_path(file: &Path, root: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    if parts.is_empty() {
        return None;
    }
    Some(parts.join("/"))
}

/// Read and parse one file of the tree.
pub fn read_document(file: &Path, root: &Path, url_base: &str) -> Result<Document, ParseError> {
    let rel = relative_path(file, root)
        .ok_or_else(|| ParseError::OutsideRoot(file.display().to_string()))?;

    let bytes = std::fs::read(file)?;
    let raw = String::from_utf8(bytes).map_err(|_| ParseError::NotUtf8)?;

    parse_markdown(&rel, &raw, url_base)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).with_context(|| format!("Invalid glob: {}", pattern))?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn rel_names(files: &[PathBuf], root: &Path) -> Vec<String> {
        files
            .iter()
            .map(|f| relative_path(f, root).unwrap())
            .collect()
    }

    #[test]
    fn test_scan_selects_markdown_and_sorts() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "sql-ref/syntax.md", "# Syntax\n");
        write(root, "index.md", "# Home\n");
        write(root, "notes.markdown", "# Notes\n");
        write(root, "img/logo.png", "png");
        write(root, "_site/index.md", "# Built\n");
        write(root, ".git/HEAD.md", "ref\n");

        let files = scan_source_tree(root, &SourceConfig::default()).unwrap();
        assert_eq!(
            rel_names(&files, root),
            vec!["index.md", "notes.markdown", "sql-ref/syntax.md"]
        );
    }

    #[test]
    fn test_scan_honours_exclude_globs() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write(root, "api/python/index.md", "# Py\n");
        write(root, "streaming/index.md", "# Streaming\n");

        let config = SourceConfig {
            exclude_globs: vec!["api/**".to_string()],
            ..SourceConfig::default()
        };
        let files = scan_source_tree(root, &config).unwrap();
        assert_eq!(rel_names(&files, root), vec!["streaming/index.md"]);
    }

    #[test]
    fn test_scan_missing_root_fails() {
        let tmp = TempDir::new().unwrap();
        let err = scan_source_tree(&tmp.path().join("absent"), &SourceConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_scan_file_root_fails() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "single.md", "# One\n");
        let err = scan_source_tree(&tmp.path().join("single.md"), &SourceConfig::default())
            .unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn test_relative_path_uses_forward_slashes() {
        let root = Path::new("/docs");
        let file = root.join("mllib").join("guide.md");
        assert_eq!(relative_path(&file, root).as_deref(), Some("mllib/guide.md"));
        assert_eq!(relative_path(Path::new("/elsewhere/a.md"), root), None);
        assert_eq!(relative_path(root, root), None);
    }

    #[test]
    fn test_read_document_rejects_invalid_utf8() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("bad.md");
        fs::write(&file, [0x23, 0x20, 0xff, 0xfe, 0x0a]).unwrap();

        let err = read_document(&file, tmp.path(), "https://example.org").unwrap_err();
        assert!(matches!(err, ParseError::NotUtf8));
    }

    #[test]
    fn test_read_document_derives_identity() {
        let tmp = TempDir::new().unwrap();
        write(
            tmp.path(),
            "structured-streaming/programming-guide.md",
            "---\ntitle: Structured Streaming Programming Guide\n---\nWatermarks bound state.\n",
        );

        let doc = read_document(
            &tmp.path().join("structured-streaming/programming-guide.md"),
            tmp.path(),
            "https://spark.apache.org/docs/latest",
        )
        .unwrap();
        assert_eq!(doc.path, "structured-streaming/programming-guide.md");
        assert_eq!(doc.section, "structured-streaming");
        assert_eq!(doc.title, "Structured Streaming Programming Guide");
        assert_eq!(
            doc.url,
            "https://spark.apache.org/docs/latest/structured-streaming/programming-guide.html"
        );
    }

    #[test]
    fn test_read_document_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = read_document(&tmp.path().join("gone.md"), tmp.path(), "https://x")
            .unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
    }
}
