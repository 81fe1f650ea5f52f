//! Core data models shared by the parser, stores, and query service.

use serde::Serialize;

/// Section assigned to files that live directly in the documentation root.
pub const ROOT_SECTION: &str = "root";

/// A parsed documentation page, the unit of indexing and retrieval.
///
/// Documents are written only by the indexing pipeline and always as a
/// whole; `path` is the unique key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Forward-slash path relative to the documentation root.
    pub path: String,
    pub title: String,
    /// Front-matter `description`/`summary`, absent when not declared.
    pub description: Option<String>,
    /// Top-level directory of `path`, or [`ROOT_SECTION`].
    pub section: String,
    /// Public page URL derived from `path`. Informational only.
    pub url: String,
    /// Cleaned markdown body. Never empty.
    pub content: String,
    /// Hex SHA-256 of `content`, used for change detection.
    pub content_hash: String,
}

/// One ranked row returned by [`Store::search`](crate::store::Store::search).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub path: String,
    pub title: String,
    pub url: String,
    pub section: String,
    /// Excerpt of `content` with matched terms wrapped in `<mark>` tags.
    pub snippet: String,
    /// Higher is more relevant.
    pub relevance_score: f64,
}

/// Aggregate counts reported by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub document_count: i64,
}
