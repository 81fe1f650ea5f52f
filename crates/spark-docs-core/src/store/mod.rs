//! Storage abstraction for the documentation index.
//!
//! The [`Store`] trait is the only way the indexing pipeline and the query
//! service touch persisted documents. Every mutating call is one
//! consistency unit: an implementation must never expose a document
//! without its searchable terms, or searchable terms without the
//! document.
//!
//! Implementations must be `Send + Sync`; a single store is opened once
//! per process and shared by reference.

pub mod memory;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Document, IndexStats, SearchHit};

/// BM25 weight of the `title` column.
pub const TITLE_WEIGHT: f64 = 5.0;
/// BM25 weight of the `description` column.
pub const DESCRIPTION_WEIGHT: f64 = 2.0;
/// BM25 weight of the `content` column.
pub const CONTENT_WEIGHT: f64 = 1.0;

/// Opening marker around matched terms in snippets.
pub const MATCH_START: &str = "<mark>";
/// Closing marker around matched terms in snippets.
pub const MATCH_END: &str = "</mark>";
/// Marker for text elided from either side of a snippet.
pub const ELLIPSIS: &str = "...";

/// Abstract storage backend.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`upsert`](Store::upsert) | Insert or replace a document by path |
/// | [`delete`](Store::delete) | Remove a document; no-op when absent |
/// | [`clear`](Store::clear) | Remove everything (full rebuild) |
/// | [`get`](Store::get) | Exact lookup by path |
/// | [`search`](Store::search) | Ranked full-text search |
/// | [`stats`](Store::stats) | Document count |
/// | [`content_hashes`](Store::content_hashes) | `path → content_hash` for change detection |
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert `doc`, or replace the stored document with the same path.
    async fn upsert(&self, doc: &Document) -> Result<()>;

    /// Remove the document at `path` and its index entries.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Remove all documents and index entries.
    async fn clear(&self) -> Result<()>;

    async fn get(&self, path: &str) -> Result<Option<Document>>;

    /// Rank documents against `query`, best first.
    ///
    /// `query` is raw user text; implementations neutralise any search
    /// syntax in it. `section`, when given, must match exactly.
    /// Returned `relevance_score`s are non-increasing.
    async fn search(
        &self,
        query: &str,
        section: Option<&str>,
        limit: i64,
    ) -> Result<Vec<SearchHit>>;

    async fn stats(&self) -> Result<IndexStats>;

    /// Every stored path with its `content_hash`.
    async fn content_hashes(&self) -> Result<HashMap<String, String>>;
}
