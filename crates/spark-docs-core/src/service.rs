//! Query service: the two operations exposed to callers.
//!
//! [`DocsService`] wraps a shared [`Store`] and implements
//! `search_documentation` and `read_documentation`. It owns input
//! validation (empty queries, malformed paths), limit clamping, and the
//! shape of responses. Transports only serialise what it returns.
//!
//! Outcomes are split three ways:
//!
//! - success: [`SearchResponse`] or [`ReadResponse::Found`];
//! - expected absence: [`ReadResponse::NotFound`] with a hint to search;
//! - faults: [`QueryError`], convertible to a structured [`ErrorBody`].

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::models::{Document, SearchHit};
use crate::query::{clamp_limit, DEFAULT_LIMIT};
use crate::store::Store;

/// Hint attached to not-found reads.
pub const NOT_FOUND_SUGGESTION: &str = "Use search_documentation to find valid document paths.";

/// Errors reported by the query service.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("query must not be empty")]
    EmptyQuery,

    #[error("invalid document path: {0}")]
    InvalidPath(String),

    #[error("index store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl QueryError {
    /// Machine-readable error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::EmptyQuery => "invalid_query",
            QueryError::InvalidPath(_) => "invalid_path",
            QueryError::Store(_) => "store_error",
        }
    }

    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            QueryError::EmptyQuery => Some("Provide one or more search terms."),
            QueryError::InvalidPath(_) => Some(NOT_FOUND_SUGGESTION),
            QueryError::Store(_) => None,
        }
    }

    /// Structured form for transports.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.kind().to_string(),
            message: self.to_string(),
            suggestion: self.suggestion().map(str::to_string),
        }
    }
}

/// Serialisable error: kind, message, optional hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// One entry of a [`SearchResponse`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResultView {
    pub title: String,
    pub url: String,
    pub path: String,
    pub section: String,
    pub snippet: String,
    /// Higher is better, rounded to 6 significant digits.
    pub relevance_score: f64,
}

impl From<SearchHit> for SearchResultView {
    fn from(hit: SearchHit) -> Self {
        Self {
            title: hit.title,
            url: hit.url,
            path: hit.path,
            section: hit.section,
            snippet: hit.snippet,
            relevance_score: round_score(hit.relevance_score),
        }
    }
}

/// Significant digits kept in a reported score.
const SCORE_DIGITS: i32 = 6;

// Relative rounding; bm25 scores of very common terms sit near 1e-6.
fn round_score(score: f64) -> f64 {
    if score == 0.0 || !score.is_finite() {
        return score;
    }
    let magnitude = score.abs().log10().floor() as i32;
    let factor = 10f64.powi(SCORE_DIGITS - 1 - magnitude);
    if !factor.is_finite() || factor == 0.0 {
        return score;
    }
    (score * factor).round() / factor
}

/// Response of [`DocsService::search_documentation`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub section_filter: Option<String>,
    pub result_count: usize,
    pub results: Vec<SearchResultView>,
    /// Set only when nothing matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Full document as returned by a successful read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentView {
    pub path: String,
    pub title: String,
    pub description: Option<String>,
    pub section: String,
    pub url: String,
    pub content: String,
}

impl From<Document> for DocumentView {
    fn from(doc: Document) -> Self {
        Self {
            path: doc.path,
            title: doc.title,
            description: doc.description,
            section: doc.section,
            url: doc.url,
            content: doc.content,
        }
    }
}

/// Not-found outcome of a read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotFound {
    pub error: String,
    pub suggestion: String,
}

/// Result of [`DocsService::read_documentation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReadResponse {
    Found(DocumentView),
    NotFound(NotFound),
}

/// Search and read operations over a shared store.
#[derive(Debug)]
pub struct DocsService<S: Store> {
    store: Arc<S>,
    default_limit: i64,
}

impl<S: Store> Clone for DocsService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            default_limit: self.default_limit,
        }
    }
}

impl<S: Store> DocsService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            default_limit: DEFAULT_LIMIT,
        }
    }

    /// Limit applied when a search does not name one. Clamped like any
    /// other limit.
    pub fn with_default_limit(mut self, limit: i64) -> Self {
        self.default_limit = clamp_limit(limit);
        self
    }

    /// Keyword search with optional exact section filter.
    ///
    /// `limit` is clamped into `[1, 50]`; out-of-range values never fail
    /// the call. An empty or whitespace-only `section` means no filter.
    pub async fn search_documentation(
        &self,
        query: &str,
        section: Option<&str>,
        limit: Option<i64>,
    ) -> Result<SearchResponse, QueryError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let section = section.filter(|s| !s.trim().is_empty());
        let limit = clamp_limit(limit.unwrap_or(self.default_limit));

        let hits = self.store.search(trimmed, section, limit).await?;
        tracing::debug!(
            "search {:?} (section={:?}, limit={}) -> {} hits",
            trimmed,
            section,
            limit,
            hits.len()
        );

        let results: Vec<SearchResultView> = hits.into_iter().map(Into::into).collect();
        let message = results
            .is_empty()
            .then(|| format!("No results found for query: '{}'", query));

        Ok(SearchResponse {
            query: query.to_string(),
            section_filter: section.map(str::to_string),
            result_count: results.len(),
            results,
            message,
        })
    }

    /// Full content of the document at `path`.
    pub async fn read_documentation(&self, path: &str) -> Result<ReadResponse, QueryError> {
        let path = normalize_doc_path(path)?;

        match self.store.get(&path).await? {
            Some(doc) => Ok(ReadResponse::Found(doc.into())),
            None => Ok(ReadResponse::NotFound(NotFound {
                error: format!("Document not found: {}", path),
                suggestion: NOT_FOUND_SUGGESTION.to_string(),
            })),
        }
    }
}

/// Validate a caller-supplied document path.
///
/// Accepts `\` separators and a leading `./`; rejects empty, absolute,
/// and parent-relative (`..`) paths.
pub fn normalize_doc_path(raw: &str) -> Result<String, QueryError> {
    let mut path = raw.trim().replace('\\', "/");
    while let Some(rest) = path.strip_prefix("./") {
        path = rest.to_string();
    }

    if path.is_empty() {
        return Err(QueryError::InvalidPath("path must not be empty".to_string()));
    }
    if path.starts_with('/') {
        return Err(QueryError::InvalidPath(format!(
            "{} (paths are relative to the documentation root)",
            raw.trim()
        )));
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(QueryError::InvalidPath(format!(
            "{} (parent segments are not allowed)",
            raw.trim()
        )));
    }

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{parse_markdown, DEFAULT_URL_BASE};
    use crate::store::memory::InMemoryStore;

    async fn service_with(docs: &[(&str, &str)]) -> DocsService<InMemoryStore> {
        let store = InMemoryStore::new();
        for (path, raw) in docs {
            let doc = parse_markdown(path, raw, DEFAULT_URL_BASE).unwrap();
            store.upsert(&doc).await.unwrap();
        }
        DocsService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let service = service_with(&[]).await;
        let err = service
            .search_documentation("   ", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::EmptyQuery));
        assert_eq!(err.to_body().kind, "invalid_query");
    }

    #[tokio::test]
    async fn test_search_shapes_response() {
        let service = service_with(&[
            ("sql-ref/joins.md", "# Joins\n\nJoin two tables."),
            ("streaming/kafka.md", "# Kafka\n\nRead from Kafka topics."),
        ])
        .await;

        let resp = service
            .search_documentation("joins", Some("sql-ref"), Some(5))
            .await
            .unwrap();
        assert_eq!(resp.query, "joins");
        assert_eq!(resp.section_filter.as_deref(), Some("sql-ref"));
        assert_eq!(resp.result_count, 1);
        assert_eq!(resp.results[0].path, "sql-ref/joins.md");
        assert_eq!(
            resp.results[0].url,
            "https://spark.apache.org/docs/latest/sql-ref/joins.html"
        );
        assert!(resp.message.is_none());
    }

    #[tokio::test]
    async fn test_no_results_message() {
        let service = service_with(&[("a.md", "alpha")]).await;
        let resp = service
            .search_documentation("zeppelin", None, None)
            .await
            .unwrap();
        assert_eq!(resp.result_count, 0);
        assert_eq!(
            resp.message.as_deref(),
            Some("No results found for query: 'zeppelin'")
        );
    }

    #[tokio::test]
    async fn test_limit_clamped() {
        let docs: Vec<(String, String)> = (0..60)
            .map(|i| (format!("doc-{i:02}.md"), format!("shuffle partition {i}")))
            .collect();
        let refs: Vec<(&str, &str)> = docs
            .iter()
            .map(|(p, r)| (p.as_str(), r.as_str()))
            .collect();
        let service = service_with(&refs).await;

        let zero = service
            .search_documentation("shuffle", None, Some(0))
            .await
            .unwrap();
        assert_eq!(zero.result_count, 1);

        let huge = service
            .search_documentation("shuffle", None, Some(1000))
            .await
            .unwrap();
        assert_eq!(huge.result_count, 50);

        let default = service
            .search_documentation("shuffle", None, None)
            .await
            .unwrap();
        assert_eq!(default.result_count, 10);
    }

    #[tokio::test]
    async fn test_blank_section_means_no_filter() {
        let service = service_with(&[("a/x.md", "broadcast"), ("b/y.md", "broadcast")]).await;
        let resp = service
            .search_documentation("broadcast", Some(""), None)
            .await
            .unwrap();
        assert_eq!(resp.result_count, 2);
        assert_eq!(resp.section_filter, None);
    }

    #[tokio::test]
    async fn test_read_found() {
        let service = service_with(&[(
            "sql-ref/syntax.md",
            "---\ntitle: SQL Syntax\ndescription: Grammar\n---\nSELECT statements.",
        )])
        .await;

        match service.read_documentation("./sql-ref/syntax.md").await.unwrap() {
            ReadResponse::Found(doc) => {
                assert_eq!(doc.title, "SQL Syntax");
                assert_eq!(doc.description.as_deref(), Some("Grammar"));
                assert_eq!(doc.section, "sql-ref");
                assert_eq!(doc.content, "SELECT statements.");
            }
            other => panic!("expected document, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_read_not_found_is_reported() {
        let service = service_with(&[]).await;
        let resp = service.read_documentation("missing.md").await.unwrap();
        assert_eq!(
            resp,
            ReadResponse::NotFound(NotFound {
                error: "Document not found: missing.md".to_string(),
                suggestion: NOT_FOUND_SUGGESTION.to_string(),
            })
        );

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["suggestion"], NOT_FOUND_SUGGESTION);
    }

    #[test]
    fn test_normalize_doc_path() {
        assert_eq!(normalize_doc_path(" a\\b.md ").unwrap(), "a/b.md");
        assert_eq!(normalize_doc_path("././x.md").unwrap(), "x.md");
        assert!(matches!(
            normalize_doc_path(""),
            Err(QueryError::InvalidPath(_))
        ));
        assert!(matches!(
            normalize_doc_path("/etc/passwd"),
            Err(QueryError::InvalidPath(_))
        ));
        assert!(matches!(
            normalize_doc_path("sql/../../secret.md"),
            Err(QueryError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_score_rounding() {
        let view = SearchResultView::from(SearchHit {
            path: "p.md".into(),
            title: "t".into(),
            url: "u".into(),
            section: "root".into(),
            snippet: "s".into(),
            relevance_score: 1.234_567_89,
        });
        assert!((view.relevance_score - 1.234_57).abs() < 1e-12);
    }

    #[test]
    fn test_tiny_scores_stay_distinct() {
        let title_hit = round_score(1.830_412e-6);
        let body_hit = round_score(1.000_003e-6);
        assert!(title_hit > 0.0);
        assert!(title_hit > body_hit);
        assert!((title_hit - 1.830_41e-6).abs() < 1e-15);
        assert_eq!(round_score(0.0), 0.0);
        assert!(round_score(-2.5e-7) < 0.0);
    }
}
