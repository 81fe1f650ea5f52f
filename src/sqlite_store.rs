//! SQLite-backed [`Store`] implementation.
//!
//! Documents live in `documents`; their searchable text is mirrored into
//! the FTS5 table `documents_fts` under the same rowid. Every mutation
//! touches both tables inside a single transaction, so a reader never
//! sees one without the other and a failed write rolls back whole.
//!
//! Ranking uses FTS5 `bm25()` with fixed column weights (title 5.0,
//! description 2.0, content 1.0). `bm25()` is lower-is-better, so the
//! sign is flipped before results leave the store.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use spark_docs_core::models::{Document, IndexStats, SearchHit};
use spark_docs_core::query::fts_match_expression;
use spark_docs_core::store::{
    Store, CONTENT_WEIGHT, DESCRIPTION_WEIGHT, ELLIPSIS, MATCH_END, MATCH_START, TITLE_WEIGHT,
};

use crate::config::{Config, MAX_SNIPPET_TOKENS};
use crate::db;
use crate::migrate;

const DEFAULT_SNIPPET_TOKENS: usize = 48;

/// Per-section document count, for `stats` output.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SectionCount {
    pub section: String,
    pub document_count: i64,
}

/// SQLite implementation of the [`Store`] trait.
///
/// Cheap to share behind an `Arc`: the inner pool handles concurrent
/// readers, and WAL mode lets them proceed during writes.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    snippet_tokens: usize,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            snippet_tokens: DEFAULT_SNIPPET_TOKENS,
        }
    }

    /// Open the configured database, creating the schema if needed.
    pub async fn open(config: &Config) -> Result<Self> {
        let pool = db::connect(config).await?;
        migrate::migrate(&pool).await?;
        Ok(Self::new(pool).with_snippet_tokens(config.search.snippet_tokens))
    }

    /// Open the database at `path`, creating the schema if needed.
    pub async fn open_path(path: &Path) -> Result<Self> {
        let pool = db::connect_path(path).await?;
        migrate::migrate(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Maximum snippet length in tokens, clamped to what FTS5 accepts.
    pub fn with_snippet_tokens(mut self, tokens: usize) -> Self {
        self.snippet_tokens = tokens.clamp(1, MAX_SNIPPET_TOKENS);
        self
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Document counts grouped by section, largest first.
    pub async fn section_counts(&self) -> Result<Vec<SectionCount>> {
        let rows = sqlx::query(
            r#"
            SELECT section, COUNT(*) AS document_count
            FROM documents
            GROUP BY section
            ORDER BY document_count DESC, section ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| SectionCount {
                section: row.get("section"),
                document_count: row.get("document_count"),
            })
            .collect())
    }

    fn search_sql(&self, with_section: bool) -> String {
        let mut sql = format!(
            r#"
            SELECT d.path, d.title, d.url, d.section,
                   snippet(documents_fts, 2, '{MATCH_START}', '{MATCH_END}', '{ELLIPSIS}', {tokens}) AS snippet,
                   bm25(documents_fts, {TITLE_WEIGHT}, {DESCRIPTION_WEIGHT}, {CONTENT_WEIGHT}) AS bm25_score
            FROM documents_fts
            JOIN documents d ON d.id = documents_fts.rowid
            WHERE documents_fts MATCH ?
            "#,
            tokens = self.snippet_tokens,
        );
        if with_section {
            sql.push_str(" AND d.section = ?");
        }
        sql.push_str(" ORDER BY bm25_score ASC, d.path ASC LIMIT ?");
        sql
    }
}

fn row_to_document(row: &SqliteRow) -> Document {
    Document {
        path: row.get("path"),
        title: row.get("title"),
        description: row.get("description"),
        section: row.get("section"),
        url: row.get("url"),
        content: row.get("content"),
        content_hash: row.get("content_hash"),
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn upsert(&self, doc: &Document) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM documents_fts WHERE rowid IN (SELECT id FROM documents WHERE path = ?)",
        )
        .bind(&doc.path)
        .execute(&mut *tx)
        .await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO documents (path, title, description, section, url, content,
                                   content_hash, indexed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(path) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                section = excluded.section,
                url = excluded.url,
                content = excluded.content,
                content_hash = excluded.content_hash,
                indexed_at = excluded.indexed_at
            RETURNING id
            "#,
        )
        .bind(&doc.path)
        .bind(&doc.title)
        .bind(&doc.description)
        .bind(&doc.section)
        .bind(&doc.url)
        .bind(&doc.content)
        .bind(&doc.content_hash)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO documents_fts (rowid, title, description, content) VALUES (?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&doc.title)
        .bind(&doc.description)
        .bind(&doc.content)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM documents_fts WHERE rowid IN (SELECT id FROM documents WHERE path = ?)",
        )
        .bind(path)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM documents WHERE path = ?")
            .bind(path)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM documents_fts")
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM documents")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Document>> {
        let row = sqlx::query(
            "SELECT path, title, description, section, url, content, content_hash FROM documents WHERE path = ?",
        )
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(row_to_document))
    }

    async fn search(
        &self,
        query: &str,
        section: Option<&str>,
        limit: i64,
    ) -> Result<Vec<SearchHit>> {
        let Some(match_expr) = fts_match_expression(query) else {
            return Ok(Vec::new());
        };

        let sql = self.search_sql(section.is_some());
        let mut q = sqlx::query(&sql).bind(match_expr);
        if let Some(section) = section {
            q = q.bind(section);
        }

        let rows = q.bind(limit.max(0)).fetch_all(&self.pool).await?;

        let hits = rows
            .iter()
            .map(|row| {
                let bm25_score: f64 = row.get("bm25_score");
                SearchHit {
                    path: row.get("path"),
                    title: row.get("title"),
                    url: row.get("url"),
                    section: row.get("section"),
                    snippet: row.get("snippet"),
                    relevance_score: -bm25_score,
                }
            })
            .collect();

        Ok(hits)
    }

    async fn stats(&self) -> Result<IndexStats> {
        let document_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;

        Ok(IndexStats { document_count })
    }

    async fn content_hashes(&self) -> Result<HashMap<String, String>> {
        let rows = sqlx::query("SELECT path, content_hash FROM documents")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| (row.get("path"), row.get("content_hash")))
            .collect())
    }
}
