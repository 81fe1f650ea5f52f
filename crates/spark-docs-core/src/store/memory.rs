//! In-memory [`Store`] implementation for tests and embedders without
//! SQLite.
//!
//! Documents live in a `BTreeMap` behind `std::sync::RwLock`, so every
//! mutation is trivially atomic. Search is a naive scan: words are
//! compared after a crude suffix strip (`-ing`, `-ed`, `-es`, `-s`), all
//! query terms must match, and the score is a weighted term count using
//! the same column weights as the SQLite store. No BM25.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{Document, IndexStats, SearchHit};
use crate::query::query_terms;

use super::{
    Store, CONTENT_WEIGHT, DESCRIPTION_WEIGHT, ELLIPSIS, MATCH_END, MATCH_START, TITLE_WEIGHT,
};

/// Words of context kept in a snippet.
const SNIPPET_WORDS: usize = 24;

/// In-memory store keyed by document path.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    docs: RwLock<BTreeMap<String, Document>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<String, Document>>> {
        self.docs
            .read()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<String, Document>>> {
        self.docs
            .write()
            .map_err(|_| anyhow!("in-memory store lock poisoned"))
    }
}

fn crude_stem(word: &str) -> &str {
    for suffix in ["ing", "ed", "es", "s"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            if stem.chars().count() >= 3 {
                return stem;
            }
        }
    }
    word
}

fn word_matches(word: &str, stems: &[String]) -> bool {
    let normalized = word
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    let stem = crude_stem(&normalized);
    stems.iter().any(|s| s.as_str() == stem)
}

fn count_matches(text: &str, stem: &str) -> usize {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .filter(|w| crude_stem(&w.to_lowercase()) == stem)
        .count()
}

fn make_snippet(content: &str, stems: &[String]) -> String {
    let words: Vec<&str> = content.split_whitespace().collect();
    let first = words
        .iter()
        .position(|&w| word_matches(w, stems))
        .unwrap_or(0);
    let start = first.saturating_sub(SNIPPET_WORDS / 2);
    let end = (start + SNIPPET_WORDS).min(words.len());

    let body: Vec<String> = words[start..end]
        .iter()
        .map(|&w| {
            if word_matches(w, stems) {
                format!("{MATCH_START}{w}{MATCH_END}")
            } else {
                w.to_string()
            }
        })
        .collect();

    let mut snippet = String::new();
    if start > 0 {
        snippet.push_str(ELLIPSIS);
    }
    snippet.push_str(&body.join(" "));
    if end < words.len() {
        snippet.push_str(ELLIPSIS);
    }
    snippet
}

fn score_document(doc: &Document, stems: &[String]) -> Option<f64> {
    let mut score = 0.0;
    for stem in stems {
        let title = count_matches(&doc.title, stem);
        let description = doc
            .description
            .as_deref()
            .map_or(0, |d| count_matches(d, stem));
        let content = count_matches(&doc.content, stem);
        if title + description + content == 0 {
            return None;
        }
        score += TITLE_WEIGHT * title as f64
            + DESCRIPTION_WEIGHT * description as f64
            + CONTENT_WEIGHT * content as f64;
    }
    Some(score)
}

#[async_trait]
impl Store for InMemoryStore {
    async fn upsert(&self, doc: &Document) -> Result<()> {
        self.write()?.insert(doc.path.clone(), doc.clone());
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.write()?.remove(path);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.write()?.clear();
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Option<Document>> {
        Ok(self.read()?.get(path).cloned())
    }

    async fn search(
        &self,
        query: &str,
        section: Option<&str>,
        limit: i64,
    ) -> Result<Vec<SearchHit>> {
        let stems: Vec<String> = query_terms(query)
            .iter()
            .map(|t| crude_stem(t).to_string())
            .collect();
        if stems.is_empty() {
            return Ok(Vec::new());
        }

        let docs = self.read()?;
        let mut hits: Vec<SearchHit> = docs
            .values()
            .filter(|d| section.map_or(true, |s| d.section == s))
            .filter_map(|d| {
                score_document(d, &stems).map(|score| SearchHit {
                    path: d.path.clone(),
                    title: d.title.clone(),
                    url: d.url.clone(),
                    section: d.section.clone(),
                    snippet: make_snippet(&d.content, &stems),
                    relevance_score: score,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.path.cmp(&b.path))
        });
        hits.truncate(limit.max(0) as usize);
        Ok(hits)
    }

    async fn stats(&self) -> Result<IndexStats> {
        Ok(IndexStats {
            document_count: self.read()?.len() as i64,
        })
    }

    async fn content_hashes(&self) -> Result<HashMap<String, String>> {
        Ok(self
            .read()?
            .values()
            .map(|d| (d.path.clone(), d.content_hash.clone()))
            .collect())
    }
}
