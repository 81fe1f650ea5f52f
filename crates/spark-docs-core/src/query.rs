//! Query normalisation for full-text search.
//!
//! Raw user text is never handed to the FTS engine as-is. Operators
//! (`AND`, `OR`, `NOT`, `NEAR`), column filters (`title:`), prefix stars,
//! parentheses, and stray quotes would either error or change the meaning
//! of the query. Instead the text is broken into bare alphanumeric terms
//! and each term is emitted as a quoted FTS5 string, so a query is always
//! a plain bag of words combined with implicit AND.
//!
//! Stemming is left to the engine: quoted strings go through the same
//! `porter unicode61` tokenizer as indexed text.

/// Smallest result count a search may request.
pub const MIN_LIMIT: i64 = 1;
/// Largest result count a search may request.
pub const MAX_LIMIT: i64 = 50;
/// Result count used when the caller does not specify one.
pub const DEFAULT_LIMIT: i64 = 10;

/// Clamp a requested result count into `[MIN_LIMIT, MAX_LIMIT]`.
pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(MIN_LIMIT, MAX_LIMIT)
}

/// Lower-cased alphanumeric terms of `raw`, first occurrence order, no
/// duplicates.
pub fn query_terms(raw: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in raw
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
    {
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}

/// Build a safe FTS5 `MATCH` expression from raw user text.
///
/// Returns `None` when the text holds no searchable term at all (for
/// example `"+++"`), in which case the search has nothing to match.
pub fn fts_match_expression(raw: &str) -> Option<String> {
    let terms = query_terms(raw);
    if terms.is_empty() {
        return None;
    }

    let quoted: Vec<String> = terms
        .iter()
        .map(|t| format!("\"{}\"", t.replace('"', "\"\"")))
        .collect();
    Some(quoted.join(" "))
}
