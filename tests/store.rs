//! SqliteStore behaviour against a real on-disk database.

use spark_docs_core::parse::{compute_url, content_hash, section_for, DEFAULT_URL_BASE};
use spark_docs_core::{Document, Store};
use spark_docs_index::sqlite_store::SqliteStore;
use tempfile::TempDir;

async fn open_store() -> (TempDir, SqliteStore) {
    let tmp = TempDir::new().unwrap();
    let store = SqliteStore::open_path(&tmp.path().join("index.sqlite"))
        .await
        .unwrap();
    (tmp, store)
}

fn doc(path: &str, title: &str, content: &str) -> Document {
    Document {
        path: path.to_string(),
        title: title.to_string(),
        description: None,
        section: section_for(path),
        url: compute_url(path, DEFAULT_URL_BASE),
        content: content.to_string(),
        content_hash: content_hash(content),
    }
}

#[tokio::test]
async fn test_upsert_get_round_trip() {
    let (_tmp, store) = open_store().await;
    let mut d = doc("sql-ref/syntax.md", "SQL Syntax", "SELECT retrieves rows.");
    d.description = Some("Reference for SQL statements".to_string());

    store.upsert(&d).await.unwrap();

    assert_eq!(store.get("sql-ref/syntax.md").await.unwrap(), Some(d));
    assert_eq!(store.get("sql-ref/other.md").await.unwrap(), None);
    assert_eq!(store.stats().await.unwrap().document_count, 1);
}

#[tokio::test]
async fn test_upsert_replaces_and_reindexes() {
    let (_tmp, store) = open_store().await;
    store
        .upsert(&doc("a.md", "A", "caching strategies"))
        .await
        .unwrap();
    store
        .upsert(&doc("a.md", "A", "broadcast joins"))
        .await
        .unwrap();

    assert_eq!(store.stats().await.unwrap().document_count, 1);
    assert!(store.search("caching", None, 10).await.unwrap().is_empty());
    assert_eq!(store.search("broadcast", None, 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_removes_index_entries() {
    let (_tmp, store) = open_store().await;
    store
        .upsert(&doc("a.md", "A", "shuffle partitions"))
        .await
        .unwrap();

    store.delete("a.md").await.unwrap();
    store.delete("a.md").await.unwrap();

    assert_eq!(store.get("a.md").await.unwrap(), None);
    assert!(store.search("shuffle", None, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_clear_empties_everything() {
    let (_tmp, store) = open_store().await;
    store.upsert(&doc("a.md", "A", "alpha")).await.unwrap();
    store.upsert(&doc("b/b.md", "B", "alpha")).await.unwrap();

    store.clear().await.unwrap();

    assert_eq!(store.stats().await.unwrap().document_count, 0);
    assert!(store.search("alpha", None, 10).await.unwrap().is_empty());
    assert!(store.content_hashes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_section_filter_is_exact() {
    let (_tmp, store) = open_store().await;
    store
        .upsert(&doc("mllib/guide.md", "MLlib", "pipelines and estimators"))
        .await
        .unwrap();
    store
        .upsert(&doc("mllib-guide/intro.md", "Intro", "pipelines overview"))
        .await
        .unwrap();

    let hits = store.search("pipelines", Some("mllib"), 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].path, "mllib/guide.md");

    assert!(store
        .search("pipelines", Some("MLlib"), 10)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_title_match_outranks_body_match() {
    let (_tmp, store) = open_store().await;
    store
        .upsert(&doc("a.md", "Checkpointing", "How state is saved to storage."))
        .await
        .unwrap();
    store
        .upsert(&doc("b.md", "Fault Tolerance", "Enable checkpointing for recovery."))
        .await
        .unwrap();

    let hits = store.search("checkpointing", None, 10).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].path, "a.md");
    assert!(hits[0].relevance_score > hits[1].relevance_score);
}

#[tokio::test]
async fn test_porter_stemming() {
    let (_tmp, store) = open_store().await;
    store
        .upsert(&doc("ss.md", "Guide", "Spark supports streaming queries."))
        .await
        .unwrap();

    for query in ["stream", "streams", "streaming"] {
        let hits = store.search(query, None, 10).await.unwrap();
        assert_eq!(hits.len(), 1, "query {:?} should match", query);
    }
}

#[tokio::test]
async fn test_snippet_marks_match() {
    let (_tmp, store) = open_store().await;
    store
        .upsert(&doc(
            "ss.md",
            "Guide",
            "Late data is handled by the watermark which tracks event time.",
        ))
        .await
        .unwrap();

    let hits = store.search("watermark", None, 10).await.unwrap();
    assert!(hits[0].snippet.contains("<mark>watermark</mark>"));
}

#[tokio::test]
async fn test_operator_syntax_is_neutralised() {
    let (_tmp, store) = open_store().await;
    store
        .upsert(&doc("a.md", "Joins", "Use a broadcast join for small tables."))
        .await
        .unwrap();

    for query in [
        "broadcast AND",
        "\"join",
        "NEAR(broadcast join)",
        "title:joins",
        "join*",
        "-broadcast",
        "^small",
    ] {
        let result = store.search(query, None, 10).await;
        assert!(result.is_ok(), "query {:?} errored: {:?}", query, result);
    }

    assert!(store.search("()*\"", None, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_limit_and_ordering() {
    let (_tmp, store) = open_store().await;
    for i in 0..60 {
        store
            .upsert(&doc(
                &format!("bulk/page{:02}.md", i),
                "Page",
                "executor memory tuning",
            ))
            .await
            .unwrap();
    }

    let hits = store.search("executor", None, 50).await.unwrap();
    assert_eq!(hits.len(), 50);
    for pair in hits.windows(2) {
        assert!(pair[0].relevance_score >= pair[1].relevance_score);
    }
    // Equal scores fall back to path order.
    assert_eq!(hits[0].path, "bulk/page00.md");
}

#[tokio::test]
async fn test_section_counts() {
    let (_tmp, store) = open_store().await;
    store.upsert(&doc("index.md", "Home", "home")).await.unwrap();
    store.upsert(&doc("sql/a.md", "A", "a")).await.unwrap();
    store.upsert(&doc("sql/b.md", "B", "b")).await.unwrap();

    let counts = store.section_counts().await.unwrap();
    assert_eq!(counts[0].section, "sql");
    assert_eq!(counts[0].document_count, 2);
    assert_eq!(counts[1].section, "root");
}
