//! # Spark Docs Index
//!
//! Full-text index and search over the Apache Spark documentation tree.
//!
//! A materialised checkout of the Spark `docs/` directory is parsed into
//! documents, stored in SQLite with an FTS5 index, and queried through
//! keyword search (BM25, Porter stemming, section filter) or exact reads
//! by path.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ Source tree │──▶│   Parser    │──▶│    SQLite    │
//! │  (*.md)     │   │ front matter│   │ docs + FTS5  │
//! └─────────────┘   └─────────────┘   └──────┬───────┘
//!                                            │
//!                                     ┌──────▼───────┐
//!                                     │ DocsService  │
//!                                     │ search / read│
//!                                     └──────────────┘
//! ```
//!
//! Parsing, query escaping, the [`Store`](spark_docs_core::Store) trait and
//! the query service live in `spark-docs-core`; this crate adds the
//! SQLite store, the directory walk, the indexing pipeline and the CLI.
//!
//! ## Quick Start
//!
//! ```bash
//! spark-docs init
//! spark-docs index --source ./spark/docs
//! spark-docs search "watermark late data" --section structured-streaming
//! spark-docs read structured-streaming/programming-guide.md
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration |
//! | [`db`] | Connection pool |
//! | [`migrate`] | Schema creation |
//! | [`sqlite_store`] | SQLite/FTS5 [`Store`](spark_docs_core::Store) |
//! | [`source_tree`] | Directory walk and file reading |
//! | [`ingest`] | Indexing pipeline |
//! | [`search`], [`get`], [`stats`] | CLI front-ends |

pub mod config;
pub mod db;
pub mod get;
pub mod ingest;
pub mod migrate;
pub mod output;
pub mod search;
pub mod source_tree;
pub mod sqlite_store;
pub mod stats;

pub use spark_docs_core::{
    DocsService, Document, IndexStats, ParseError, QueryError, ReadResponse, SearchHit,
    SearchResponse, Store,
};
