//! # Spark Docs Core
//!
//! Shared, storage-agnostic logic for the Spark documentation index: the
//! document model, markdown parsing and cleaning, query normalisation,
//! the store abstraction, and the query service that answers `search`
//! and `read` calls.
//!
//! This crate contains no tokio, sqlx, or directory-walking code. The
//! native crate supplies the SQLite-backed [`store::Store`] and the
//! filesystem side of indexing.

pub mod error;
pub mod models;
pub mod parse;
pub mod query;
pub mod service;
pub mod store;

pub use error::ParseError;
pub use models::{Document, IndexStats, SearchHit};
pub use service::{DocsService, QueryError, ReadResponse, SearchResponse};
pub use store::Store;
