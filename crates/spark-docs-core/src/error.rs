//! Parse failure kinds.
//!
//! A [`ParseError`] never aborts an indexing run: the pipeline logs it,
//! counts the file as skipped, and moves on.

use thiserror::Error;

/// Why a documentation file could not become a [`Document`](crate::Document).
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("file is not valid UTF-8")]
    NotUtf8,

    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("document body is empty after cleaning")]
    EmptyBody,

    #[error("file is not under the documentation root: {0}")]
    OutsideRoot(String),
}
