//! Indexing pipeline.
//!
//! Walks the source tree, parses every documentation file and reconciles
//! the result into a [`Store`]: new and changed pages are upserted,
//! unchanged pages are left alone, pages whose file is gone are deleted.
//!
//! The walk always finishes before anything is deleted or cleared, so a
//! missing or unreadable source tree fails the run without touching the
//! store. A single bad file is counted as skipped and never aborts a run.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use spark_docs_core::store::Store;

use crate::config::SourceConfig;
use crate::source_tree::{read_document, relative_path, scan_source_tree};

/// Counts reported at the end of an indexing run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    /// Documents written (new or changed).
    pub indexed: usize,
    /// Documents already stored with identical content.
    pub unchanged: usize,
    /// Files that could not be parsed or written.
    pub skipped: usize,
    /// Stored documents whose file no longer exists.
    pub removed: usize,
}

/// Index `source_dir` into `store`.
///
/// With `rebuild`, the store is cleared first and every file is treated
/// as new; nothing is reported as unchanged or removed.
pub async fn run_index<S>(
    store: &S,
    source_dir: &Path,
    config: &SourceConfig,
    rebuild: bool,
) -> Result<IndexReport>
where
    S: Store + ?Sized,
{
    let files = scan_source_tree(source_dir, config)?;
    tracing::info!(
        "indexing {} files from {} (rebuild={})",
        files.len(),
        source_dir.display(),
        rebuild
    );

    let known = if rebuild {
        store.clear().await.context("Failed to clear index")?;
        Default::default()
    } else {
        store
            .content_hashes()
            .await
            .context("Failed to load stored content hashes")?
    };

    let mut report = IndexReport::default();
    let mut seen: HashSet<String> = HashSet::with_capacity(files.len());
    let mut write_failures = 0usize;

    for file in &files {
        let doc = match read_document(file, source_dir, &config.url_base) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("skipping {}: {}", file.display(), e);
                report.skipped += 1;
                continue;
            }
        };

        seen.insert(doc.path.clone());

        if known.get(&doc.path) == Some(&doc.content_hash) {
            // Front matter is outside the hash, so compare the whole record.
            // A failed read falls through to a rewrite.
            match store.get(&doc.path).await {
                Ok(Some(stored)) if stored == doc => {
                    tracing::debug!("unchanged {}", doc.path);
                    report.unchanged += 1;
                    continue;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("could not read stored {}: {:#}", doc.path, e);
                }
            }
        }

        match store.upsert(&doc).await {
            Ok(()) => {
                tracing::debug!("indexed {} [{}]", doc.path, doc.section);
                report.indexed += 1;
            }
            Err(e) => {
                tracing::error!("failed to store {}: {:#}", doc.path, e);
                report.skipped += 1;
                write_failures += 1;
            }
        }
    }

    if write_failures > 0 && report.indexed == 0 && report.unchanged == 0 {
        bail!(
            "Index store rejected all {} document writes; aborting run",
            write_failures
        );
    }

    if !rebuild {
        let mut stale: Vec<&String> = known.keys().filter(|p| !seen.contains(*p)).collect();
        stale.sort();

        for path in stale {
            store
                .delete(path)
                .await
                .with_context(|| format!("Failed to remove {}", path))?;
            tracing::debug!("removed {}", path);
            report.removed += 1;
        }
    }

    tracing::info!(
        "index run complete: {} indexed, {} unchanged, {} skipped, {} removed",
        report.indexed,
        report.unchanged,
        report.skipped,
        report.removed
    );

    Ok(report)
}

/// Forward-slash paths that `run_index` would consider, without parsing.
pub fn list_documents(source_dir: &Path, config: &SourceConfig) -> Result<Vec<String>> {
    let files = scan_source_tree(source_dir, config)?;
    Ok(files
        .iter()
        .filter_map(|f| relative_path(f, source_dir))
        .collect())
}
