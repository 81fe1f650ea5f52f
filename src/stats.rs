//! Index statistics.
//!
//! A quick check that an index run did what was expected: total document
//! count plus a per-section breakdown. Used by `spark-docs stats`.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use spark_docs_core::store::Store;

use crate::output::print_json;
use crate::sqlite_store::{SectionCount, SqliteStore};

#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub document_count: i64,
    pub sections: Vec<SectionCount>,
}

pub async fn collect_stats(store: &SqliteStore) -> Result<StatsReport> {
    let stats = store.stats().await?;
    let sections = store.section_counts().await?;
    Ok(StatsReport {
        document_count: stats.document_count,
        sections,
    })
}

pub async fn run_stats(store: &SqliteStore, db_path: &Path, json: bool) -> Result<()> {
    let report = collect_stats(store).await?;

    if json {
        return print_json(&report);
    }

    let db_size = std::fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);

    println!("Spark Docs Index Stats");
    println!("======================");
    println!();
    println!("  Database:    {}", db_path.display());
    println!("  Size:        {}", format_bytes(db_size));
    println!("  Documents:   {}", report.document_count);

    if !report.sections.is_empty() {
        println!();
        println!("  {:<32} {:>6}", "SECTION", "DOCS");
        println!("  {}", "-".repeat(39));
        for s in &report.sections {
            println!("  {:<32} {:>6}", s.section, s.document_count);
        }
    }

    println!();
    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
