//! # Spark Docs CLI (`spark-docs`)
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `spark-docs init` | Create the SQLite database and schema |
//! | `spark-docs index` | Index the documentation tree |
//! | `spark-docs search "<query>"` | Keyword search |
//! | `spark-docs read <path>` | Print one document |
//! | `spark-docs stats` | Document counts |
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `info`), so
//! `--json` output on stdout can be piped.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use spark_docs_index::config::{self, Config};
use spark_docs_index::output::print_json;
use spark_docs_index::sqlite_store::SqliteStore;
use spark_docs_index::{get, ingest, migrate, search, stats, DocsService};

/// Spark Docs: full-text search over the Apache Spark documentation.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file.
#[derive(Parser)]
#[command(
    name = "spark-docs",
    about = "Index and search the Apache Spark documentation",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/spark-docs.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database file and schema. Safe to run repeatedly.
    Init,

    /// Index a materialised documentation tree.
    ///
    /// New and changed files are written, unchanged files are left alone,
    /// and documents whose file has disappeared are removed.
    Index {
        /// Documentation root. Overrides `[source].root`.
        #[arg(long)]
        source: Option<PathBuf>,

        /// Clear the index first and re-index every file.
        #[arg(long)]
        rebuild: bool,

        /// List the files that would be indexed without touching the database.
        #[arg(long)]
        dry_run: bool,

        /// Print the run report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search indexed documents.
    Search {
        query: String,

        /// Only return documents from this top-level section (exact match).
        #[arg(long)]
        section: Option<String>,

        /// Maximum number of results, clamped to 1..=50.
        #[arg(long)]
        limit: Option<i64>,

        #[arg(long)]
        json: bool,
    },

    /// Print a document by its path, e.g. `sql-ref/syntax.md`.
    Read {
        path: String,

        #[arg(long)]
        json: bool,
    },

    /// Show document counts.
    Stats {
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn open_service(config: &Config) -> Result<(Arc<SqliteStore>, DocsService<SqliteStore>)> {
    let store = Arc::new(SqliteStore::open(config).await?);
    let service =
        DocsService::new(Arc::clone(&store)).with_default_limit(config.search.default_limit);
    Ok((store, service))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Database initialized at {}", cfg.db.path.display());
        }
        Commands::Index {
            source,
            rebuild,
            dry_run,
            json,
        } => {
            let source_dir = source
                .or_else(|| cfg.source.root.clone())
                .ok_or_else(|| anyhow!("No source directory: pass --source or set [source].root"))?;

            if dry_run {
                let docs = ingest::list_documents(&source_dir, &cfg.source)?;
                if json {
                    print_json(&docs)?;
                } else {
                    println!("index {} (dry-run)", source_dir.display());
                    println!("  files found: {}", docs.len());
                }
                return Ok(());
            }

            let store = SqliteStore::open(&cfg).await?;
            let result = ingest::run_index(&store, &source_dir, &cfg.source, rebuild).await;
            store.close().await;
            let report = result?;

            if json {
                print_json(&report)?;
            } else {
                println!("index {}", source_dir.display());
                println!("  indexed:   {}", report.indexed);
                println!("  unchanged: {}", report.unchanged);
                println!("  skipped:   {}", report.skipped);
                println!("  removed:   {}", report.removed);
                println!("ok");
            }
        }
        Commands::Search {
            query,
            section,
            limit,
            json,
        } => {
            let (store, service) = open_service(&cfg).await?;
            let result =
                search::run_search(&service, &query, section.as_deref(), limit, json).await;
            store.close().await;
            result?;
        }
        Commands::Read { path, json } => {
            let (store, service) = open_service(&cfg).await?;
            let result = get::run_read(&service, &path, json).await;
            store.close().await;
            result?;
        }
        Commands::Stats { json } => {
            let store = SqliteStore::open(&cfg).await?;
            let result = stats::run_stats(&store, &cfg.db.path, json).await;
            store.close().await;
            result?;
        }
    }

    Ok(())
}
