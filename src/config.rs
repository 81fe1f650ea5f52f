//! TOML configuration.
//!
//! ```toml
//! [db]
//! path = "./data/spark_docs.sqlite"
//!
//! [source]
//! root = "./spark/docs"
//! url_base = "https://spark.apache.org/docs/latest"
//! include_globs = ["**/*.md", "**/*.markdown"]
//! exclude_globs = []
//! follow_symlinks = false
//!
//! [search]
//! default_limit = 10
//! snippet_tokens = 48
//! ```
//!
//! Only `[db]` is required. [`load_config`] validates ranges after parsing.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use spark_docs_core::parse::DEFAULT_URL_BASE;
use spark_docs_core::query::{DEFAULT_LIMIT, MAX_LIMIT, MIN_LIMIT};
use std::path::{Path, PathBuf};

/// FTS5 `snippet()` refuses more than 64 tokens.
pub const MAX_SNIPPET_TOKENS: usize = 64;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    /// Materialised documentation tree. `index --source` overrides it.
    #[serde(default)]
    pub root: Option<PathBuf>,
    #[serde(default = "default_url_base")]
    pub url_base: String,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: None,
            url_base: default_url_base(),
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_url_base() -> String {
    DEFAULT_URL_BASE.to_string()
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.md".to_string(), "**/*.markdown".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub default_limit: i64,
    #[serde(default = "default_snippet_tokens")]
    pub snippet_tokens: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            snippet_tokens: default_snippet_tokens(),
        }
    }
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

fn default_snippet_tokens() -> usize {
    48
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.db.path.as_os_str().is_empty() {
        bail!("db.path must not be empty");
    }

    if config.source.url_base.trim().is_empty() {
        bail!("source.url_base must not be empty");
    }

    if config.source.include_globs.is_empty() {
        bail!("source.include_globs must list at least one pattern");
    }

    if !(MIN_LIMIT..=MAX_LIMIT).contains(&config.search.default_limit) {
        bail!(
            "search.default_limit must be in [{}, {}]",
            MIN_LIMIT,
            MAX_LIMIT
        );
    }

    if config.search.snippet_tokens == 0 || config.search.snippet_tokens > MAX_SNIPPET_TOKENS {
        bail!("search.snippet_tokens must be in [1, {}]", MAX_SNIPPET_TOKENS);
    }

    Ok(())
}
