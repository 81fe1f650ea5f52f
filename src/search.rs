//! `spark-docs search` front-end.
//!
//! Runs [`DocsService::search_documentation`] and prints the response as
//! a numbered list, or as the raw response JSON with `--json`. Validation
//! failures are printed as an error body in JSON mode and returned as
//! errors so the process exits non-zero.

use anyhow::Result;

use spark_docs_core::service::{DocsService, SearchResponse};
use spark_docs_core::store::Store;

use crate::output::{print_json, report_query_error};

pub async fn run_search<S: Store>(
    service: &DocsService<S>,
    query: &str,
    section: Option<&str>,
    limit: Option<i64>,
    json: bool,
) -> Result<()> {
    let response = match service.search_documentation(query, section, limit).await {
        Ok(response) => response,
        Err(e) => return Err(report_query_error(e, json)),
    };

    if json {
        print_json(&response)
    } else {
        print!("{}", render_search(&response));
        Ok(())
    }
}

/// Human-readable rendering of a search response.
pub fn render_search(response: &SearchResponse) -> String {
    let mut out = String::new();

    if let Some(ref message) = response.message {
        out.push_str(message);
        out.push('\n');
        return out;
    }

    for (i, result) in response.results.iter().enumerate() {
        out.push_str(&format!(
            "{}. [{:.4}] {} ({})\n",
            i + 1,
            result.relevance_score,
            result.title,
            result.section
        ));
        out.push_str(&format!("    path: {}\n", result.path));
        out.push_str(&format!("    url: {}\n", result.url));
        out.push_str(&format!(
            "    excerpt: \"{}\"\n",
            result.snippet.replace('\n', " ").trim()
        ));
        out.push('\n');
    }

    out.push_str(&format!("{} result(s)", response.result_count));
    if let Some(ref section) = response.section_filter {
        out.push_str(&format!(" in section '{}'", section));
    }
    out.push('\n');
    out
}
