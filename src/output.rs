//! Shared printing helpers for the CLI front-ends.

use anyhow::Result;
use serde::Serialize;

use spark_docs_core::service::QueryError;

/// Pretty-print `value` as JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the structured body of a query error (JSON mode only) and turn
/// it into the error the command returns.
pub fn report_query_error(err: QueryError, json: bool) -> anyhow::Error {
    if json {
        let body = err.to_body();
        match serde_json::to_string_pretty(&body) {
            Ok(text) => println!("{}", text),
            Err(e) => tracing::error!("failed to serialise error body: {}", e),
        }
    } else if let Some(hint) = err.suggestion() {
        eprintln!("hint: {}", hint);
    }
    anyhow::Error::new(err)
}
