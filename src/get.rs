//! `spark-docs read` front-end.
//!
//! An unknown path is a normal outcome: the not-found body is printed
//! and the command still succeeds.

use anyhow::Result;

use spark_docs_core::service::{DocsService, ReadResponse};
use spark_docs_core::store::Store;

use crate::output::{print_json, report_query_error};

pub async fn run_read<S: Store>(service: &DocsService<S>, path: &str, json: bool) -> Result<()> {
    let response = match service.read_documentation(path).await {
        Ok(response) => response,
        Err(e) => return Err(report_query_error(e, json)),
    };

    if json {
        print_json(&response)
    } else {
        print!("{}", render_read(&response));
        Ok(())
    }
}

pub fn render_read(response: &ReadResponse) -> String {
    match response {
        ReadResponse::Found(doc) => {
            let mut out = format!("# {}\n\n", doc.title);
            out.push_str(&format!("path: {}\n", doc.path));
            out.push_str(&format!("section: {}\n", doc.section));
            out.push_str(&format!("url: {}\n", doc.url));
            if let Some(ref description) = doc.description {
                out.push_str(&format!("description: {}\n", description));
            }
            out.push_str("\n---\n\n");
            out.push_str(&doc.content);
            out.push('\n');
            out
        }
        ReadResponse::NotFound(nf) => format!("{}\n{}\n", nf.error, nf.suggestion),
    }
}
