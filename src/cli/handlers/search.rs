//! Search command handler.

use anyhow::Result;

use super::{Workspace, load_index};
use crate::cli::SearchArgs;
use crate::cli::output::{Output, OutputFormat, SearchListing};
use crate::index::{LinkIndex, query};

pub fn handle_search(args: &SearchArgs, workspace: &Workspace) -> Result<()> {
    let index = load_index(workspace, &args.source)?;
    print!("{}", render_search(&index, &args.query, args.limit, args.format)?);
    Ok(())
}

pub(crate) fn render_search(
    index: &LinkIndex,
    query_text: &str,
    limit: usize,
    format: OutputFormat,
) -> Result<String> {
    let results: Vec<SearchListing> = query::search(index, query_text, limit)
        .into_iter()
        .map(|note| SearchListing {
            path: note.path.clone(),
            title: note.title.clone(),
            outlinks: note.outlinks.len(),
            backlinks: query::backlinks(index, &note.path).len(),
        })
        .collect();

    let mut out = String::new();
    match format {
        OutputFormat::Human => {
            if results.is_empty() {
                out.push_str("No matching notes found.\n");
            } else {
                for result in &results {
                    out.push_str(&format!(
                        "{} ({})\n  {} out, {} in\n",
                        result.title, result.path, result.outlinks, result.backlinks
                    ));
                }
                out.push_str(&format!("\n{} result(s)\n", results.len()));
            }
        }
        OutputFormat::Json => {
            out.push_str(&serde_json::to_string_pretty(&Output::new(results))?);
            out.push('\n');
        }
        OutputFormat::Paths => {
            for result in &results {
                out.push_str(&format!("{}\n", index.root().join(&result.path).display()));
            }
        }
    }
    Ok(out)
}
