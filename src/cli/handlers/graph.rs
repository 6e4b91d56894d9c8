//! Graph and stats command handlers.

use anyhow::Result;

use super::{Workspace, load_index};
use crate::cli::output::{Output, OutputFormat};
use crate::cli::{GraphArgs, StatsArgs};
use crate::index::{LinkIndex, query};

pub fn handle_graph(args: &GraphArgs, workspace: &Workspace) -> Result<()> {
    let index = load_index(workspace, &args.source)?;
    print!(
        "{}",
        render_graph(&index, args.file.as_deref(), args.depth, args.format)?
    );
    Ok(())
}

pub fn handle_stats(args: &StatsArgs, workspace: &Workspace) -> Result<()> {
    let index = load_index(workspace, &args.source)?;
    print!("{}", render_stats(&index, args.format)?);
    Ok(())
}

pub(crate) fn render_graph(
    index: &LinkIndex,
    center: Option<&str>,
    depth: usize,
    format: OutputFormat,
) -> Result<String> {
    let graph = query::graph(index, center, depth);

    let mut out = String::new();
    match format {
        OutputFormat::Human => {
            for (from, to) in &graph.edges {
                out.push_str(&format!("{from} -> {to}\n"));
            }
            out.push_str(&format!(
                "\n{} node(s), {} edge(s)\n",
                graph.nodes.len(),
                graph.edges.len()
            ));
        }
        OutputFormat::Json => {
            out.push_str(&serde_json::to_string_pretty(&Output::new(graph))?);
            out.push('\n');
        }
        OutputFormat::Paths => {
            for node in &graph.nodes {
                out.push_str(&format!("{node}\n"));
            }
        }
    }
    Ok(out)
}

pub(crate) fn render_stats(index: &LinkIndex, format: OutputFormat) -> Result<String> {
    let stats = query::stats(index);
    let out = match format {
        OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(&Output::new(stats))?),
        OutputFormat::Human | OutputFormat::Paths => format!(
            "Root:      {}\nNotes:     {}\nLinks:     {}\nBacklinks: {}\nUpdated:   {}\n",
            index.root().display(),
            stats.total_notes,
            stats.total_links,
            stats.total_backlinks,
            index.last_updated().format("%Y-%m-%d %H:%M:%S UTC")
        ),
    };
    Ok(out)
}
