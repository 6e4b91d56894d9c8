//! Link command handlers (backlinks, outlinks).

use anyhow::Result;
use std::path::Path;

use super::{Workspace, load_index};
use crate::cli::FileQueryArgs;
use crate::cli::output::{NoteListing, Output, OutputFormat};
use crate::index::{LinkIndex, query};

pub fn handle_backlinks(args: &FileQueryArgs, workspace: &Workspace) -> Result<()> {
    let index = load_index(workspace, &args.source)?;
    print!("{}", render_backlinks(&index, &args.file, args.format)?);
    Ok(())
}

pub fn handle_outlinks(args: &FileQueryArgs, workspace: &Workspace) -> Result<()> {
    let index = load_index(workspace, &args.source)?;
    print!("{}", render_outlinks(&index, &args.file, args.format)?);
    Ok(())
}

pub(crate) fn render_backlinks(index: &LinkIndex, file: &str, format: OutputFormat) -> Result<String> {
    let sources = query::backlinks(index, file);
    let listings: Vec<NoteListing> = sources
        .iter()
        .map(|path| NoteListing {
            path: path.clone(),
            title: index
                .note(path)
                .map(|n| n.title.clone())
                .unwrap_or_else(|| path.clone()),
        })
        .collect();

    let mut out = String::new();
    match format {
        OutputFormat::Human => {
            if listings.is_empty() {
                out.push_str("No backlinks found.\n");
            } else {
                let width = listings.iter().map(|l| l.title.chars().count()).max().unwrap_or(0);
                for listing in &listings {
                    out.push_str(&format!("{:<width$}  {}\n", listing.title, listing.path));
                }
                out.push_str(&format!("\n{} backlink(s)\n", listings.len()));
            }
        }
        OutputFormat::Json => {
            out.push_str(&serde_json::to_string_pretty(&Output::new(listings))?);
            out.push('\n');
        }
        OutputFormat::Paths => {
            for listing in &listings {
                out.push_str(&format!("{}\n", index.root().join(Path::new(&listing.path)).display()));
            }
        }
    }
    Ok(out)
}

pub(crate) fn render_outlinks(index: &LinkIndex, file: &str, format: OutputFormat) -> Result<String> {
    let links = query::outlinks(index, file);

    let mut out = String::new();
    match format {
        OutputFormat::Human => {
            if links.is_empty() {
                out.push_str("No outlinks found.\n");
            } else {
                for link in &links {
                    out.push_str(&format!("[[{link}]]\n"));
                }
                out.push_str(&format!("\n{} outlink(s)\n", links.len()));
            }
        }
        OutputFormat::Json => {
            out.push_str(&serde_json::to_string_pretty(&Output::new(links))?);
            out.push('\n');
        }
        OutputFormat::Paths => {
            for link in &links {
                out.push_str(&format!("{link}\n"));
            }
        }
    }
    Ok(out)
}
