//! Show command handler.

use anyhow::{Result, bail};
use std::sync::Arc;

use super::{Workspace, load_index};
use crate::cli::ShowArgs;
use crate::index::SharedIndex;
use crate::infra::FsNoteSource;
use crate::tools::ToolContext;

pub fn handle_show(args: &ShowArgs, workspace: &Workspace) -> Result<()> {
    let index = load_index(workspace, &args.source)?;
    let source = Arc::new(FsNoteSource::new(index.root()));
    let tools = ToolContext::new(SharedIndex::with_index(index), source);

    let response = tools.read_note(&args.file);
    if response.is_error {
        bail!("{}", response.first_text());
    }
    println!("{}", response.first_text());
    Ok(())
}
