//! Command handlers for the CLI.

mod graph;
mod index;
mod links;
mod search;
mod serve;
mod show;

#[cfg(test)]
pub(crate) mod tests;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::cli::IndexSource;
use crate::index::{FileResult, IndexBuilder, LinkIndex, ProgressReporter, import_index};

// Re-export public items
pub use graph::{handle_graph, handle_stats};
pub use index::handle_index;
pub use links::{handle_backlinks, handle_outlinks};
pub use search::handle_search;
pub use serve::handle_serve;
pub use show::handle_show;

// ===========================================
// Shared Utilities
// ===========================================

/// Resolved workspace settings shared by every command.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub root: PathBuf,
    pub ignored: Vec<String>,
}

impl Workspace {
    pub fn new(root: PathBuf, ignored: Vec<String>) -> Self {
        // Absolute whenever the directory exists.
        let root = root.canonicalize().unwrap_or(root);
        Self { root, ignored }
    }

    pub fn builder(&self) -> IndexBuilder {
        IndexBuilder::new(&self.root).with_ignored(self.ignored.clone())
    }
}

/// Progress reporter that prints to stdout.
pub(crate) struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub(crate) fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleReporter {
    fn on_file(&mut self, path: &str, result: FileResult) {
        if self.verbose {
            match result {
                FileResult::Indexed => println!("  indexed: {path}"),
                FileResult::Skipped => println!("  skipped: {path}"),
                FileResult::Error(msg) => eprintln!("  error: {path}: {msg}"),
            }
        }
    }

    fn on_complete(&mut self, indexed: usize, errors: usize) {
        if errors > 0 {
            eprintln!("Indexed {indexed} notes with {errors} errors");
        } else {
            println!("Indexed {indexed} notes");
        }
    }
}

/// Reads an exported snapshot from disk.
pub(crate) fn read_snapshot(path: &Path) -> Result<LinkIndex> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    import_index(&json).with_context(|| format!("failed to load snapshot {}", path.display()))
}

/// Loads the index a query command works on: the snapshot if one was given,
/// otherwise a fresh build of the workspace.
pub(crate) fn load_index(workspace: &Workspace, source: &IndexSource) -> Result<LinkIndex> {
    if let Some(snapshot) = &source.snapshot {
        return read_snapshot(snapshot);
    }
    let result = workspace
        .builder()
        .build()
        .with_context(|| format!("failed to index {}", workspace.root.display()))?;
    Ok(result.index)
}
