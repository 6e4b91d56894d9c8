//! Index command handler.

use anyhow::{Context, Result};

use super::{ConsoleReporter, Workspace, read_snapshot};
use crate::cli::IndexArgs;
use crate::index::{LinkIndex, export_index};
use crate::infra::write_atomic;

pub fn handle_index(args: &IndexArgs, workspace: &Workspace, verbose: bool) -> Result<()> {
    let builder = workspace.builder();
    let mut reporter = ConsoleReporter::new(verbose);

    let previous = match &args.output {
        Some(output) if !args.full && output.exists() => Some(read_snapshot(output)?),
        _ => None,
    };

    let index = match previous.filter(|index| index.root() == workspace.root) {
        Some(mut index) => {
            println!("Updating index...");
            let result = builder
                .update_with_progress(&mut index, &mut reporter)
                .with_context(|| "failed to update index")?;

            if verbose && result.changed() {
                println!(
                    "  {} added, {} modified, {} removed",
                    result.added, result.modified, result.removed
                );
            }

            for error in &result.errors {
                eprintln!("  {}", error);
            }
            index
        }
        None => {
            println!("Building index...");
            let result = builder
                .build_with_progress(&mut reporter)
                .with_context(|| "failed to build index")?;

            for error in &result.errors {
                eprintln!("  {}", error);
            }
            result.index
        }
    };

    if let Some(output) = &args.output {
        save_snapshot(&index, output)?;
        println!("Wrote snapshot to {}", output.display());
    }

    Ok(())
}

fn save_snapshot(index: &LinkIndex, output: &std::path::Path) -> Result<()> {
    let json = export_index(index).with_context(|| "failed to serialize index")?;
    write_atomic(output, &json)
        .with_context(|| format!("failed to write snapshot {}", output.display()))
}
