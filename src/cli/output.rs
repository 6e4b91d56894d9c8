//! Output format types for CLI commands.

use clap::ValueEnum;
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for programmatic consumption
    Json,
    /// Plain file paths, one per line
    Paths,
}

/// Wrapper for serializable command output.
#[derive(Debug, Serialize)]
pub struct Output<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> Output<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// A single note in listing output.
#[derive(Debug, Serialize)]
pub struct NoteListing {
    pub path: String,
    pub title: String,
}

/// A search hit with its link counts.
#[derive(Debug, Serialize)]
pub struct SearchListing {
    pub path: String,
    pub title: String,
    pub outlinks: usize,
    pub backlinks: usize,
}
