//! CLI command definitions and handlers

pub mod config;
pub mod handlers;
pub mod output;

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::index::{DEFAULT_GRAPH_DEPTH, DEFAULT_SEARCH_LIMIT};
use output::OutputFormat;

/// roamlinks - bidirectional wikilink index for Markdown notes
#[derive(Parser, Debug)]
#[command(name = "roamlinks", version, about, long_about = None)]
pub struct Cli {
    /// Workspace directory (overrides config file)
    #[arg(short = 'd', long, global = true)]
    pub dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the link index and optionally save a snapshot
    Index(IndexArgs),

    /// Show notes that link to a file
    Backlinks(FileQueryArgs),

    /// Show the links inside a note
    Outlinks(FileQueryArgs),

    /// Find notes by title or path
    Search(SearchArgs),

    /// Print the link graph, whole or around one note
    Graph(GraphArgs),

    /// Show index statistics
    Stats(StatsArgs),

    /// Show a note with its link counts
    Show(ShowArgs),

    /// Answer JSON tool calls on stdin while watching the workspace
    Serve(ServeArgs),
}

/// Where query commands get their index from.
#[derive(Args, Debug, Default)]
pub struct IndexSource {
    /// Load an exported snapshot instead of scanning the workspace
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,
}

/// Arguments for the `index` command
#[derive(Parser, Debug)]
pub struct IndexArgs {
    /// Write a JSON snapshot of the index to FILE
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Rebuild from scratch even if the output snapshot already exists
    #[arg(long)]
    pub full: bool,
}

/// Arguments for the `backlinks` and `outlinks` commands
#[derive(Parser, Debug)]
pub struct FileQueryArgs {
    /// Note path or name
    pub file: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub source: IndexSource,
}

/// Arguments for the `search` command
#[derive(Parser, Debug)]
pub struct SearchArgs {
    /// Text to find in note titles and paths
    pub query: String,

    /// Maximum number of results
    #[arg(short, long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    pub limit: usize,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub source: IndexSource,
}

/// Arguments for the `graph` command
#[derive(Parser, Debug)]
pub struct GraphArgs {
    /// Center the graph on this note
    pub file: Option<String>,

    /// How many links to follow from the center
    #[arg(long, default_value_t = DEFAULT_GRAPH_DEPTH)]
    pub depth: usize,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub source: IndexSource,
}

/// Arguments for the `stats` command
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    #[command(flatten)]
    pub source: IndexSource,
}

/// Arguments for the `show` command
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Note path relative to the workspace
    pub file: String,

    #[command(flatten)]
    pub source: IndexSource,
}

/// Arguments for the `serve` command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Quiet period in milliseconds before a changed note is re-read
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,
}
