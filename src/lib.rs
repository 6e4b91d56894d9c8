//! roamlinks - bidirectional wikilink index for Markdown notes

pub mod cli;
pub mod domain;
pub mod index;
pub mod infra;
pub mod tools;
pub mod watch;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{
    Cli, Command,
    config::Config,
    handlers::{
        Workspace, handle_backlinks, handle_graph, handle_index, handle_outlinks, handle_search,
        handle_serve, handle_show, handle_stats,
    },
};

/// Main entry point for the CLI application.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load()?;
    let workspace = Workspace::new(config.notes_dir(cli.dir.as_ref()), config.ignored());
    let verbose = cli.verbose > 0;

    match &cli.command {
        Command::Index(args) => handle_index(args, &workspace, verbose),
        Command::Backlinks(args) => handle_backlinks(args, &workspace),
        Command::Outlinks(args) => handle_outlinks(args, &workspace),
        Command::Search(args) => handle_search(args, &workspace),
        Command::Graph(args) => handle_graph(args, &workspace),
        Command::Stats(args) => handle_stats(args, &workspace),
        Command::Show(args) => handle_show(args, &workspace),
        Command::Serve(args) => handle_serve(args, &workspace, &config),
    }
}

/// Logs go to stderr so stdout stays free for command output and replies.
/// `RUST_LOG` overrides the level picked from `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
