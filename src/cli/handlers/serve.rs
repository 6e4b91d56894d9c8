//! Serve command handler: watch the workspace and answer tool calls.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use super::Workspace;
use crate::cli::ServeArgs;
use crate::cli::config::Config;
use crate::index::SharedIndex;
use crate::infra::{FsNoteSource, NoteSource};
use crate::tools::ToolContext;
use crate::watch::{ChangeCoordinator, CoordinatorConfig, WorkspaceWatcher};

const EVENT_BUFFER: usize = 1024;

pub fn handle_serve(args: &ServeArgs, workspace: &Workspace, config: &Config) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .with_context(|| "failed to start async runtime")?;

    runtime.block_on(serve(workspace.clone(), config.debounce(args.debounce_ms)))
}

async fn serve(workspace: Workspace, debounce: Duration) -> Result<()> {
    info!(root = %workspace.root.display(), "starting server");

    let shared = SharedIndex::new();
    let source: Arc<dyn NoteSource> = Arc::new(FsNoteSource::new(&workspace.root));
    let builder = workspace.builder();

    // Watch before building so edits made during the build are queued.
    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let watcher = WorkspaceWatcher::start(&workspace.root, workspace.ignored.clone(), tx)
        .with_context(|| format!("failed to watch {}", workspace.root.display()))?;

    let coordinator = ChangeCoordinator::new(
        shared.clone(),
        source.clone(),
        CoordinatorConfig { debounce },
    )
    .with_rescan(builder.clone());

    let result = tokio::task::spawn_blocking(move || builder.build())
        .await
        .with_context(|| "index build task failed")?
        .with_context(|| format!("failed to index {}", workspace.root.display()))?;
    info!(
        notes = result.index.len(),
        errors = result.errors.len(),
        "initial index built"
    );
    shared.install(result.index);

    let worker = tokio::spawn(coordinator.clone().run(rx));

    let tools = ToolContext::new(shared, source);
    let stdin = BufReader::new(tokio::io::stdin());
    let answered = answer_requests(&tools, stdin, tokio::io::stdout()).await;

    drop(watcher);
    coordinator.shutdown();
    worker.abort();
    info!("server stopped");

    answered
}

/// Answers one JSON request per input line until EOF.
pub(crate) async fn answer_requests<R, W>(tools: &ToolContext, input: R, mut output: W) -> Result<()>
where
    R: tokio::io::AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines
        .next_line()
        .await
        .with_context(|| "failed to read request")?
    {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let reply = tools.handle_line(line);
        output.write_all(reply.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(())
}
