//! File-system watcher translating notify events into note-level changes.

use crate::infra::{is_ignored, is_markdown, workspace_path};
use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// A change to one note, addressed by workspace-relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    Added(String),
    Changed(String),
    Removed(String),
    /// The watcher lost events; the whole workspace must be rescanned.
    Rescan,
}

/// Errors starting the watcher.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("file watcher error: {0}")]
    Notify(#[from] notify::Error),

    #[error("cannot watch {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Live recursive watch on a workspace. Events stop when this is dropped.
pub struct WorkspaceWatcher {
    root: PathBuf,
    _watcher: RecommendedWatcher,
}

impl WorkspaceWatcher {
    /// Starts watching `root` and forwards note events into `tx`.
    ///
    /// The callback runs on notify's own thread and blocks on a full
    /// channel, so it must not be driven from inside the runtime.
    ///
    /// # Errors
    ///
    /// Returns `WatchError::Root` if the root cannot be resolved and
    /// `WatchError::Notify` if the platform watcher fails to start.
    pub fn start(
        root: &Path,
        ignored: Vec<String>,
        tx: mpsc::Sender<WatchEvent>,
    ) -> Result<Self, WatchError> {
        let root = root.canonicalize().map_err(|source| WatchError::Root {
            path: root.to_path_buf(),
            source,
        })?;

        let callback_root = root.clone();
        let mut watcher =
            notify::recommended_watcher(move |result: notify::Result<Event>| match result {
                Ok(event) => {
                    for change in classify(&callback_root, &ignored, &event) {
                        debug!(?change, "watch event");
                        if tx.blocking_send(change).is_err() {
                            return;
                        }
                    }
                }
                Err(err) => warn!(error = %err, "file watcher error"),
            })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;
        debug!(root = %root.display(), "watching workspace");

        Ok(Self {
            root,
            _watcher: watcher,
        })
    }

    /// The canonical root being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Maps one notify event to note events.
///
/// Only `.md` files below `root` and outside ignored directories produce
/// events. Renames become a removal of the old path and an addition of the
/// new one.
pub fn classify(root: &Path, ignored: &[String], event: &Event) -> Vec<WatchEvent> {
    if event.need_rescan() {
        return vec![WatchEvent::Rescan];
    }

    let note = |path: &PathBuf| relative_note(root, ignored, path);

    match event.kind {
        EventKind::Access(_) => Vec::new(),
        EventKind::Create(_) => event
            .paths
            .iter()
            .filter_map(note)
            .map(WatchEvent::Added)
            .collect(),
        EventKind::Remove(_) => event
            .paths
            .iter()
            .filter_map(note)
            .map(WatchEvent::Removed)
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => event
            .paths
            .iter()
            .filter_map(note)
            .map(WatchEvent::Removed)
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => event
            .paths
            .iter()
            .filter_map(note)
            .map(WatchEvent::Added)
            .collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let mut changes = Vec::new();
            if let Some(from) = event.paths.first().and_then(note) {
                changes.push(WatchEvent::Removed(from));
            }
            if let Some(to) = event.paths.get(1).and_then(note) {
                changes.push(WatchEvent::Added(to));
            }
            changes
        }
        EventKind::Modify(ModifyKind::Name(_)) => event
            .paths
            .iter()
            .filter_map(|path| {
                note(path).map(|rel| {
                    if path.exists() {
                        WatchEvent::Added(rel)
                    } else {
                        WatchEvent::Removed(rel)
                    }
                })
            })
            .collect(),
        EventKind::Modify(_) | EventKind::Any | EventKind::Other => event
            .paths
            .iter()
            .filter_map(|path| {
                note(path).map(|rel| {
                    if path.exists() {
                        WatchEvent::Changed(rel)
                    } else {
                        WatchEvent::Removed(rel)
                    }
                })
            })
            .collect(),
    }
}

fn relative_note(root: &Path, ignored: &[String], path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    if !is_markdown(relative) || is_ignored(relative, ignored) {
        return None;
    }
    Some(workspace_path(relative))
}
