//! Debounced incremental index maintenance driven by watch events.

use super::WatchEvent;
use crate::domain::NoteMetadata;
use crate::index::{IndexBuilder, SharedIndex, UpsertOutcome};
use crate::infra::{FsError, NoteSource};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Quiet period before a changed note is re-read.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    pub debounce: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

struct PendingReindex {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Applies watch events to a [`SharedIndex`].
///
/// Additions and changes are debounced per path: each event (re)starts a
/// timer, and only when it expires is the file read and committed. Removals
/// are applied at once and cancel any pending timer for the path.
///
/// Every timer carries a generation number. The read happens off the async
/// workers and may overlap newer events, so a fired timer claims its pending
/// entry under the index write lock and commits only if the entry still holds
/// its generation. A removal or a newer change clears or replaces the entry
/// first, which turns any in-flight read into a no-op.
#[derive(Clone)]
pub struct ChangeCoordinator {
    shared: SharedIndex,
    source: Arc<dyn NoteSource>,
    rescan: Option<IndexBuilder>,
    config: CoordinatorConfig,
    pending: Arc<DashMap<String, PendingReindex>>,
    generation: Arc<AtomicU64>,
}

impl ChangeCoordinator {
    pub fn new(shared: SharedIndex, source: Arc<dyn NoteSource>, config: CoordinatorConfig) -> Self {
        Self {
            shared,
            source,
            rescan: None,
            config,
            pending: Arc::new(DashMap::new()),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Uses `builder` to rebuild the whole index when the watcher asks for a
    /// rescan.
    pub fn with_rescan(mut self, builder: IndexBuilder) -> Self {
        self.rescan = Some(builder);
        self
    }

    /// Number of paths with a timer that has not committed yet.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Applies one event. A rescan completes before this returns, so no
    /// later event can interleave with it.
    pub async fn handle(&self, event: WatchEvent) {
        match event {
            WatchEvent::Added(path) | WatchEvent::Changed(path) => self.schedule(path),
            WatchEvent::Removed(path) => {
                self.cancel(&path);
                self.remove_now(&path);
            }
            WatchEvent::Rescan => {
                self.shutdown();
                let this = self.clone();
                if let Err(e) = tokio::task::spawn_blocking(move || this.rescan_now()).await {
                    error!(error = %e, "workspace rescan task failed");
                }
            }
        }
    }

    /// Applies events in order until the channel closes.
    pub async fn run(self, mut rx: mpsc::Receiver<WatchEvent>) {
        info!("change coordinator started");
        while let Some(event) = rx.recv().await {
            self.handle(event).await;
        }
        info!("change coordinator stopped");
    }

    /// Cancels every pending timer. Reads already in flight are discarded.
    pub fn shutdown(&self) {
        self.pending.retain(|_, pending| {
            pending.handle.abort();
            false
        });
    }

    /// Drops `path` from the index.
    pub fn remove_now(&self, path: &str) {
        let result = self.shared.write(|index| {
            let removed = index.remove(path);
            if removed {
                index.touch();
            }
            removed
        });
        match result {
            Ok(removed) => debug!(path, removed, "removed note"),
            Err(e) => warn!(path, error = %e, "cannot remove note"),
        }
    }

    /// Rebuilds the index from scratch and installs the result.
    pub fn rescan_now(&self) {
        let Some(builder) = &self.rescan else {
            warn!("rescan requested but no builder configured");
            return;
        };
        match builder.build() {
            Ok(result) => {
                info!(
                    notes = result.index.len(),
                    errors = result.errors.len(),
                    "workspace rescanned"
                );
                self.shared.install(result.index);
            }
            Err(e) => error!(error = %e, "workspace rescan failed"),
        }
    }

    /// Reads `path` and commits it, or drops it if it cannot be read. Nothing
    /// is applied unless the timer for `generation` still owns the path.
    fn reindex(&self, path: &str, generation: u64) {
        let loaded = self
            .source
            .load(path)
            .map(|(content, mtime)| NoteMetadata::from_content(path, &content, mtime));

        let result = self.shared.write(|index| {
            if !self.claim(path, generation) {
                return Reindex::Superseded;
            }
            match loaded {
                Ok(note) => {
                    let outcome = index.commit(note);
                    if outcome.is_change() {
                        index.touch();
                    }
                    Reindex::Committed(outcome)
                }
                Err(e) => {
                    if index.remove(path) {
                        index.touch();
                    }
                    Reindex::Dropped(e)
                }
            }
        });

        match result {
            Ok(Reindex::Committed(outcome)) => debug!(path, ?outcome, "reindexed note"),
            Ok(Reindex::Dropped(e)) => debug!(path, error = %e, "note unreadable, dropped it"),
            Ok(Reindex::Superseded) => debug!(path, "reindex superseded by a newer event"),
            Err(e) => {
                self.claim(path, generation);
                warn!(path, error = %e, "cannot reindex note");
            }
        }
    }

    fn claim(&self, path: &str, generation: u64) -> bool {
        self.pending
            .remove_if(path, |_, pending| pending.generation == generation)
            .is_some()
    }

    fn is_current(&self, path: &str, generation: u64) -> bool {
        self.pending
            .get(path)
            .is_some_and(|pending| pending.generation == generation)
    }

    fn schedule(&self, path: String) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;

        // The entry guard is held while spawning so the new timer cannot
        // claim the slot before it is recorded.
        match self.pending.entry(path.clone()) {
            Entry::Occupied(mut e) => {
                e.get().handle.abort();
                let handle = self.spawn_timer(path, generation);
                e.insert(PendingReindex { generation, handle });
            }
            Entry::Vacant(e) => {
                let handle = self.spawn_timer(path, generation);
                e.insert(PendingReindex { generation, handle });
            }
        }
    }

    fn spawn_timer(&self, path: String, generation: u64) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(this.config.debounce).await;
            if !this.is_current(&path, generation) {
                return;
            }

            let reader = this.clone();
            let read = tokio::task::spawn_blocking(move || reader.reindex(&path, generation));
            if let Err(e) = read.await {
                error!(error = %e, "reindex task failed");
            }
        })
    }

    fn cancel(&self, path: &str) {
        if let Some((_, pending)) = self.pending.remove(path) {
            pending.handle.abort();
        }
    }
}

enum Reindex {
    Committed(UpsertOutcome),
    Dropped(FsError),
    Superseded,
}
