//! Keeping the index current while the workspace changes

mod coordinator;
mod watcher;

pub use coordinator::{ChangeCoordinator, CoordinatorConfig, DEFAULT_DEBOUNCE};
pub use watcher::{WatchError, WatchEvent, WorkspaceWatcher, classify};
