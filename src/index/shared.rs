//! Shared, lock-guarded handle to the link index.

use super::{IndexError, IndexResult, LinkIndex};
use std::sync::{Arc, RwLock};

/// Cloneable handle to the one link index a process serves.
///
/// Starts out uninitialized; [`SharedIndex::install`] puts the built index in
/// place. Readers take the read lock for the duration of a query, mutators
/// take the write lock for a single commit or removal, so a reader never sees
/// a note whose old backlinks are retracted but whose new ones are missing.
#[derive(Debug, Clone, Default)]
pub struct SharedIndex {
    inner: Arc<RwLock<Option<LinkIndex>>>,
}

impl SharedIndex {
    /// Creates an uninitialized handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a handle that already holds `index`.
    pub fn with_index(index: LinkIndex) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(index))),
        }
    }

    /// Replaces whatever the handle holds with `index`.
    pub fn install(&self, index: LinkIndex) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(index);
    }

    pub fn is_initialized(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Runs `f` against a consistent view of the index.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::NotInitialized` before the first install.
    pub fn read<R>(&self, f: impl FnOnce(&LinkIndex) -> R) -> IndexResult<R> {
        let guard = self.inner.read().unwrap_or_else(|e| e.into_inner());
        guard.as_ref().map(f).ok_or(IndexError::NotInitialized)
    }

    /// Runs `f` with exclusive access to the index.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::NotInitialized` before the first install.
    pub fn write<R>(&self, f: impl FnOnce(&mut LinkIndex) -> R) -> IndexResult<R> {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        guard.as_mut().map(f).ok_or(IndexError::NotInitialized)
    }
}
