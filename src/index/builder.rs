//! Index builder for populating and refreshing the link index from a workspace.

use crate::domain::NoteMetadata;
use crate::index::{IndexError, IndexResult, LinkIndex, UpsertOutcome};
use crate::infra::{FsError, FsNoteSource, NoteSource, default_ignored, scan_markdown_files};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

// ===========================================
// BuildError Type
// ===========================================

/// Errors that can occur when indexing individual files.
#[derive(Debug)]
pub enum BuildError {
    /// I/O error reading file.
    Io { path: String, message: String },
    /// The file is not valid UTF-8.
    Encoding { path: String, message: String },
}

impl BuildError {
    fn from_fs(path: &str, error: FsError) -> Self {
        match error {
            FsError::InvalidEncoding { .. } => BuildError::Encoding {
                path: path.to_string(),
                message: error.to_string(),
            },
            other => BuildError::Io {
                path: path.to_string(),
                message: other.to_string(),
            },
        }
    }

    /// Returns the workspace path of the file that caused the error.
    pub fn path(&self) -> &str {
        match self {
            BuildError::Io { path, .. } => path,
            BuildError::Encoding { path, .. } => path,
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        match self {
            BuildError::Io { message, .. } => message,
            BuildError::Encoding { message, .. } => message,
        }
    }
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path(), self.message())
    }
}

impl std::error::Error for BuildError {}

// ===========================================
// Result Types
// ===========================================

/// Result of a full build.
#[derive(Debug)]
pub struct BuildResult {
    /// The populated index.
    pub index: LinkIndex,
    /// Number of notes successfully indexed.
    pub indexed: usize,
    /// Number of paths dropped because they could not be read.
    pub removed: usize,
    /// Errors that occurred during indexing.
    pub errors: Vec<BuildError>,
}

/// Result of refreshing an existing index against the workspace.
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Number of new notes added.
    pub added: usize,
    /// Number of existing notes whose content changed.
    pub modified: usize,
    /// Number of notes whose content hash matched.
    pub unchanged: usize,
    /// Number of notes dropped (deleted or unreadable).
    pub removed: usize,
    /// Errors that occurred during indexing.
    pub errors: Vec<BuildError>,
}

impl UpdateResult {
    /// Whether the refresh changed the index at all.
    pub fn changed(&self) -> bool {
        self.added + self.modified + self.removed > 0
    }
}

// ===========================================
// Progress Reporting
// ===========================================

/// Result of processing a single file.
#[derive(Debug, Clone)]
pub enum FileResult {
    /// File was indexed successfully.
    Indexed,
    /// File was skipped (unchanged).
    Skipped,
    /// Error occurred while processing file.
    Error(String),
}

/// Trait for receiving progress updates during index operations.
pub trait ProgressReporter {
    /// Called when a file is processed.
    fn on_file(&mut self, path: &str, result: FileResult);
    /// Called when the build/update is complete.
    fn on_complete(&mut self, indexed: usize, errors: usize);
}

/// A no-op progress reporter.
#[derive(Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_file(&mut self, _path: &str, _result: FileResult) {}
    fn on_complete(&mut self, _indexed: usize, _errors: usize) {}
}

// ===========================================
// IndexBuilder
// ===========================================

/// Builder for populating the link index from a workspace directory.
///
/// Files are read and parsed in parallel; the results are committed to the
/// index one at a time in scan order, so the resulting note order does not
/// depend on thread scheduling.
#[derive(Clone)]
pub struct IndexBuilder {
    root: PathBuf,
    ignored: Vec<String>,
    source: Arc<dyn NoteSource>,
}

impl std::fmt::Debug for IndexBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexBuilder")
            .field("root", &self.root)
            .field("ignored", &self.ignored)
            .finish_non_exhaustive()
    }
}

impl IndexBuilder {
    /// Creates a builder for `root` reading from the local file system and
    /// skipping the default ignored directories.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            source: Arc::new(FsNoteSource::new(&root)),
            ignored: default_ignored(),
            root,
        }
    }

    /// Replaces the ignored directory names.
    pub fn with_ignored(mut self, ignored: Vec<String>) -> Self {
        self.ignored = ignored;
        self
    }

    /// Reads note contents through `source` instead of the file system.
    pub fn with_source(mut self, source: Arc<dyn NoteSource>) -> Self {
        self.source = source;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    /// Builds a fresh index of every Markdown file under the root.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Scan` if the root cannot be scanned. Individual
    /// file errors are collected in the returned `BuildResult`.
    pub fn build(&self) -> IndexResult<BuildResult> {
        self.build_with_progress(&mut NoopReporter)
    }

    /// Builds a fresh index with progress reporting.
    pub fn build_with_progress<P: ProgressReporter>(
        &self,
        progress: &mut P,
    ) -> IndexResult<BuildResult> {
        let mut index = LinkIndex::new(&self.root);
        let update = self.update_with_progress(&mut index, progress)?;

        Ok(BuildResult {
            index,
            indexed: update.added + update.modified,
            removed: update.removed,
            errors: update.errors,
        })
    }

    /// Brings an existing index in line with the workspace.
    ///
    /// New and changed files are committed, unchanged ones skipped, and
    /// indexed paths that are gone or unreadable are removed.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::Scan` if the root cannot be scanned.
    pub fn update(&self, index: &mut LinkIndex) -> IndexResult<UpdateResult> {
        self.update_with_progress(index, &mut NoopReporter)
    }

    /// Refreshes an existing index with progress reporting.
    pub fn update_with_progress<P: ProgressReporter>(
        &self,
        index: &mut LinkIndex,
        progress: &mut P,
    ) -> IndexResult<UpdateResult> {
        let files = scan_markdown_files(&self.root, &self.ignored).map_err(|source| {
            IndexError::Scan {
                root: self.root.clone(),
                source,
            }
        })?;
        debug!(root = %self.root.display(), files = files.len(), "scanned workspace");

        let prepared: Vec<Result<NoteMetadata, FsError>> = files
            .par_iter()
            .map(|path| -> Result<NoteMetadata, FsError> {
                let (content, mtime) = self.source.load(path)?;
                Ok(NoteMetadata::from_content(path.as_str(), &content, mtime))
            })
            .collect();

        let mut result = UpdateResult::default();

        for (path, note) in files.iter().zip(prepared) {
            match note {
                Ok(note) => match index.commit(note) {
                    UpsertOutcome::Added => {
                        result.added += 1;
                        progress.on_file(path, FileResult::Indexed);
                    }
                    UpsertOutcome::Updated => {
                        result.modified += 1;
                        progress.on_file(path, FileResult::Indexed);
                    }
                    UpsertOutcome::Unchanged => {
                        result.unchanged += 1;
                        progress.on_file(path, FileResult::Skipped);
                    }
                },
                Err(e) => {
                    let build_error = BuildError::from_fs(path, e);
                    warn!(path = %path, error = %build_error.message(), "failed to read note");
                    if index.remove(path) {
                        result.removed += 1;
                    }
                    progress.on_file(path, FileResult::Error(build_error.message().to_string()));
                    result.errors.push(build_error);
                }
            }
        }

        // Remove notes whose files no longer exist
        let present: HashSet<&str> = files.iter().map(String::as_str).collect();
        let stale: Vec<String> = index
            .notes()
            .filter(|n| !present.contains(n.path.as_str()))
            .map(|n| n.path.clone())
            .collect();
        for path in stale {
            if index.remove(&path) {
                result.removed += 1;
            }
        }

        index.touch();

        let indexed = result.added + result.modified;
        info!(
            root = %self.root.display(),
            notes = index.len(),
            indexed,
            unchanged = result.unchanged,
            removed = result.removed,
            errors = result.errors.len(),
            "index updated"
        );
        progress.on_complete(indexed, result.errors.len());
        Ok(result)
    }
}
