//! File I/O for the workspace: scanning, reading notes, atomic snapshot writes.

use chrono::{DateTime, Utc};
use std::io::{self, Write as IoWrite};
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use walkdir::WalkDir;

/// Directory names skipped while scanning and watching: version control,
/// dependencies and editor/tool-private state.
pub const DEFAULT_IGNORED_DIRS: &[&str] = &[".git", "node_modules", ".obsidian", ".roamlinks"];

/// Errors during file system operations on notes.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("note file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid UTF-8 in {path} at byte {valid_up_to}")]
    InvalidEncoding { path: PathBuf, valid_up_to: usize },

    #[error("atomic write failed for {path}: {source}")]
    AtomicWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("path escapes the workspace: {path}")]
    OutsideWorkspace { path: PathBuf },
}

impl FsError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => FsError::NotFound { path: path.into() },
            io::ErrorKind::PermissionDenied => FsError::PermissionDenied { path: path.into() },
            _ => FsError::Io {
                path: path.into(),
                source: error,
            },
        }
    }
}

/// Read access to note files, addressed by workspace-relative path.
///
/// The index never touches the disk itself; the builder and the change
/// coordinator go through this trait, and any error it returns is treated
/// as "the file is gone".
pub trait NoteSource: Send + Sync {
    /// Modification time of the file in milliseconds since the Unix epoch.
    fn stat(&self, path: &str) -> Result<i64, FsError>;

    /// Full text of the file.
    fn read_text(&self, path: &str) -> Result<String, FsError>;

    /// Stats then reads the file, returning `(content, mtime)`.
    fn load(&self, path: &str) -> Result<(String, i64), FsError> {
        let mtime = self.stat(path)?;
        let content = self.read_text(path)?;
        Ok((content, mtime))
    }
}

/// [`NoteSource`] over a directory on the local file system.
#[derive(Debug, Clone)]
pub struct FsNoteSource {
    root: PathBuf,
}

impl FsNoteSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a workspace-relative note path. Absolute paths and `..`
    /// segments are rejected.
    fn full_path(&self, path: &str) -> Result<PathBuf, FsError> {
        let relative = Path::new(path);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained {
            return Err(FsError::OutsideWorkspace {
                path: relative.to_path_buf(),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl NoteSource for FsNoteSource {
    fn stat(&self, path: &str) -> Result<i64, FsError> {
        let full = self.full_path(path)?;
        let modified = std::fs::metadata(&full)
            .and_then(|m| m.modified())
            .map_err(|e| FsError::from_io(&full, e))?;
        Ok(DateTime::<Utc>::from(modified).timestamp_millis())
    }

    fn read_text(&self, path: &str) -> Result<String, FsError> {
        let full = self.full_path(path)?;
        let bytes = std::fs::read(&full).map_err(|e| FsError::from_io(&full, e))?;
        String::from_utf8(bytes).map_err(|e| FsError::InvalidEncoding {
            path: full,
            valid_up_to: e.utf8_error().valid_up_to(),
        })
    }
}

/// Converts a relative path into the `/`-separated form used as note keys.
pub fn workspace_path(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Returns true if the path has a `.md` extension.
pub fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|e| e == "md")
}

/// Returns true if any component of `relative` is an ignored directory name.
pub fn is_ignored(relative: &Path, ignored: &[String]) -> bool {
    relative.components().any(|c| match c {
        Component::Normal(part) => ignored.iter().any(|name| part == name.as_str()),
        _ => false,
    })
}

/// Default ignore list as owned strings.
pub fn default_ignored() -> Vec<String> {
    DEFAULT_IGNORED_DIRS.iter().map(|s| s.to_string()).collect()
}

/// Scans `root` recursively for Markdown files.
///
/// Directories named in `ignored` are not descended into. Paths come back
/// workspace-relative, `/`-separated and sorted by file name within each
/// directory.
///
/// # Errors
///
/// Returns `FsError::NotFound` if the directory doesn't exist.
/// Returns `FsError::NotADirectory` if the path is not a directory.
pub fn scan_markdown_files(root: &Path, ignored: &[String]) -> Result<Vec<String>, FsError> {
    if !root.exists() {
        return Err(FsError::NotFound {
            path: root.to_path_buf(),
        });
    }
    if !root.is_dir() {
        return Err(FsError::NotADirectory {
            path: root.to_path_buf(),
        });
    }

    let files = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.depth() == 0
                || !(e.file_type().is_dir()
                    && ignored.iter().any(|name| e.file_name() == name.as_str()))
        })
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && is_markdown(e.path()))
        .filter_map(|e| e.path().strip_prefix(root).ok().map(workspace_path))
        .collect();

    Ok(files)
}

/// Writes `contents` to `path` through a temp file and an atomic rename.
///
/// # Errors
///
/// Returns `FsError::NotFound` if the parent directory doesn't exist.
/// Returns `FsError::AtomicWrite` if the rename fails.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), FsError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.is_dir() {
        return Err(FsError::NotFound {
            path: parent.to_path_buf(),
        });
    }

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| FsError::from_io(path, e))?;
    temp.write_all(contents.as_bytes())
        .map_err(|e| FsError::from_io(path, e))?;
    temp.persist(path).map_err(|e| FsError::AtomicWrite {
        path: path.into(),
        source: e.error,
    })?;

    Ok(())
}
