//! File I/O, content hashing

mod content_hash;
mod fs;

pub use content_hash::{ContentHash, ContentHashError};
pub use fs::{
    DEFAULT_IGNORED_DIRS, FsError, FsNoteSource, NoteSource, default_ignored, is_ignored,
    is_markdown, scan_markdown_files, workspace_path, write_atomic,
};
