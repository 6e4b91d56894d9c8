//! Per-file metadata kept in the link index.

use crate::domain::wikilink::{extract_file_name, parse_wikilinks};
use crate::infra::ContentHash;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Indexed view of one Markdown file.
///
/// `outlinks` holds the file name of every wikilink in first-seen order,
/// duplicates included. Names keep their original case; the index lower-cases
/// them only when bucketing backlinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteMetadata {
    pub path: String,
    pub title: String,
    pub outlinks: Vec<String>,
    pub content_hash: ContentHash,
    /// Modification time in milliseconds since the Unix epoch.
    pub mtime: i64,
}

impl NoteMetadata {
    /// Hashes and parses `content` into fresh metadata for `path`.
    ///
    /// This is pure: it touches neither the file system nor any index, so
    /// callers can run it in parallel and commit the result later.
    pub fn from_content(path: impl Into<String>, content: &str, mtime: i64) -> Self {
        let path = path.into();
        let outlinks = parse_wikilinks(content)
            .iter()
            .map(|link| extract_file_name(&link.target).to_string())
            .collect();

        Self {
            title: title_from_path(&path),
            outlinks,
            content_hash: ContentHash::of_text(content),
            mtime,
            path,
        }
    }
}

/// Derives a display title from a file path.
///
/// The extension is dropped, `-` and `_` become spaces, and every ASCII
/// letter that starts a word is upper-cased. Only ASCII letters and digits
/// count as word characters, so `élan` becomes `éLan`.
///
/// ```
/// use roamlinks::domain::title_from_path;
///
/// assert_eq!(title_from_path("notes/my-first_note.md"), "My First Note");
/// ```
pub fn title_from_path(path: &str) -> String {
    let stem = Path::new(path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut title = String::with_capacity(stem.len());
    let mut after_word = false;
    for c in stem.chars() {
        let c = if c == '-' || c == '_' { ' ' } else { c };
        let word = c.is_ascii_alphanumeric();
        title.push(if word && !after_word { c.to_ascii_uppercase() } else { c });
        after_word = word;
    }
    title
}
