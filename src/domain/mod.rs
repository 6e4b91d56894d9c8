//! Core types: wikilinks and note metadata

mod note;
mod wikilink;

pub use note::{NoteMetadata, title_from_path};
pub use wikilink::{WikiLink, contains_wikilinks, extract_file_name, file_name_key, parse_wikilinks};
