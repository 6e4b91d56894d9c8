//! Wikilink parsing: `[[target]]`, `[[target|alias]]`, `[[folder/target#heading]]`.
//!
//! The parser is a plain byte scanner. `[`, `]` and `|` are ASCII, so every
//! offset it produces falls on a UTF-8 character boundary.

use serde::Serialize;

/// A single `[[...]]` occurrence in a note's text.
///
/// `target` is the trimmed text before any `|`, with folder and heading parts
/// left intact. `start` and `end` are byte offsets of the whole span,
/// brackets included, so `&content[start..end]` is the literal link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WikiLink {
    pub target: String,
    pub alias: Option<String>,
    pub start: usize,
    pub end: usize,
}

/// Raw match produced by the scanner before target validation.
struct RawMatch<'a> {
    target: &'a str,
    alias: Option<&'a str>,
    end: usize,
}

/// Attempts to match a wikilink starting exactly at `start`.
///
/// Mirrors `\[\[([^\]|]+)(?:\|([^\]]+))?\]\]`: the target may not contain
/// `]` or `|`, the alias may not contain `]`, and the first `]]` closes the
/// link.
fn match_at(content: &str, start: usize) -> Option<RawMatch<'_>> {
    let bytes = content.as_bytes();
    if !bytes[start..].starts_with(b"[[") {
        return None;
    }

    let target_start = start + 2;
    let mut pos = target_start;
    while pos < bytes.len() && bytes[pos] != b']' && bytes[pos] != b'|' {
        pos += 1;
    }
    if pos == target_start || pos >= bytes.len() {
        return None;
    }
    let target = &content[target_start..pos];

    let mut alias = None;
    if bytes[pos] == b'|' {
        let alias_start = pos + 1;
        let mut alias_end = alias_start;
        while alias_end < bytes.len() && bytes[alias_end] != b']' {
            alias_end += 1;
        }
        if alias_end == alias_start {
            // `[[target|]]` is not a link.
            return None;
        }
        alias = Some(&content[alias_start..alias_end]);
        pos = alias_end;
    }

    if bytes[pos..].starts_with(b"]]") {
        Some(RawMatch {
            target,
            alias,
            end: pos + 2,
        })
    } else {
        None
    }
}

/// Parses every wikilink in `content`, left to right, without overlap.
///
/// Matches whose target is empty after trimming are dropped silently. When a
/// `[[` does not open a valid link, scanning resumes at the next byte.
///
/// # Examples
///
/// ```
/// use roamlinks::domain::parse_wikilinks;
///
/// let links = parse_wikilinks("See [[Ideas|my ideas]] and [[log#2024]].");
/// assert_eq!(links.len(), 2);
/// assert_eq!(links[0].target, "Ideas");
/// assert_eq!(links[0].alias.as_deref(), Some("my ideas"));
/// assert_eq!(links[1].target, "log#2024");
/// ```
pub fn parse_wikilinks(content: &str) -> Vec<WikiLink> {
    let mut links = Vec::new();
    let mut pos = 0;

    while let Some(offset) = content[pos..].find("[[") {
        let start = pos + offset;
        match match_at(content, start) {
            Some(raw) => {
                let target = raw.target.trim();
                if !target.is_empty() {
                    links.push(WikiLink {
                        target: target.to_string(),
                        alias: raw.alias.map(|a| a.trim().to_string()),
                        start,
                        end: raw.end,
                    });
                }
                pos = raw.end;
            }
            None => pos = start + 1,
        }
    }

    links
}

/// Returns true if `content` holds at least one wikilink.
pub fn contains_wikilinks(content: &str) -> bool {
    let mut pos = 0;
    while let Some(offset) = content[pos..].find("[[") {
        let start = pos + offset;
        match match_at(content, start) {
            Some(raw) if !raw.target.trim().is_empty() => return true,
            Some(raw) => pos = raw.end,
            None => pos = start + 1,
        }
    }
    false
}

/// Reduces a link target to its file name: the `#heading` part is dropped
/// and only the last `/` segment is kept. Case is preserved.
///
/// ```
/// use roamlinks::domain::extract_file_name;
///
/// assert_eq!(extract_file_name("folder/note#heading"), "note");
/// assert_eq!(extract_file_name("note"), "note");
/// ```
pub fn extract_file_name(target: &str) -> &str {
    let without_heading = target.split('#').next().unwrap_or("");
    without_heading.rsplit('/').next().unwrap_or("")
}

/// The backlink bucket key for a link target: its file name, lower-cased.
pub fn file_name_key(target: &str) -> String {
    extract_file_name(target).to_lowercase()
}
