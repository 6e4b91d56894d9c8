//! JSON export and import of a whole link index.

use super::LinkIndex;
use crate::domain::NoteMetadata;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors while writing or reading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid lastUpdated timestamp: {0}")]
    InvalidTimestamp(i64),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    root: &'a std::path::Path,
    notes: Vec<(&'a str, &'a NoteMetadata)>,
    backlinks: Vec<(&'a str, &'a [String])>,
    last_updated: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    root: PathBuf,
    notes: Vec<(String, NoteMetadata)>,
    backlinks: Vec<(String, Vec<String>)>,
    last_updated: i64,
}

/// Serializes the index to JSON.
///
/// Notes keep their index order, backlink buckets are sorted by key and
/// `lastUpdated` is in milliseconds since the Unix epoch.
///
/// # Errors
///
/// Returns `SnapshotError::Json` if the root path is not valid UTF-8.
pub fn export_index(index: &LinkIndex) -> Result<String, SnapshotError> {
    let snapshot = SnapshotRef {
        root: index.root(),
        notes: index.notes().map(|n| (n.path.as_str(), n)).collect(),
        backlinks: index.backlink_buckets(),
        last_updated: index.last_updated().timestamp_millis(),
    };
    Ok(serde_json::to_string(&snapshot)?)
}

/// Rebuilds an index from [`export_index`] output.
///
/// # Errors
///
/// Returns `SnapshotError::Json` for malformed input and
/// `SnapshotError::InvalidTimestamp` if `lastUpdated` is out of range.
pub fn import_index(json: &str) -> Result<LinkIndex, SnapshotError> {
    let snapshot: Snapshot = serde_json::from_str(json)?;
    let last_updated = DateTime::from_timestamp_millis(snapshot.last_updated)
        .ok_or(SnapshotError::InvalidTimestamp(snapshot.last_updated))?;

    let notes = snapshot
        .notes
        .into_iter()
        .map(|(path, mut note)| {
            note.path = path;
            note
        })
        .collect();

    Ok(LinkIndex::from_parts(
        snapshot.root,
        notes,
        snapshot.backlinks,
        last_updated,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> LinkIndex {
        let mut index = LinkIndex::new("/vault");
        index.upsert("z.md", "[[a]] [[Topic#x]]", 1_700_000_000_000);
        index.upsert("a.md", "[[topic]]", 1_700_000_000_001);
        index.upsert("dir/b.md", "plain", 5);
        index
    }

    #[test]
    fn round_trip_reproduces_notes_and_backlinks() {
        let original = sample();
        let restored = import_index(&export_index(&original).unwrap()).unwrap();

        assert_eq!(restored.root(), original.root());
        assert_eq!(
            restored.notes().cloned().collect::<Vec<_>>(),
            original.notes().cloned().collect::<Vec<_>>()
        );
        assert_eq!(restored.backlink_buckets(), original.backlink_buckets());
        assert_eq!(
            restored.last_updated().timestamp_millis(),
            original.last_updated().timestamp_millis()
        );
    }

    #[test]
    fn restored_index_keeps_updating_correctly() {
        let mut restored = import_index(&export_index(&sample()).unwrap()).unwrap();

        restored.upsert("z.md", "[[a]]", 2);
        assert_eq!(restored.backlinks_for_key("topic"), ["a.md"]);
        assert_eq!(restored.backlinks_for_key("a"), ["z.md"]);
    }

    #[test]
    fn export_shape() {
        let json: serde_json::Value = serde_json::from_str(&export_index(&sample()).unwrap()).unwrap();

        assert_eq!(json["root"], "/vault");
        assert_eq!(json["notes"][0][0], "z.md");
        assert_eq!(json["notes"][0][1]["outlinks"], serde_json::json!(["a", "Topic"]));
        assert_eq!(json["notes"][0][1]["mtime"], 1_700_000_000_000i64);
        assert!(json["notes"][0][1]["contentHash"].is_string());
        assert_eq!(json["backlinks"][0], serde_json::json!(["a", ["z.md"]]));
        assert_eq!(json["backlinks"][1], serde_json::json!(["topic", ["z.md", "a.md"]]));
        assert!(json["lastUpdated"].is_i64());
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(import_index("{"), Err(SnapshotError::Json(_))));
        assert!(matches!(
            import_index(r#"{"root":"/","notes":[]}"#),
            Err(SnapshotError::Json(_))
        ));
    }

    #[test]
    fn out_of_range_timestamp_is_rejected() {
        let json = r#"{"root":"/","notes":[],"backlinks":[],"lastUpdated":9223372036854775807}"#;
        assert!(matches!(
            import_index(json),
            Err(SnapshotError::InvalidTimestamp(_))
        ));
    }
}
