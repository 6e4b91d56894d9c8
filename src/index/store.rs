//! The in-memory bidirectional link index and its mutation primitives.

use crate::domain::{NoteMetadata, file_name_key};
use crate::infra::ContentHash;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// What an upsert did to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The path was not indexed before.
    Added,
    /// The path was indexed with different content and has been replaced.
    Updated,
    /// The content hash matched the indexed note; nothing changed.
    Unchanged,
}

impl UpsertOutcome {
    pub fn is_change(self) -> bool {
        !matches!(self, UpsertOutcome::Unchanged)
    }
}

/// Notes by path plus the reverse map from file-name key to linking notes.
///
/// Invariant: for every note `n` and every key `k` derived from
/// `n.outlinks`, `backlinks[k]` contains `n.path` exactly once, and no other
/// backlink entries exist. Empty buckets are removed.
///
/// Notes iterate in insertion order; replacing a note keeps its position.
#[derive(Debug, Clone)]
pub struct LinkIndex {
    root: PathBuf,
    notes: HashMap<String, NoteMetadata>,
    order: Vec<String>,
    backlinks: HashMap<String, Vec<String>>,
    last_updated: DateTime<Utc>,
}

impl LinkIndex {
    /// Creates an empty index for the workspace at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            notes: HashMap::new(),
            order: Vec::new(),
            backlinks: HashMap::new(),
            last_updated: Utc::now(),
        }
    }

    /// Reassembles an index from exported parts.
    ///
    /// The caller is responsible for handing in a consistent backlink map.
    pub(crate) fn from_parts(
        root: PathBuf,
        notes: Vec<NoteMetadata>,
        backlinks: Vec<(String, Vec<String>)>,
        last_updated: DateTime<Utc>,
    ) -> Self {
        let order = notes.iter().map(|n| n.path.clone()).collect();
        Self {
            root,
            notes: notes.into_iter().map(|n| (n.path.clone(), n)).collect(),
            order,
            backlinks: backlinks.into_iter().collect(),
            last_updated,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn last_updated(&self) -> DateTime<Utc> {
        self.last_updated
    }

    /// Marks the index as changed now.
    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn note(&self, path: &str) -> Option<&NoteMetadata> {
        self.notes.get(path)
    }

    /// Notes in insertion order.
    pub fn notes(&self) -> impl Iterator<Item = &NoteMetadata> {
        self.order.iter().filter_map(|path| self.notes.get(path))
    }

    /// Sources linking to the file-name `key`, in the order they were added.
    pub fn backlinks_for_key(&self, key: &str) -> &[String] {
        self.backlinks.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All backlink buckets sorted by key.
    pub fn backlink_buckets(&self) -> Vec<(&str, &[String])> {
        let mut buckets: Vec<_> = self
            .backlinks
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
            .collect();
        buckets.sort_by(|a, b| a.0.cmp(b.0));
        buckets
    }

    /// Indexes `content` for `path`.
    ///
    /// Equivalent to `commit(NoteMetadata::from_content(..))`, except that an
    /// unchanged hash returns before the content is parsed.
    pub fn upsert(&mut self, path: &str, content: &str, mtime: i64) -> UpsertOutcome {
        if let Some(existing) = self.notes.get(path) {
            if existing.content_hash == ContentHash::of_text(content) {
                return UpsertOutcome::Unchanged;
            }
        }
        self.commit(NoteMetadata::from_content(path, content, mtime))
    }

    /// Installs prepared metadata.
    ///
    /// If the path is already indexed with the same hash this is a no-op.
    /// Otherwise the previous note's backlink contributions are retracted
    /// before the new note and its backlinks go in.
    pub fn commit(&mut self, note: NoteMetadata) -> UpsertOutcome {
        if self
            .notes
            .get(&note.path)
            .is_some_and(|previous| previous.content_hash == note.content_hash)
        {
            return UpsertOutcome::Unchanged;
        }

        let outcome = match self.notes.remove(&note.path) {
            Some(previous) => {
                self.retract_backlinks(&previous.path, &previous.outlinks);
                UpsertOutcome::Updated
            }
            None => {
                self.order.push(note.path.clone());
                UpsertOutcome::Added
            }
        };

        self.add_backlinks(&note.path, &note.outlinks);
        self.notes.insert(note.path.clone(), note);
        outcome
    }

    /// Drops `path` and everything it contributed to the backlink map.
    ///
    /// Returns false if the path was not indexed.
    pub fn remove(&mut self, path: &str) -> bool {
        let Some(previous) = self.notes.remove(path) else {
            return false;
        };
        self.retract_backlinks(path, &previous.outlinks);
        self.order.retain(|p| p != path);
        true
    }

    fn add_backlinks(&mut self, source: &str, targets: &[String]) {
        for target in targets {
            let bucket = self.backlinks.entry(file_name_key(target)).or_default();
            if !bucket.iter().any(|s| s == source) {
                bucket.push(source.to_string());
            }
        }
    }

    fn retract_backlinks(&mut self, source: &str, targets: &[String]) {
        for target in targets {
            let key = file_name_key(target);
            if let Some(bucket) = self.backlinks.get_mut(&key) {
                bucket.retain(|s| s != source);
                if bucket.is_empty() {
                    self.backlinks.remove(&key);
                }
            }
        }
    }
}
