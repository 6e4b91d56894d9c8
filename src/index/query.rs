//! Read-only queries over a [`LinkIndex`].

use super::LinkIndex;
use crate::domain::NoteMetadata;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// Number of search results returned when the caller gives no limit.
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Traversal depth used by `graph` when the caller gives none.
pub const DEFAULT_GRAPH_DEPTH: usize = 2;

/// Aggregate counts over the whole index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub total_notes: usize,
    /// Sum of raw outlink counts, duplicates included.
    pub total_links: usize,
    /// Sum of backlink bucket sizes.
    pub total_backlinks: usize,
}

/// Nodes and directed edges of (part of) the link graph.
///
/// Nodes are note paths or link file names, whichever the traversal reached.
/// Edges are `(from, to)` and may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkGraph {
    pub nodes: Vec<String>,
    pub edges: Vec<(String, String)>,
}

/// Notes linking to `file`.
///
/// `file` may be a path or a bare name; the lookup key is its file stem,
/// lower-cased, so `notes/Topic.md`, `Topic` and `topic.md` all agree.
pub fn backlinks(index: &LinkIndex, file: &str) -> Vec<String> {
    index.backlinks_for_key(&backlink_key(file)).to_vec()
}

/// Link file names in `file`, exactly as stored. Empty if not indexed.
pub fn outlinks(index: &LinkIndex, file: &str) -> Vec<String> {
    index
        .note(file)
        .map(|note| note.outlinks.clone())
        .unwrap_or_default()
}

/// Notes whose title or path contains `query`, case-insensitively.
///
/// Results come in index order and stop at `limit`.
pub fn search<'a>(index: &'a LinkIndex, query: &str, limit: usize) -> Vec<&'a NoteMetadata> {
    let needle = query.to_lowercase();
    index
        .notes()
        .filter(|note| {
            note.title.to_lowercase().contains(&needle)
                || note.path.to_lowercase().contains(&needle)
        })
        .take(limit)
        .collect()
}

pub fn stats(index: &LinkIndex) -> IndexStats {
    IndexStats {
        total_notes: index.len(),
        total_links: index.notes().map(|n| n.outlinks.len()).sum(),
        total_backlinks: index
            .backlink_buckets()
            .iter()
            .map(|(_, sources)| sources.len())
            .sum(),
    }
}

/// The link graph, either whole or around `center`.
///
/// Without a center every note is a node and every raw outlink an edge.
/// With a center the graph is explored depth first in both directions:
/// outlinks first, then backlinks, descending only while the current depth
/// is below `depth`. A node is visited at most once, but an edge is recorded
/// every time it is walked.
pub fn graph(index: &LinkIndex, center: Option<&str>, depth: usize) -> LinkGraph {
    match center {
        Some(center) => neighbourhood(index, center, depth),
        None => full_graph(index),
    }
}

fn full_graph(index: &LinkIndex) -> LinkGraph {
    let mut graph = LinkGraph::default();
    for note in index.notes() {
        graph.nodes.push(note.path.clone());
        for target in &note.outlinks {
            graph.edges.push((note.path.clone(), target.clone()));
        }
    }
    graph
}

/// One step out of a node: the edge to record and the node it leads to.
struct Step {
    edge: (String, String),
    next: String,
}

struct Frame {
    depth: usize,
    steps: Vec<Step>,
    cursor: usize,
}

impl Frame {
    fn enter(index: &LinkIndex, node: &str, depth: usize) -> Self {
        let forward = outlinks(index, node).into_iter().map(|target| Step {
            edge: (node.to_string(), target.clone()),
            next: target,
        });
        let backward = backlinks(index, node).into_iter().map(|source| Step {
            edge: (source.clone(), node.to_string()),
            next: source,
        });
        Self {
            depth,
            steps: forward.chain(backward).collect(),
            cursor: 0,
        }
    }
}

fn neighbourhood(index: &LinkIndex, center: &str, max_depth: usize) -> LinkGraph {
    let mut graph = LinkGraph::default();
    let mut visited = HashSet::new();

    visited.insert(center.to_string());
    graph.nodes.push(center.to_string());
    let mut stack = vec![Frame::enter(index, center, 0)];

    while let Some(frame) = stack.last_mut() {
        let Some(step) = frame.steps.get(frame.cursor) else {
            stack.pop();
            continue;
        };
        frame.cursor += 1;
        graph.edges.push(step.edge.clone());

        let depth = frame.depth;
        if depth < max_depth && visited.insert(step.next.clone()) {
            let next = step.next.clone();
            graph.nodes.push(next.clone());
            stack.push(Frame::enter(index, &next, depth + 1));
        }
    }

    graph
}

fn backlink_key(file: &str) -> String {
    let name = Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.to_lowercase()
}
