//! Tool operations exposed to a tool-calling client, rendered as text.

mod protocol;

pub use protocol::{
    INDEX_URI, Reply, ReplyBody, Request, ResourceContents, ResourceRead, STATS_URI, TextContent,
    ToolCall, ToolResponse,
};

use crate::index::{
    DEFAULT_GRAPH_DEPTH, DEFAULT_SEARCH_LIMIT, LinkIndex, SharedIndex, export_index, query,
};
use crate::infra::NoteSource;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::debug;

/// Names of the tools [`ToolContext::call`] understands.
pub const TOOL_NAMES: &[&str] = &[
    "get_backlinks",
    "get_outlinks",
    "search_notes",
    "get_graph",
    "read_note",
];

#[derive(Deserialize)]
struct FileArgs {
    file: String,
}

#[derive(Deserialize)]
struct SearchArgs {
    query: String,
    #[serde(default)]
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct GraphArgs {
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    depth: Option<usize>,
}

/// Everything the tools need: the index and a way to read note files.
#[derive(Clone)]
pub struct ToolContext {
    shared: SharedIndex,
    source: Arc<dyn NoteSource>,
}

impl ToolContext {
    pub fn new(shared: SharedIndex, source: Arc<dyn NoteSource>) -> Self {
        Self { shared, source }
    }

    /// Notes that link to `file`.
    pub fn get_backlinks(&self, file: &str) -> ToolResponse {
        self.render(|index| {
            let sources = query::backlinks(index, file);
            if sources.is_empty() {
                return format!("No backlinks found for \"{file}\"");
            }
            let lines: Vec<String> = sources
                .iter()
                .map(|source| format!("- [[{}]] ({source})", title_or(index, source)))
                .collect();
            format!("## Backlinks to \"{file}\"\n\n{}", lines.join("\n"))
        })
    }

    /// Links inside `file`.
    pub fn get_outlinks(&self, file: &str) -> ToolResponse {
        self.render(|index| {
            let links = query::outlinks(index, file);
            if links.is_empty() {
                return format!("No outlinks found in \"{file}\"");
            }
            let lines: Vec<String> = links.iter().map(|link| format!("- [[{link}]]")).collect();
            format!("## Outlinks from \"{file}\"\n\n{}", lines.join("\n"))
        })
    }

    /// Notes whose title or path matches `query`.
    pub fn search_notes(&self, query_text: &str, limit: Option<usize>) -> ToolResponse {
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        self.render(|index| {
            let results = query::search(index, query_text, limit);
            if results.is_empty() {
                return format!("No notes found matching \"{query_text}\"");
            }
            let lines: Vec<String> = results
                .iter()
                .map(|note| {
                    format!(
                        "- **{}** ({})\n  Links: {} out, {} in",
                        note.title,
                        note.path,
                        note.outlinks.len(),
                        query::backlinks(index, &note.path).len()
                    )
                })
                .collect();
            format!("## Search Results for \"{query_text}\"\n\n{}", lines.join("\n"))
        })
    }

    /// The link graph as JSON, whole or around `file`.
    pub fn get_graph(&self, file: Option<&str>, depth: Option<usize>) -> ToolResponse {
        let depth = depth.unwrap_or(DEFAULT_GRAPH_DEPTH);
        let rendered = self.shared.read(|index| {
            let stats = query::stats(index);
            let graph = query::graph(index, file, depth);
            serde_json::to_string_pretty(&graph).map(|json| {
                let mut text = String::from("## Link Graph");
                if let Some(file) = file {
                    let _ = write!(text, " (centered on \"{file}\")");
                }
                let _ = write!(
                    text,
                    "\n\nStats: {} notes, {} links\n\n```json\n{json}\n```",
                    stats.total_notes, stats.total_links
                );
                text
            })
        });
        match rendered {
            Ok(Ok(text)) => ToolResponse::text(text),
            Ok(Err(e)) => ToolResponse::error(format!("Error rendering graph: {e}")),
            Err(e) => ToolResponse::error(e.to_string()),
        }
    }

    /// Header with link counts followed by the note's raw content.
    pub fn read_note(&self, file: &str) -> ToolResponse {
        let header = self.shared.read(|index| {
            let note = index.note(file);
            (
                note.map(|n| n.title.clone())
                    .unwrap_or_else(|| file.to_string()),
                note.map_or(0, |n| n.outlinks.len()),
                query::backlinks(index, file).len(),
            )
        });
        let (title, outlinks, backlinks) = match header {
            Ok(header) => header,
            Err(e) => return ToolResponse::error(e.to_string()),
        };

        match self.source.read_text(file) {
            Ok(content) => ToolResponse::text(format!(
                "## {title}\n\n**Path:** {file}\n**Outlinks:** {outlinks}\n**Backlinks:** {backlinks}\n\n---\n\n{content}"
            )),
            Err(e) => ToolResponse::error(format!("Error reading file: {e}")),
        }
    }

    /// Reads one of the JSON resources. `None` for an unknown URI.
    pub fn read_resource(&self, uri: &str) -> Option<ResourceContents> {
        let text = match uri {
            INDEX_URI => self
                .shared
                .read(|index| export_index(index).map_err(|e| e.to_string()))
                .map_err(|e| e.to_string())
                .and_then(|exported| exported),
            STATS_URI => self.shared.read(stats_json).map_err(|e| e.to_string()),
            _ => return None,
        };
        let text = text.unwrap_or_else(|error| json!({ "error": error }).to_string());
        Some(ResourceContents::json(uri, text))
    }

    /// Runs the named tool with JSON arguments.
    pub fn call(&self, name: &str, arguments: Value) -> ToolResponse {
        let arguments = if arguments.is_null() {
            json!({})
        } else {
            arguments
        };
        debug!(tool = name, "tool call");

        match name {
            "get_backlinks" => with_args(name, arguments, |a: FileArgs| {
                self.get_backlinks(&a.file)
            }),
            "get_outlinks" => with_args(name, arguments, |a: FileArgs| self.get_outlinks(&a.file)),
            "search_notes" => with_args(name, arguments, |a: SearchArgs| {
                self.search_notes(&a.query, a.limit)
            }),
            "get_graph" => with_args(name, arguments, |a: GraphArgs| {
                self.get_graph(a.file.as_deref(), a.depth)
            }),
            "read_note" => with_args(name, arguments, |a: FileArgs| self.read_note(&a.file)),
            _ => ToolResponse::error(format!("Unknown tool: {name}")),
        }
    }

    /// Answers one request.
    pub fn handle(&self, request: Request) -> Reply {
        match request {
            Request::Tool(call) => Reply {
                id: call.id,
                body: ReplyBody::Tool(self.call(&call.name, call.arguments)),
            },
            Request::Resource(read) => {
                let body = match self.read_resource(&read.uri) {
                    Some(contents) => ReplyBody::Resource {
                        contents: vec![contents],
                    },
                    None => ReplyBody::Error {
                        error: format!("Unknown resource: {}", read.uri),
                    },
                };
                Reply { id: read.id, body }
            }
        }
    }

    /// Parses and answers one request line, returning the response line.
    pub fn handle_line(&self, line: &str) -> String {
        let reply = match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request),
            Err(e) => Reply {
                id: None,
                body: ReplyBody::Error {
                    error: format!("Invalid request: {e}"),
                },
            },
        };
        reply.to_line()
    }

    fn render(&self, f: impl FnOnce(&LinkIndex) -> String) -> ToolResponse {
        match self.shared.read(f) {
            Ok(text) => ToolResponse::text(text),
            Err(e) => ToolResponse::error(e.to_string()),
        }
    }
}

fn with_args<A: DeserializeOwned>(
    name: &str,
    arguments: Value,
    run: impl FnOnce(A) -> ToolResponse,
) -> ToolResponse {
    match serde_json::from_value(arguments) {
        Ok(args) => run(args),
        Err(e) => ToolResponse::error(format!("Invalid arguments for {name}: {e}")),
    }
}

fn title_or<'a>(index: &'a LinkIndex, path: &'a str) -> &'a str {
    index
        .note(path)
        .map(|n| n.title.as_str())
        .filter(|t| !t.is_empty())
        .unwrap_or(path)
}

fn stats_json(index: &LinkIndex) -> String {
    let stats = query::stats(index);
    json!({
        "totalNotes": stats.total_notes,
        "totalLinks": stats.total_links,
        "totalBacklinks": stats.total_backlinks,
        "root": index.root().to_string_lossy(),
        "lastUpdated": index.last_updated().timestamp_millis(),
    })
    .to_string()
}
