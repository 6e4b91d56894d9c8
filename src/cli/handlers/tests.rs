use super::*;
use crate::cli::output::OutputFormat;
use crate::cli::{IndexArgs, IndexSource};
use crate::domain::NoteMetadata;
use crate::index::{LinkIndex, SharedIndex, export_index, query};
use crate::infra::FsNoteSource;
use crate::tools::ToolContext;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

// Test helpers
fn sample_index() -> LinkIndex {
    let mut index = LinkIndex::new(PathBuf::from("/notes"));
    for (path, content) in [
        ("daily-log.md", "met [[Project Alpha]] team, see [[ideas#today]]"),
        ("project-alpha.md", "links to [[ideas]]"),
        ("ideas.md", "no links"),
    ] {
        index.commit(NoteMetadata::from_content(path, content, 0));
    }
    index
}

fn sample_workspace() -> (TempDir, Workspace) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.md"), "see [[b]]").unwrap();
    fs::write(dir.path().join("b.md"), "back to [[A]]").unwrap();
    let workspace = Workspace::new(dir.path().to_path_buf(), vec![".git".to_string()]);
    (dir, workspace)
}

fn json(text: &str) -> Value {
    serde_json::from_str(text).unwrap()
}

// ===========================================
// Workspace tests
// ===========================================

#[test]
fn workspace_root_is_canonical_when_it_exists() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("sub");
    fs::create_dir(&nested).unwrap();

    let workspace = Workspace::new(nested.join(".."), Vec::new());
    assert_eq!(workspace.root, dir.path().canonicalize().unwrap());
}

#[test]
fn workspace_keeps_missing_root_as_given() {
    let workspace = Workspace::new(PathBuf::from("/no/such/dir"), Vec::new());
    assert_eq!(workspace.root, PathBuf::from("/no/such/dir"));
}

#[test]
fn load_index_builds_workspace_without_snapshot() {
    let (_dir, workspace) = sample_workspace();
    let index = load_index(&workspace, &IndexSource::default()).unwrap();

    assert_eq!(index.len(), 2);
    assert_eq!(query::backlinks(&index, "a.md"), vec!["b.md".to_string()]);
}

#[test]
fn load_index_prefers_snapshot() {
    let (dir, workspace) = sample_workspace();
    let snapshot = dir.path().join("index.json");
    fs::write(&snapshot, export_index(&sample_index()).unwrap()).unwrap();

    let source = IndexSource {
        snapshot: Some(snapshot),
    };
    let index = load_index(&workspace, &source).unwrap();

    assert_eq!(index.root(), Path::new("/notes"));
    assert_eq!(index.len(), 3);
}

#[test]
fn read_snapshot_reports_bad_files() {
    let dir = TempDir::new().unwrap();
    let missing = read_snapshot(&dir.path().join("missing.json")).unwrap_err();
    assert!(format!("{missing:#}").contains("failed to read snapshot"));

    let garbage = dir.path().join("garbage.json");
    fs::write(&garbage, "{").unwrap();
    let err = read_snapshot(&garbage).unwrap_err();
    assert!(format!("{err:#}").contains("failed to load snapshot"));
}

// ===========================================
// index command tests
// ===========================================

#[test]
fn index_writes_snapshot_and_updates_it() {
    let (dir, workspace) = sample_workspace();
    let output = dir.path().join("out").join("index.json");
    fs::create_dir(dir.path().join("out")).unwrap();
    let args = IndexArgs {
        output: Some(output.clone()),
        full: false,
    };

    handle_index(&args, &workspace, false).unwrap();
    let first = read_snapshot(&output).unwrap();
    assert_eq!(first.len(), 2);

    fs::write(dir.path().join("c.md"), "[[a]]").unwrap();
    handle_index(&args, &workspace, false).unwrap();
    let second = read_snapshot(&output).unwrap();

    assert_eq!(second.len(), 3);
    assert_eq!(
        query::backlinks(&second, "a"),
        vec!["b.md".to_string(), "c.md".to_string()]
    );
}

#[test]
fn index_rebuilds_when_snapshot_has_other_root() {
    let (dir, workspace) = sample_workspace();
    let output = dir.path().join("index.json");
    fs::write(&output, export_index(&sample_index()).unwrap()).unwrap();

    let args = IndexArgs {
        output: Some(output.clone()),
        full: false,
    };
    handle_index(&args, &workspace, false).unwrap();

    let index = read_snapshot(&output).unwrap();
    assert_eq!(index.root(), workspace.root.as_path());
    assert!(index.note("daily-log.md").is_none());
    assert!(index.note("a.md").is_some());
}

// ===========================================
// backlinks / outlinks rendering tests
// ===========================================

#[test]
fn backlinks_human_lists_titles_and_paths() {
    let out = links::render_backlinks(&sample_index(), "ideas.md", OutputFormat::Human).unwrap();

    assert!(out.contains("Daily Log"));
    assert!(out.contains("project-alpha.md"));
    assert!(out.ends_with("2 backlink(s)\n"));
}

#[test]
fn backlinks_empty_says_so() {
    let out = links::render_backlinks(&sample_index(), "nothing", OutputFormat::Human).unwrap();
    assert_eq!(out, "No backlinks found.\n");
}

#[test]
fn backlinks_json_wraps_listings() {
    let out = links::render_backlinks(&sample_index(), "IDEAS", OutputFormat::Json).unwrap();
    let value = json(&out);

    assert_eq!(value["data"][0]["path"], "daily-log.md");
    assert_eq!(value["data"][0]["title"], "Daily Log");
    assert_eq!(value["data"].as_array().unwrap().len(), 2);
}

#[test]
fn backlinks_paths_are_absolute() {
    let out = links::render_backlinks(&sample_index(), "ideas", OutputFormat::Paths).unwrap();
    assert_eq!(out, "/notes/daily-log.md\n/notes/project-alpha.md\n");
}

#[test]
fn outlinks_keep_link_case_and_duplicates() {
    let mut index = sample_index();
    index.commit(NoteMetadata::from_content("x.md", "[[Foo]] [[foo]] [[Foo]]", 0));

    let out = links::render_outlinks(&index, "x.md", OutputFormat::Paths).unwrap();
    assert_eq!(out, "Foo\nfoo\nFoo\n");

    let human = links::render_outlinks(&index, "x.md", OutputFormat::Human).unwrap();
    assert!(human.starts_with("[[Foo]]\n"));
    assert!(human.ends_with("3 outlink(s)\n"));
}

#[test]
fn outlinks_for_unknown_note_are_empty() {
    let out = links::render_outlinks(&sample_index(), "missing.md", OutputFormat::Json).unwrap();
    assert_eq!(json(&out)["data"], Value::Array(Vec::new()));
}

// ===========================================
// search rendering tests
// ===========================================

#[test]
fn search_human_shows_link_counts() {
    let out = search::render_search(&sample_index(), "alpha", 10, OutputFormat::Human).unwrap();

    assert_eq!(
        out,
        "Project Alpha (project-alpha.md)\n  1 out, 0 in\n\n1 result(s)\n"
    );
}

#[test]
fn search_respects_limit() {
    let out = search::render_search(&sample_index(), ".md", 2, OutputFormat::Json).unwrap();
    assert_eq!(json(&out)["data"].as_array().unwrap().len(), 2);
}

#[test]
fn search_without_hits() {
    let out = search::render_search(&sample_index(), "zzz", 10, OutputFormat::Human).unwrap();
    assert_eq!(out, "No matching notes found.\n");
}

// ===========================================
// graph / stats rendering tests
// ===========================================

#[test]
fn graph_human_lists_edges_and_totals() {
    let out = graph::render_graph(&sample_index(), None, 2, OutputFormat::Human).unwrap();

    assert!(out.contains("daily-log.md -> Project Alpha\n"));
    assert!(out.contains("project-alpha.md -> ideas\n"));
    assert!(out.ends_with("node(s), 3 edge(s)\n"));
}

#[test]
fn graph_json_has_nodes_and_edges() {
    let out = graph::render_graph(&sample_index(), Some("ideas.md"), 1, OutputFormat::Json).unwrap();
    let value = json(&out);

    assert_eq!(value["data"]["nodes"][0], "ideas.md");
    assert!(value["data"]["edges"].as_array().unwrap().len() >= 2);
}

#[test]
fn stats_json_uses_camel_case() {
    let out = graph::render_stats(&sample_index(), OutputFormat::Json).unwrap();
    let value = json(&out);

    assert_eq!(value["data"]["totalNotes"], 3);
    assert_eq!(value["data"]["totalLinks"], 3);
    assert_eq!(value["data"]["totalBacklinks"], 3);
}

#[test]
fn stats_human_lists_root() {
    let out = graph::render_stats(&sample_index(), OutputFormat::Human).unwrap();
    assert!(out.starts_with("Root:      /notes\n"));
    assert!(out.contains("Notes:     3\n"));
}

// ===========================================
// serve loop tests
// ===========================================

#[tokio::test]
async fn serve_answers_each_line_in_order() {
    let tools = ToolContext::new(
        SharedIndex::with_index(sample_index()),
        Arc::new(FsNoteSource::new("/notes")),
    );
    let input = concat!(
        r#"{"id":1,"name":"get_backlinks","arguments":{"file":"ideas.md"}}"#,
        "\n\n",
        r#"{"id":2,"uri":"wikilinks://stats"}"#,
        "\n",
        "garbage\n",
    );

    let mut output = Vec::new();
    serve::answer_requests(&tools, input.as_bytes(), &mut output)
        .await
        .unwrap();

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(json)
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["id"], 1);
    assert!(lines[0]["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("daily-log.md"));
    assert_eq!(lines[1]["id"], 2);
    assert!(lines[2]["error"].as_str().unwrap().starts_with("Invalid request"));
}

#[tokio::test]
async fn serve_before_index_reports_not_initialized() {
    let tools = ToolContext::new(SharedIndex::new(), Arc::new(FsNoteSource::new("/notes")));
    let input = r#"{"name":"get_outlinks","arguments":{"file":"a.md"}}"#;

    let mut output = Vec::new();
    serve::answer_requests(&tools, input.as_bytes(), &mut output)
        .await
        .unwrap();

    let reply = json(String::from_utf8(output).unwrap().trim());
    assert_eq!(reply["isError"], true);
    assert_eq!(reply["content"][0]["text"], "Index not initialized");
}
