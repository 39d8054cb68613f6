//! Integration tests for the CLI subcommands
//!
//! Commands run offline against a mock embedding provider inside a
//! temporary workspace.

use pretty_assertions::assert_eq;
use repograph::commands;
use repograph::Config;
use repograph_core::node::NodeType;
use repograph_pipeline::read_graph;
use repograph_server::{load_corpus, DocumentSource};
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

const DOC: &str = "### Directory Structure ###
Directory structure:
└── jane-demo/
    ├── main.py
    ├── notes.md
    └── lib/
        └── util.py

### Code Content ###
================================================
File: main.py
================================================
from lib import util
print(util.VALUE)

================================================
File: lib/util.py
================================================
VALUE = 1
";

fn workspace() -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    let dataset = dir.path().join("dataset");
    let details = dir.path().join("details");
    std::fs::create_dir_all(&dataset).unwrap();
    std::fs::create_dir_all(&details).unwrap();
    std::fs::write(dataset.join("demo.txt"), DOC).unwrap();
    std::fs::write(
        details.join("demo.json"),
        json!({"project": {"summary": "A small demo. It prints a value."}}).to_string(),
    )
    .unwrap();

    let mut config = Config::default();
    config.github.owner = "jane".to_string();
    config.embeddings.provider = "mock".to_string();
    config.embeddings.embedding_dimension = 8;
    config.layout.seed = Some(5);
    config.paths.dataset_dir = dataset.to_string_lossy().into_owned();
    config.paths.details_dir = details.to_string_lossy().into_owned();
    config.paths.output_file = dir.path().join("out/graph.json").to_string_lossy().into_owned();
    config.paths.rag_data_file = dir.path().join("rag.json").to_string_lossy().into_owned();
    (dir, config)
}

#[tokio::test]
async fn test_build_writes_graph_offline() {
    let (_dir, config) = workspace();

    let report = commands::build(&config, true).await.unwrap();
    assert_eq!(report.repositories_processed(), 1);
    assert_eq!(report.files_dropped(), 1);
    assert!(report.missing_details().is_empty());

    let root = read_graph(Path::new(&config.paths.output_file)).unwrap();
    assert_eq!(root.node_type, NodeType::Root);
    assert_eq!(root.children.len(), 1);

    let project = &root.children[0];
    assert_eq!(project.name, "demo");
    let names: Vec<&str> = project.children.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["main.py", "lib"]);
    assert_eq!(
        project.children[0].link.as_deref(),
        Some("https://github.com/jane/demo/blob/main/main.py")
    );

    let stats = commands::stats(Path::new(&config.paths.output_file)).unwrap();
    assert_eq!(stats.count_of(NodeType::Project), 1);
    assert_eq!(stats.count_of(NodeType::File), 2);
    assert_eq!(stats.extensions.get(".py"), Some(&2));
}

#[tokio::test]
async fn test_build_fails_without_dataset_directory() {
    let (dir, mut config) = workspace();
    config.paths.dataset_dir = dir.path().join("missing").to_string_lossy().into_owned();

    assert!(commands::build(&config, true).await.is_err());
    assert!(!Path::new(&config.paths.output_file).exists());
}

#[tokio::test]
async fn test_prepare_rag_writes_corpus() {
    let (_dir, config) = workspace();

    let count = commands::prepare_rag(&config).await.unwrap();
    assert_eq!(count, 2);

    let corpus = load_corpus(Path::new(&config.paths.rag_data_file)).unwrap();
    assert_eq!(corpus[0].doc_id, "demo.txt");
    assert_eq!(corpus[1].doc_id, "demo.json");
    assert_eq!(corpus[1].source, DocumentSource::Json);
    assert_eq!(corpus[1].sentence_embeddings.len(), 2);
    assert!(corpus.iter().all(|d| d.is_searchable()));
}

#[test]
fn test_normalize_in_place_and_to_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("raw.json");
    std::fs::write(
        &input,
        json!({"type": "file", "name": "a.py", "id": "x", "children": []}).to_string(),
    )
    .unwrap();

    let output = dir.path().join("normalized.json");
    let written = commands::normalize(&input, Some(&output)).unwrap();
    assert_eq!(written, output);
    let normalized: Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let keys: Vec<&str> = normalized
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(keys.first(), Some(&"id"));

    let written = commands::normalize(&input, None).unwrap();
    assert_eq!(written, input);
    let rewritten: Value =
        serde_json::from_str(&std::fs::read_to_string(&input).unwrap()).unwrap();
    assert_eq!(rewritten, normalized);
}

#[test]
fn test_stats_rejects_invalid_graph() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();
    assert!(commands::stats(&path).is_err());
}
