//! Overlay of externally authored project and file details
//!
//! Runs three passes over the tree: attach each project's record, promote
//! matching `files` entries onto file nodes, then strip the `files` list from
//! the project so every fact lives in one place.

use repograph_core::error::{Result, ResultExt};
use repograph_core::node::{Details, Node, NodeType};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Key of the per-file entries inside a project record
const FILES_KEY: &str = "files";

/// Provider of per-project detail records
pub trait DetailSource: Send + Sync {
    /// The full record for `project` (the object holding a `project` key),
    /// or `None` when there is none
    fn project_record(&self, project: &str) -> Option<Value>;
}

/// Reads `<dir>/<project>.json`
#[derive(Debug, Clone)]
pub struct DirectoryDetailSource {
    dir: PathBuf,
}

impl DirectoryDetailSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn read(&self, path: &Path) -> Result<Value> {
        let text = std::fs::read_to_string(path)
            .context(format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&text).context(format!("Invalid JSON in {}", path.display()))
    }
}

impl DetailSource for DirectoryDetailSource {
    fn project_record(&self, project: &str) -> Option<Value> {
        let path = self.dir.join(format!("{project}.json"));
        if !path.exists() {
            return None;
        }
        match self.read(&path) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring detail record for {project}: {e}");
                None
            }
        }
    }
}

/// Detail records held in memory, keyed by project name
#[derive(Debug, Clone, Default)]
pub struct InMemoryDetailSource {
    records: HashMap<String, Value>,
}

impl InMemoryDetailSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(mut self, project: impl Into<String>, record: Value) -> Self {
        self.records.insert(project.into(), record);
        self
    }
}

impl DetailSource for InMemoryDetailSource {
    fn project_record(&self, project: &str) -> Option<Value> {
        self.records.get(project).cloned()
    }
}

/// Run all three merge passes. Returns the projects that had no record.
pub fn merge_details(root: &mut Node, source: &dyn DetailSource) -> Vec<String> {
    let missing = overlay_project_details(root, source);
    overlay_file_details(root, None);
    strip_file_lists(root);
    missing
}

/// Pass 1: attach the `project` object of each project's record as `details`.
///
/// A project without a record keeps whatever `details` it had.
pub fn overlay_project_details(root: &mut Node, source: &dyn DetailSource) -> Vec<String> {
    let mut missing = Vec::new();
    root.walk_mut(&mut |node| {
        if node.node_type != NodeType::Project {
            return;
        }
        match source.project_record(&node.name) {
            Some(record) => {
                let details = match record.get("project") {
                    Some(Value::Object(map)) => map.clone(),
                    Some(_) => {
                        warn!("Detail record for {} has a non-object project", node.name);
                        Details::new()
                    }
                    None => Details::new(),
                };
                debug!("Attached details to project {}", node.name);
                node.details = Some(details);
            }
            None => {
                warn!("No details record for project '{}'", node.name);
                missing.push(node.name.clone());
            }
        }
    });
    missing
}

/// Pass 2: promote the first `files` entry whose `path` equals a file's base
/// name onto that file node. The carried list is reset at every project.
pub fn overlay_file_details(node: &mut Node, files: Option<&[Value]>) {
    let own_files;
    let mut files = files;

    match node.node_type {
        NodeType::Project => {
            own_files = node
                .details
                .as_ref()
                .filter(|d| !d.is_empty())
                .and_then(|d| d.get(FILES_KEY))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            files = Some(own_files.as_slice());
        }
        NodeType::File => {
            let base = node.base_name().to_string();
            let entry = files.into_iter().flatten().find_map(|entry| {
                let map = entry.as_object()?;
                (map.get("path").and_then(Value::as_str) == Some(base.as_str()))
                    .then(|| map.clone())
            });
            if let Some(details) = entry {
                node.details = Some(details);
            }
        }
        _ => {}
    }

    for child in &mut node.children {
        overlay_file_details(child, files);
    }
}

/// Pass 3: remove the `files` list from every project's details
pub fn strip_file_lists(root: &mut Node) {
    root.walk_mut(&mut |node| {
        if node.node_type == NodeType::Project {
            if let Some(details) = node.details.as_mut() {
                details.remove(FILES_KEY);
            }
        }
    });
}
