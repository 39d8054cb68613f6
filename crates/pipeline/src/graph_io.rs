//! Reading and writing the persisted graph document

use crate::normalize::{normalize_document, to_canonical_value};
use repograph_core::error::{Error, Result, ResultExt};
use repograph_core::node::Node;
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// Write `{"root": <node>}` as pretty JSON in canonical key order
pub fn write_graph(path: &Path, root: &Node) -> Result<()> {
    let mut document = serde_json::Map::new();
    document.insert("root".to_string(), to_canonical_value(root)?);
    write_json(path, &Value::Object(document))?;
    info!("Graph with {} nodes written to {}", root.count(), path.display());
    Ok(())
}

/// Read a graph document; a bare node without the `root` wrapper is accepted
pub fn read_graph(path: &Path) -> Result<Node> {
    let mut value = read_json(path)?;
    let root = match value.get_mut("root") {
        Some(root) => root.take(),
        None => value,
    };
    serde_json::from_value(root).map_err(|e| {
        Error::parse(
            path.display().to_string(),
            format!("not a graph document: {e}"),
        )
    })
}

/// Re-apply canonical key order to any node-shaped JSON document
pub fn normalize_file(input: &Path, output: &Path) -> Result<()> {
    let value = read_json(input)?;
    write_json(output, &normalize_document(value))
}

fn read_json(path: &Path) -> Result<Value> {
    let text =
        std::fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).context(format!("Invalid JSON in {}", path.display()))
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(value)?;
    std::fs::write(path, text).context(format!("Failed to write {}", path.display()))
}
