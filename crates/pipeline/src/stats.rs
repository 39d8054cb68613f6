//! Node-type and extension counts of a graph

use repograph_core::node::{Node, NodeType};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Label used for files without an extension
const NO_EXTENSION: &str = "(none)";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphStats {
    pub total: usize,
    pub types: BTreeMap<String, usize>,
    /// Extension counts over file nodes only
    pub extensions: BTreeMap<String, usize>,
}

impl GraphStats {
    pub fn collect(root: &Node) -> Self {
        let mut stats = Self::default();
        for node in root.iter() {
            stats.total += 1;
            *stats.types.entry(node.node_type.to_string()).or_default() += 1;
            if node.node_type == NodeType::File {
                let ext = node.extension();
                let key = if ext.is_empty() {
                    NO_EXTENSION.to_string()
                } else {
                    ext
                };
                *stats.extensions.entry(key).or_default() += 1;
            }
        }
        stats
    }

    pub fn count_of(&self, node_type: NodeType) -> usize {
        self.types.get(node_type.as_ref()).copied().unwrap_or(0)
    }
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Node types distribution:")?;
        for (node_type, count) in &self.types {
            writeln!(f, "  {node_type}: {count}")?;
        }
        writeln!(f, "  total: {}", self.total)?;
        writeln!(f)?;
        writeln!(f, "Extensions distribution (for file nodes):")?;
        for (ext, count) in &self.extensions {
            writeln!(f, "  {ext}: {count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collect_counts() {
        let mut root = Node::new("me", NodeType::Root);
        let mut project = Node::new("p", NodeType::Project);
        let mut dir = Node::directory("src");
        dir.children = vec![Node::file("a.py"), Node::file("b.PY"), Node::file("Makefile")];
        project.children = vec![dir, Node::file("c.js")];
        root.children.push(project);

        let stats = GraphStats::collect(&root);
        assert_eq!(stats.total, 6);
        assert_eq!(stats.count_of(NodeType::File), 4);
        assert_eq!(stats.count_of(NodeType::Function), 0);
        assert_eq!(stats.extensions.get(".py"), Some(&2));
        assert_eq!(stats.extensions.get(".js"), Some(&1));
        assert_eq!(stats.extensions.get(NO_EXTENSION), Some(&1));

        let text = stats.to_string();
        assert!(text.contains("  file: 4"));
        assert!(text.contains("  total: 6"));
    }
}
