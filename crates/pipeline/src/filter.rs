//! Source-file filter
//!
//! Prunes files that are not source code according to the configured policy
//! table and drops directories left without children.

use repograph_core::config::FilterConfig;
use repograph_core::node::{file_extension, Node, NodeType};
use std::collections::HashSet;

/// Compiled filter policy
#[derive(Debug, Clone)]
pub struct FileFilter {
    allowed_extensions: HashSet<String>,
    allowed_names: HashSet<String>,
    denied_names: HashSet<String>,
    denied_extensions: HashSet<String>,
}

fn lowered(items: &[String]) -> HashSet<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}

impl FileFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            allowed_extensions: lowered(&config.allowed_extensions),
            allowed_names: lowered(&config.allowed_names),
            denied_names: lowered(&config.denied_names),
            denied_extensions: lowered(&config.denied_extensions),
        }
    }

    /// Whether a file name passes the policy.
    ///
    /// An allowed name wins over everything; otherwise a denied name or
    /// extension rejects the file, and only allowed extensions are kept.
    pub fn is_source_file(&self, name: &str) -> bool {
        let base = name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(name)
            .to_lowercase();
        if self.allowed_names.contains(&base) {
            return true;
        }
        if self.denied_names.contains(&base) {
            return false;
        }
        let ext = file_extension(&base);
        if self.denied_extensions.contains(&ext) {
            return false;
        }
        self.allowed_extensions.contains(&ext)
    }

    /// Bottom-up prune of a forest.
    ///
    /// Files are kept by policy; every other node is kept only when at least
    /// one child survives the recursive prune.
    pub fn filter_tree(&self, nodes: Vec<Node>) -> Vec<Node> {
        nodes
            .into_iter()
            .filter_map(|mut node| {
                if node.node_type == NodeType::File {
                    return self.is_source_file(&node.name).then_some(node);
                }
                node.children = self.filter_tree(std::mem::take(&mut node.children));
                (!node.children.is_empty()).then_some(node)
            })
            .collect()
    }
}

impl Default for FileFilter {
    fn default() -> Self {
        Self::new(&FilterConfig::default())
    }
}
