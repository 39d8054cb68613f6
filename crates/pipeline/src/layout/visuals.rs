//! Node size and colour

use repograph_core::node::{Node, NodeType};

/// Colour of file nodes with an unknown extension
pub const DEFAULT_FILE_COLOR: &str = "#FFC107";

/// Colour of non-file nodes with an unknown type
pub const DEFAULT_TYPE_COLOR: &str = "#FFFFFF";

/// Colour by node type for everything that is not a file
pub fn type_color(node_type: &str) -> &'static str {
    match node_type.to_lowercase().as_str() {
        "ai" => "#4CAF50",
        "web" => "#2196F3",
        "directory" => "#9E9E9E",
        "project" => "#FF5722",
        _ => DEFAULT_TYPE_COLOR,
    }
}

/// Colour by file extension (lower-cased, with the dot)
pub fn extension_color(ext: &str) -> &'static str {
    match ext {
        ".py" => "#3572A5",
        ".js" => "#F1E05A",
        ".ts" => "#2B7489",
        ".html" => "#E34C26",
        ".css" => "#563D7C",
        ".cpp" => "#f34b7d",
        ".c" => "#555555",
        ".java" => "#b07219",
        ".rb" => "#701516",
        ".go" => "#00ADD8",
        ".php" => "#4F5D95",
        ".sh" => "#89e051",
        ".ipynb" => "#FEC945",
        _ => DEFAULT_FILE_COLOR,
    }
}

pub fn node_color(node: &Node) -> &'static str {
    match node.node_type {
        NodeType::File => extension_color(&node.extension()),
        other => type_color(other.as_ref()),
    }
}

/// `scale * ln(n + 1)` for a positive line count, else `scale`
pub fn node_size(num_lines: Option<u64>, scale: f64) -> f64 {
    match num_lines {
        Some(n) if n > 0 => scale * ((n as f64) + 1.0).ln(),
        _ => scale,
    }
}

/// Set size and colour on every node of a tree
pub fn apply_visuals(root: &mut Node, size_scale: f64) {
    root.walk_mut(&mut |node| {
        node.size = Some(node_size(node.num_lines, size_scale));
        node.color = Some(node_color(node).to_string());
    });
}
