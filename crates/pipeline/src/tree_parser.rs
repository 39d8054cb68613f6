//! Indented listing parser
//!
//! Builds a forest of [`Node`]s from listing text where every entry is
//! prefixed by a branch marker (`├──` or `└──`) whose column encodes depth.

use regex::Regex;
use repograph_core::node::{Node, NodeType, PLACEHOLDER_PARENT_ID};
use std::sync::LazyLock;
use tracing::{debug, trace};

static BRANCH_MARKER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new("└──|├──").ok());

/// Header line some crawlers emit before the listing itself
const LISTING_HEADER: &str = "Directory structure:";

/// Parse listing text into an ordered forest.
///
/// Depth is taken from the column of the branch marker alone, so irregular
/// but monotonic indentation still nests correctly. Blank lines and lines
/// without a marker are skipped. Children receive the placeholder parent id;
/// real ids are assigned after filtering.
pub fn parse_listing(text: &str) -> Vec<Node> {
    let Some(marker) = BRANCH_MARKER.as_ref() else {
        return Vec::new();
    };

    let mut lines = text.lines().peekable();
    if lines
        .peek()
        .is_some_and(|first| first.contains(LISTING_HEADER))
    {
        lines.next();
    }

    let mut forest = Vec::new();
    let mut stack: Vec<(usize, Node)> = Vec::new();

    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let Some(found) = marker.find(line) else {
            trace!("Skipping listing line without branch marker: {line:?}");
            continue;
        };

        let indent = line[..found.start()].chars().count();
        let entry = line[found.end()..].trim();
        let is_directory = entry.ends_with('/');
        let name = entry.trim_end_matches('/');
        if name.is_empty() {
            continue;
        }

        while stack.last().is_some_and(|(top, _)| *top >= indent) {
            close_scope(&mut stack, &mut forest);
        }

        let node_type = if is_directory {
            NodeType::Directory
        } else {
            NodeType::File
        };
        let mut node = Node::new(name, node_type);
        if !stack.is_empty() {
            node.parent_id = Some(PLACEHOLDER_PARENT_ID.to_string());
        }
        stack.push((indent, node));
    }

    while !stack.is_empty() {
        close_scope(&mut stack, &mut forest);
    }

    debug!("Parsed listing into {} top-level entries", forest.len());
    forest
}

/// Pop the innermost open node and attach it to its parent (or the forest)
fn close_scope(stack: &mut Vec<(usize, Node)>, forest: &mut Vec<Node>) {
    if let Some((_, node)) = stack.pop() {
        match stack.last_mut() {
            Some((_, parent)) => parent.children.push(node),
            None => forest.push(node),
        }
    }
}

/// Compute every node's repository-relative path from its ancestors' names
pub fn compute_paths(nodes: &mut [Node], parent_path: &str) {
    for node in nodes {
        node.path = if parent_path.is_empty() {
            node.name.clone()
        } else {
            format!("{parent_path}/{}", node.name)
        };
        let path = node.path.clone();
        compute_paths(&mut node.children, &path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shape(nodes: &[Node]) -> Vec<String> {
        let mut out = Vec::new();
        for root in nodes {
            out.extend(root.iter().map(|n| format!("{}:{}", n.path, n.node_type)));
        }
        out
    }

    #[test]
    fn test_nesting_follows_marker_column() {
        let text = "├── a.py\n└── b/\n    ├── c.py\n    └── d/\n        └── e.py";
        let mut forest = parse_listing(text);
        compute_paths(&mut forest, "");

        assert_eq!(
            shape(&forest),
            vec![
                "a.py:file",
                "b:directory",
                "b/c.py:file",
                "b/d:directory",
                "b/d/e.py:file",
            ]
        );
        assert_eq!(forest[0].parent_id, None);
        assert_eq!(
            forest[1].children[0].parent_id.as_deref(),
            Some(PLACEHOLDER_PARENT_ID)
        );
    }

    #[test]
    fn test_dedent_closes_several_scopes() {
        let text = "└── a/\n    └── b/\n        └── c.py\n└── z.py";
        let forest = parse_listing(text);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].children[0].children[0].name, "c.py");
        assert_eq!(forest[1].name, "z.py");
    }

    #[test]
    fn test_header_blank_and_noise_lines_are_skipped() {
        let text = "Directory structure:\n\nstray text\n└── repo/\n    └── main.go\n";
        let forest = parse_listing(text);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].name, "repo");
        assert_eq!(forest[0].children.len(), 1);
    }

    #[test]
    fn test_trailing_slash_marks_empty_directory() {
        let forest = parse_listing("└── empty/");
        assert_eq!(forest[0].node_type, NodeType::Directory);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn test_irregular_indentation_is_tolerated() {
        let text = "└── a/\n  └── b/\n       └── deep.py\n  └── c.py";
        let forest = parse_listing(text);
        let a = &forest[0];
        assert_eq!(a.children.len(), 2);
        assert_eq!(a.children[0].name, "b");
        assert_eq!(a.children[0].children[0].name, "deep.py");
        assert_eq!(a.children[1].name, "c.py");
    }

    #[test]
    fn test_paths_join_parent_path_and_name() {
        let mut forest = parse_listing("└── src/\n    └── lib/\n        └── x.ts");
        compute_paths(&mut forest, "");
        for root in &forest {
            check_paths(root, "");
        }
    }

    fn check_paths(node: &Node, parent: &str) {
        let expected = if parent.is_empty() {
            node.name.clone()
        } else {
            format!("{parent}/{}", node.name)
        };
        assert_eq!(node.path, expected);
        for child in &node.children {
            check_paths(child, &node.path);
        }
    }
}
