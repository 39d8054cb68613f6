//! Extraction of per-file source blocks and attachment to file nodes

use regex::Regex;
use repograph_core::node::{Node, NodeType};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

/// `====` / `File: <path>` / `====` block header, also accepted on one line
static FILE_HEADER: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?m)^=+\s*File:[ \t]*([^\r\n]*?)\s*=+[ \t]*\r?$").ok()
});

/// One `File:` block of the code section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub path: String,
    pub content: String,
}

/// Split the code section into blocks, in document order.
///
/// A block's content runs from the end of its header to the next header or
/// the end of the text, with surrounding whitespace trimmed.
pub fn parse_code_blocks(text: &str) -> Vec<CodeBlock> {
    let Some(header) = FILE_HEADER.as_ref() else {
        return Vec::new();
    };

    let headers: Vec<(usize, usize, String)> = header
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let path = caps.get(1)?.as_str().trim().to_string();
            Some((whole.start(), whole.end(), path))
        })
        .collect();

    headers
        .iter()
        .enumerate()
        .map(|(i, (_, end, path))| {
            let next_start = headers.get(i + 1).map_or(text.len(), |(start, _, _)| *start);
            CodeBlock {
                path: path.clone(),
                content: text[*end..next_start].trim().to_string(),
            }
        })
        .collect()
}

/// Content lookup keyed by file base name.
///
/// When two blocks share a base name the later one wins, so same-named files
/// in different directories of one repository end up with the same content.
#[derive(Debug, Clone, Default)]
pub struct ContentIndex {
    by_base_name: HashMap<String, String>,
}

impl ContentIndex {
    pub fn from_blocks(blocks: Vec<CodeBlock>) -> Self {
        let mut by_base_name = HashMap::with_capacity(blocks.len());
        for block in blocks {
            let base = block
                .path
                .rsplit(['/', '\\'])
                .next()
                .unwrap_or(&block.path)
                .to_string();
            by_base_name.insert(base, block.content);
        }
        Self { by_base_name }
    }

    /// Parse a code section and index it by base name
    pub fn parse(text: &str) -> Self {
        Self::from_blocks(parse_code_blocks(text))
    }

    pub fn get(&self, base_name: &str) -> Option<&str> {
        self.by_base_name.get(base_name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_base_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_base_name.is_empty()
    }
}

/// Attach content and line counts to every file node of a forest.
///
/// Misses leave empty content and zero lines. Returns the number of misses.
pub fn attach_content(nodes: &mut [Node], index: &ContentIndex) -> usize {
    let mut misses = 0;
    for root in nodes.iter_mut() {
        root.walk_mut(&mut |node| {
            if node.node_type != NodeType::File {
                return;
            }
            match index.get(node.base_name()) {
                Some(code) => {
                    node.num_lines = Some(code.lines().count() as u64);
                    node.code = Some(code.to_string());
                }
                None => {
                    debug!("No content block for {}", node.path);
                    node.num_lines = Some(0);
                    node.code = Some(String::new());
                    misses += 1;
                }
            }
        });
    }
    misses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree_parser::{compute_paths, parse_listing};
    use pretty_assertions::assert_eq;

    const CODE: &str = "================================================\nFile: a.py\n================================================\nimport os\n\nprint(os.name)\n\n================================================\nFile: b/c.py\n================================================\nx = 1\n";

    #[test]
    fn test_parse_code_blocks() {
        let blocks = parse_code_blocks(CODE);
        assert_eq!(
            blocks,
            vec![
                CodeBlock {
                    path: "a.py".to_string(),
                    content: "import os\n\nprint(os.name)".to_string(),
                },
                CodeBlock {
                    path: "b/c.py".to_string(),
                    content: "x = 1".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_content_keeps_equals_signs() {
        let text = "====\nFile: eq.py\n====\na = b == c\n";
        let blocks = parse_code_blocks(text);
        assert_eq!(blocks[0].content, "a = b == c");
    }

    #[test]
    fn test_single_line_header() {
        let blocks = parse_code_blocks("==== File: x.go ====\npackage main");
        assert_eq!(blocks[0].path, "x.go");
        assert_eq!(blocks[0].content, "package main");
    }

    #[test]
    fn test_attach_sets_code_and_line_counts() {
        let mut forest = parse_listing("├── a.py\n├── missing.py\n└── b/\n    └── c.py");
        compute_paths(&mut forest, "");
        let misses = attach_content(&mut forest, &ContentIndex::parse(CODE));

        assert_eq!(misses, 1);
        assert_eq!(forest[0].num_lines, Some(3));
        assert_eq!(forest[1].num_lines, Some(0));
        assert_eq!(forest[1].code.as_deref(), Some(""));
        assert_eq!(forest[2].children[0].code.as_deref(), Some("x = 1"));
        assert_eq!(forest[2].num_lines, None);
    }

    #[test]
    fn test_same_base_name_shares_content() {
        let code = "====\nFile: x/util.py\n====\nfirst\n====\nFile: y/util.py\n====\nsecond\n";
        let mut forest = parse_listing("├── x/\n│   └── util.py\n└── y/\n    └── util.py");
        compute_paths(&mut forest, "");
        attach_content(&mut forest, &ContentIndex::parse(code));

        let x = forest[0].children[0].code.clone();
        let y = forest[1].children[0].code.clone();
        assert_eq!(x, y);
        assert_eq!(x.as_deref(), Some("second"));
    }
}
