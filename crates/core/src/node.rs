//! The node model of the portfolio graph
//!
//! A [`Node`] is the only entity in the graph. Nodes own their children; the
//! `parent_id` field is a back-reference by id and never an ownership
//! relation. Polymorphic behaviour (embedding text, link shape, colour) is
//! dispatched on [`NodeType`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum_macros::{AsRefStr, Display, EnumString};

/// Opaque key/value bag attached by the detail merger
pub type Details = Map<String, Value>;

/// Parent id given to parsed children before identities are assigned
pub const PLACEHOLDER_PARENT_ID: &str = "temp";

/// Canonical attribute order of a serialized node.
///
/// Attributes not listed here are emitted after these, in insertion order,
/// and `children` is always emitted last.
pub const CANONICAL_KEYS: [&str; 14] = [
    "id",
    "name",
    "type",
    "path",
    "last_modified",
    "num_lines",
    "size",
    "color",
    "embedding",
    "position",
    "parent_id",
    "link",
    "details",
    "default_branch",
];

/// Variant tag of a node
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeType {
    Root,
    Project,
    Directory,
    File,
    Function,
}

impl NodeType {
    /// Whether nodes of this type embed their code content rather than their name
    pub fn embeds_content(self) -> bool {
        matches!(self, NodeType::File | NodeType::Function)
    }
}

/// One vertex of the synthesized hierarchy.
///
/// Field declaration order is the canonical serialization order (see
/// [`CANONICAL_KEYS`]); unknown attributes read from JSON are kept in
/// `extra` and written back just before `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: String,

    pub name: String,

    #[serde(rename = "type")]
    pub node_type: NodeType,

    /// Repository-relative path, computed once after parsing
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    /// ISO-8601 timestamp of the most recent change, if known
    #[serde(default)]
    pub last_modified: Option<String>,

    /// Line count for file nodes, `None` for structural nodes
    #[serde(default)]
    pub num_lines: Option<u64>,

    #[serde(default)]
    pub size: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default)]
    pub embedding: Vec<f32>,

    #[serde(default)]
    pub position: [f64; 3],

    #[serde(default)]
    pub parent_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,

    /// Attached source text; feeds the embedding annotator, never persisted
    #[serde(skip)]
    pub code: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,

    #[serde(default)]
    pub children: Vec<Node>,
}

impl Node {
    /// Create a bare node with no identity, layout or enrichment yet
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            node_type,
            path: String::new(),
            last_modified: None,
            num_lines: None,
            size: None,
            color: None,
            embedding: Vec::new(),
            position: [0.0, 0.0, 0.0],
            parent_id: None,
            link: None,
            details: None,
            default_branch: None,
            code: None,
            extra: Map::new(),
            children: Vec::new(),
        }
    }

    /// Create a file node
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, NodeType::File)
    }

    /// Create a directory node
    pub fn directory(name: impl Into<String>) -> Self {
        Self::new(name, NodeType::Directory)
    }

    pub fn is_file(&self) -> bool {
        self.node_type == NodeType::File
    }

    /// Last component of the node's path (falls back to the name before paths exist)
    pub fn base_name(&self) -> &str {
        if self.path.is_empty() {
            return &self.name;
        }
        self.path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.path.as_str())
    }

    /// Lower-cased extension of the node's name, including the leading dot
    pub fn extension(&self) -> String {
        file_extension(&self.name)
    }

    /// Pre-order traversal over this node and all of its descendants
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Visit this node and all descendants mutably, in pre-order
    pub fn walk_mut<F: FnMut(&mut Node)>(&mut self, f: &mut F) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }

    /// Total number of nodes in this subtree, including `self`
    pub fn count(&self) -> usize {
        self.iter().count()
    }
}

/// Pre-order iterator returned by [`Node::iter`]
pub struct PreOrder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Lower-cased extension of a file name, including the leading dot.
///
/// Leading dots of hidden files do not start an extension, so `.gitignore`
/// has no extension while `archive.tar.gz` has `.gz`. Returns an empty
/// string when there is no extension.
pub fn file_extension(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem_start = base.len() - base.trim_start_matches('.').len();
    match base[stem_start..].rfind('.') {
        Some(idx) => base[stem_start + idx..].to_lowercase(),
        None => String::new(),
    }
}
