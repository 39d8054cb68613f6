//! Browsable source links for every node

use repograph_core::config::GithubConfig;
use repograph_core::node::{Node, NodeType};

/// Strip the `<owner>-<repo>/` directory the crawler nests everything under.
///
/// The comparison ignores ASCII case; backslashes are turned into `/` first.
pub fn strip_crawl_prefix(path: &str, owner: &str, repo: &str) -> String {
    let path = path.replace('\\', "/");
    let prefix = format!("{}-{}", owner.to_lowercase(), repo.to_lowercase());

    let stripped = match path.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(&prefix) => {
            let rest = &path[prefix.len()..];
            if rest.is_empty() || rest.starts_with('/') {
                rest.trim_start_matches('/')
            } else {
                path.as_str()
            }
        }
        _ => path.as_str(),
    };
    stripped.to_string()
}

/// Whether `name` is the crawler's `<owner>-<repo>` wrapper directory
pub fn is_crawl_prefix_dir(name: &str, owner: &str, repo: &str) -> bool {
    name.eq_ignore_ascii_case(&format!("{owner}-{repo}"))
}

/// Repository currently being walked
struct RepoContext {
    name: String,
    branch: String,
}

/// Derives `link` for every node from its type, path and the repository's
/// default branch
pub struct LinkResolver {
    web_url: String,
    owner: String,
    fallback_branch: String,
}

impl LinkResolver {
    pub fn new(config: &GithubConfig) -> Self {
        Self {
            web_url: config.web_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            fallback_branch: config.fallback_branch.clone(),
        }
    }

    /// Set links on the whole tree
    pub fn resolve(&self, root: &mut Node) {
        self.resolve_node(root, None);
    }

    fn resolve_node(&self, node: &mut Node, repo: Option<&RepoContext>) {
        let entered;
        let mut repo = repo;

        match node.node_type {
            NodeType::Root => {
                node.link = Some(format!("{}/{}", self.web_url, self.owner));
            }
            NodeType::Project => {
                node.link = Some(format!("{}/{}/{}", self.web_url, self.owner, node.name));
                entered = RepoContext {
                    name: node.name.clone(),
                    branch: node
                        .default_branch
                        .clone()
                        .filter(|b| !b.is_empty())
                        .unwrap_or_else(|| self.fallback_branch.clone()),
                };
                repo = Some(&entered);
            }
            NodeType::Directory => {
                node.link = repo.map(|r| self.path_link(r, "tree", &node.path));
            }
            NodeType::File => {
                node.link = repo.map(|r| self.path_link(r, "blob", &node.path));
            }
            NodeType::Function => {}
        }

        for child in &mut node.children {
            self.resolve_node(child, repo);
        }
    }

    fn path_link(&self, repo: &RepoContext, kind: &str, path: &str) -> String {
        let path = strip_crawl_prefix(path, &self.owner, &repo.name);
        format!(
            "{}/{}/{}/{kind}/{}/{path}",
            self.web_url, self.owner, repo.name, repo.branch
        )
    }
}
