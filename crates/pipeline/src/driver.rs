//! Pipeline driver: crawled documents in, laid-out graph out

use crate::annotate::EmbeddingAnnotator;
use crate::content::{attach_content, ContentIndex};
use crate::document::CrawlDocument;
use crate::filter::FileFilter;
use crate::identity::{assign_child_ids, child_id};
use crate::layout::LayoutEngine;
use crate::links::{is_crawl_prefix_dir, LinkResolver};
use crate::merge::{merge_details, DetailSource};
use crate::metadata::RepositoryMetadata;
use crate::report::CrawlReport;
use crate::timestamps::{annotate_file_timestamps, latest, latest_in_subtree};
use crate::tree_parser::{compute_paths, parse_listing};
use repograph_core::config::{Config, GithubConfig, LayoutConfig};
use repograph_core::error::{Result, ResultExt};
use repograph_core::node::{Node, NodeType};
use repograph_embeddings::EmbeddingManager;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One crawled repository document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryInput {
    /// Repository name (the document's file stem)
    pub name: String,
    pub text: String,
}

impl RepositoryInput {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Result of a pipeline run
#[derive(Debug)]
pub struct GraphBuild {
    pub root: Node,
    pub report: CrawlReport,
}

/// Runs every stage, strictly one after another, over the whole tree
pub struct PipelineDriver {
    github: GithubConfig,
    layout: LayoutConfig,
    filter: FileFilter,
    embeddings: Arc<EmbeddingManager>,
    annotator: EmbeddingAnnotator,
    metadata: Arc<dyn RepositoryMetadata>,
}

impl PipelineDriver {
    pub fn new(
        config: &Config,
        embeddings: Arc<EmbeddingManager>,
        metadata: Arc<dyn RepositoryMetadata>,
    ) -> Self {
        let annotator = EmbeddingAnnotator::new(
            embeddings.clone(),
            config.embeddings.max_text_chars,
            config.embeddings.texts_per_api_request,
        );
        Self {
            github: config.github.clone(),
            layout: config.layout.clone(),
            filter: FileFilter::new(&config.filter),
            embeddings,
            annotator,
            metadata,
        }
    }

    /// Build the whole graph: one project per repository under a single root,
    /// then details, layout and links.
    pub async fn build_graph(
        &self,
        repos: &[RepositoryInput],
        details: &dyn DetailSource,
    ) -> GraphBuild {
        let mut report = CrawlReport::new();

        let mut root = Node::new(self.github.root_name(), NodeType::Root);
        root.id = self.github.owner.clone();

        for repo in repos {
            if let Some(project) = self.build_repo_node(&repo.name, &repo.text, &mut report).await {
                root.children.push(project);
            }
        }

        match self.embeddings.embed_one(&root.name).await {
            Ok(vector) => root.embedding = vector,
            Err(e) => {
                warn!("Failed to embed root node: {e}");
                report.add_embedding_failures(1);
            }
        }
        root.last_modified = latest(
            root.children
                .iter()
                .filter_map(|p| p.last_modified.as_deref()),
        );

        for project in merge_details(&mut root, details) {
            report.record_missing_details(project);
        }

        LayoutEngine::new(self.layout.clone()).apply(&mut root);
        LinkResolver::new(&self.github).resolve(&mut root);

        info!(
            "Built graph with {} projects and {} nodes",
            root.children.len(),
            root.count()
        );
        GraphBuild { root, report }
    }

    /// Turn one crawled document into an annotated project node.
    ///
    /// Returns `None`, and records the repository as skipped, when the
    /// document has no code section.
    pub async fn build_repo_node(
        &self,
        repo: &str,
        text: &str,
        report: &mut CrawlReport,
    ) -> Option<Node> {
        let Some(document) = CrawlDocument::split(text) else {
            warn!("Skipping {repo}: no code content section");
            report.record_skipped(repo);
            return None;
        };

        let mut nodes = parse_listing(&document.listing);
        compute_paths(&mut nodes, "");

        let listed_files = count_files(&nodes);
        for node in nodes.iter().flat_map(|n| n.iter()) {
            if node.is_file() {
                let ext = node.extension();
                if !ext.is_empty() {
                    report.record_extension(ext);
                }
            }
        }

        let mut nodes = self.filter.filter_tree(nodes);
        report.add_files_dropped(listed_files - count_files(&nodes));

        let owner = self.github.owner.as_str();
        let wrapped = matches!(
            nodes.as_slice(),
            [single] if single.node_type == NodeType::Directory
                && is_crawl_prefix_dir(&single.name, owner, repo)
        );
        if wrapped {
            let prefix = nodes.remove(0);
            debug!("Flattening crawl prefix directory {}", prefix.name);
            nodes = prefix.children;
        }

        let index = ContentIndex::parse(&document.code);
        report.add_content_misses(attach_content(&mut nodes, &index));

        let failures =
            annotate_file_timestamps(&mut nodes, owner, repo, self.metadata.as_ref()).await;
        report.add_metadata_failures(failures);

        let mut project = Node::new(repo, NodeType::Project);
        project.id = child_id(owner, repo);
        project.parent_id = Some(owner.to_string());
        project.children = nodes;
        assign_child_ids(&mut project);

        report.add_embedding_failures(self.annotator.annotate(&mut project).await);

        project.last_modified = latest_in_subtree(&project);
        project.default_branch = Some(self.resolve_default_branch(repo, report).await);

        report.record_processed();
        info!("Processed {repo}: {} nodes", project.count());
        Some(project)
    }

    async fn resolve_default_branch(&self, repo: &str, report: &mut CrawlReport) -> String {
        match self.metadata.default_branch(repo).await {
            Ok(Some(branch)) => branch,
            Ok(None) => self.github.fallback_branch.clone(),
            Err(e) => {
                warn!("Default branch lookup failed for {repo}: {e}");
                report.add_metadata_failures(1);
                self.github.fallback_branch.clone()
            }
        }
    }
}

fn count_files(nodes: &[Node]) -> usize {
    nodes
        .iter()
        .flat_map(|n| n.iter())
        .filter(|n| n.is_file())
        .count()
}

/// Read every `<repo>.txt` document of a dataset directory, sorted by file name
pub fn read_dataset(dir: &Path) -> Result<Vec<RepositoryInput>> {
    let entries = std::fs::read_dir(dir)
        .context(format!("Failed to read dataset directory {}", dir.display()))?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.context("Failed to read dataset entry")?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut repos = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            warn!("Skipping dataset file with a non UTF-8 name: {}", path.display());
            continue;
        };
        let bytes = std::fs::read(&path).context(format!("Failed to read {}", path.display()))?;
        repos.push(RepositoryInput::new(
            name,
            String::from_utf8_lossy(&bytes).into_owned(),
        ));
    }

    info!("Loaded {} repository documents from {}", repos.len(), dir.display());
    Ok(repos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::InMemoryDetailSource;
    use crate::metadata::OfflineMetadata;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    struct FixedMetadata;

    #[async_trait]
    impl RepositoryMetadata for FixedMetadata {
        async fn last_commit(&self, _repo: &str, path: &str) -> Result<Option<String>> {
            Ok(match path {
                "a.py" => Some("2024-01-01T00:00:00Z".to_string()),
                "b/c.py" => Some("2024-06-01T00:00:00Z".to_string()),
                _ => None,
            })
        }

        async fn default_branch(&self, _repo: &str) -> Result<Option<String>> {
            Ok(Some("develop".to_string()))
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.github.owner = "jane".to_string();
        config.layout.seed = Some(11);
        config
    }

    fn driver(metadata: Arc<dyn RepositoryMetadata>) -> PipelineDriver {
        PipelineDriver::new(&config(), Arc::new(EmbeddingManager::mock(8)), metadata)
    }

    const DOC: &str = "### Directory Structure ###\nDirectory structure:\n└── jane-demo/\n    ├── a.py\n    ├── README.md\n    └── b/\n        └── c.py\n\n### Code Content ###\n================================================\nFile: a.py\n================================================\nprint('a')\n\n================================================\nFile: b/c.py\n================================================\nx = 1\ny = 2\n";

    #[tokio::test]
    async fn test_build_repo_node_flattens_prefix_and_assigns_ids() {
        let driver = driver(Arc::new(FixedMetadata));
        let mut report = CrawlReport::new();
        let project = driver
            .build_repo_node("demo", DOC, &mut report)
            .await
            .unwrap();

        assert_eq!(project.id, "jane_demo");
        assert_eq!(project.parent_id.as_deref(), Some("jane"));
        let names: Vec<&str> = project.children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["a.py", "b"]);

        let c = &project.children[1].children[0];
        assert_eq!(c.id, "jane_demo_b_c.py");
        assert_eq!(c.parent_id.as_deref(), Some("jane_demo_b"));
        assert_eq!(c.path, "jane-demo/b/c.py");
        assert_eq!(c.num_lines, Some(2));
        assert_eq!(c.last_modified.as_deref(), Some("2024-06-01T00:00:00Z"));

        assert_eq!(project.last_modified.as_deref(), Some("2024-06-01T00:00:00Z"));
        assert_eq!(project.default_branch.as_deref(), Some("develop"));
        assert!(project.iter().all(|n| n.embedding.len() == 8));

        assert_eq!(report.repositories_processed(), 1);
        assert_eq!(report.files_dropped(), 1);
        assert!(report.extensions_seen().contains(".md"));
        assert_eq!(report.content_misses(), 0);
    }

    #[tokio::test]
    async fn test_document_without_code_section_is_skipped() {
        let driver = driver(Arc::new(OfflineMetadata));
        let mut report = CrawlReport::new();
        let node = driver
            .build_repo_node("broken", "### Directory Structure ###\n└── a.py", &mut report)
            .await;
        assert!(node.is_none());
        assert_eq!(report.repositories_skipped(), ["broken".to_string()]);
    }

    #[tokio::test]
    async fn test_offline_build_falls_back_to_configured_branch() {
        let driver = driver(Arc::new(OfflineMetadata));
        let build = driver
            .build_graph(
                &[RepositoryInput::new("demo", DOC)],
                &InMemoryDetailSource::new(),
            )
            .await;

        let project = &build.root.children[0];
        assert_eq!(project.default_branch.as_deref(), Some("main"));
        assert_eq!(project.last_modified, None);
        assert_eq!(
            project.children[1].link.as_deref(),
            Some("https://github.com/jane/demo/tree/main/b")
        );
        assert_eq!(build.report.missing_details(), ["demo".to_string()]);
    }

    #[test]
    fn test_read_dataset_sorted_txt_only() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("zeta.txt"), "z").unwrap();
        std::fs::write(dir.path().join("alpha.txt"), "a").unwrap();
        std::fs::write(dir.path().join("notes.md"), "n").unwrap();

        let repos = read_dataset(dir.path()).unwrap();
        let names: Vec<&str> = repos.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(repos[0].text, "a");
    }
}
