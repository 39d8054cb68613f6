//! Subcommand implementations
//!
//! Every command takes a fully resolved [`Config`]; flag overrides are
//! applied by the binary before dispatch.

use crate::create_embedding_manager;
use anyhow::{Context, Result};
use repograph_core::config::Config;
use repograph_pipeline::{
    normalize_file, read_dataset, read_graph, write_graph, CrawlReport, DirectoryDetailSource,
    GithubMetadataClient, GraphBuild, GraphStats, OfflineMetadata, PipelineDriver,
    RepositoryMetadata,
};
use repograph_server::{save_corpus, CorpusBuilder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Build the graph from the dataset and write it to `paths.output_file`
///
/// With `offline` set no metadata requests are made: commit dates stay
/// absent and links use the fallback branch.
pub async fn build(config: &Config, offline: bool) -> Result<CrawlReport> {
    let embeddings = create_embedding_manager(config)?;
    let metadata: Arc<dyn RepositoryMetadata> = if offline {
        info!("Offline mode: skipping repository metadata requests");
        Arc::new(OfflineMetadata)
    } else {
        if config.github.token.is_none() {
            warn!("No GitHub token configured; unauthenticated requests are heavily rate limited");
        }
        Arc::new(
            GithubMetadataClient::new(&config.github)
                .context("Failed to create repository metadata client")?,
        )
    };

    let dataset_dir = Path::new(&config.paths.dataset_dir);
    let repos = read_dataset(dataset_dir).with_context(|| {
        format!("Failed to read dataset from {}", dataset_dir.display())
    })?;
    if repos.is_empty() {
        warn!("No repository documents found in {}", dataset_dir.display());
    }

    let details = DirectoryDetailSource::new(&config.paths.details_dir);
    let driver = PipelineDriver::new(config, embeddings, metadata);
    let GraphBuild { root, report } = driver.build_graph(&repos, &details).await;

    let output = Path::new(&config.paths.output_file);
    write_graph(output, &root)
        .with_context(|| format!("Failed to write graph to {}", output.display()))?;
    Ok(report)
}

/// Build the retrieval corpus and write it to `paths.rag_data_file`,
/// returning the number of documents written
pub async fn prepare_rag(config: &Config) -> Result<usize> {
    let embeddings = create_embedding_manager(config)?;
    let documents = CorpusBuilder::new(embeddings)
        .build(
            Path::new(&config.paths.dataset_dir),
            Path::new(&config.paths.details_dir),
        )
        .await
        .context("Failed to build retrieval corpus")?;

    let output = Path::new(&config.paths.rag_data_file);
    save_corpus(output, &documents)
        .with_context(|| format!("Failed to write corpus to {}", output.display()))?;
    info!(
        "Wrote {} corpus documents to {}",
        documents.len(),
        output.display()
    );
    Ok(documents.len())
}

/// Node type and extension counts of a persisted graph
pub fn stats(path: &Path) -> Result<GraphStats> {
    let root =
        read_graph(path).with_context(|| format!("Failed to read graph {}", path.display()))?;
    Ok(GraphStats::collect(&root))
}

/// Re-normalize a node-shaped JSON document; without `output` the input is
/// rewritten in place. Returns the path written.
pub fn normalize(input: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let output = output.unwrap_or(input).to_path_buf();
    normalize_file(input, &output).with_context(|| {
        format!(
            "Failed to normalize {} into {}",
            input.display(),
            output.display()
        )
    })?;
    Ok(output)
}
