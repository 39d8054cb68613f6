//! Repograph pipeline - crawled repositories to a laid-out portfolio graph
//!
//! Stages run strictly in order over the whole tree:
//! Parse → Filter → Attach content → Timestamps → Identity → Embed →
//! (assemble under one root) → Merge details → Layout → Links.
//! Key normalization is applied when the graph is written.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod annotate;
pub mod content;
pub mod document;
pub mod driver;
pub mod filter;
pub mod graph_io;
pub mod identity;
pub mod layout;
pub mod links;
pub mod merge;
pub mod metadata;
pub mod normalize;
pub mod report;
pub mod stats;
pub mod timestamps;
pub mod tree_parser;

pub use annotate::EmbeddingAnnotator;
pub use driver::{read_dataset, GraphBuild, PipelineDriver, RepositoryInput};
pub use filter::FileFilter;
pub use graph_io::{normalize_file, read_graph, write_graph};
pub use layout::LayoutEngine;
pub use links::LinkResolver;
pub use merge::{DetailSource, DirectoryDetailSource, InMemoryDetailSource};
pub use metadata::{GithubMetadataClient, OfflineMetadata, RepositoryMetadata};
pub use report::CrawlReport;
pub use stats::GraphStats;

// Re-export error types from core
pub use repograph_core::error::{Error, Result};
