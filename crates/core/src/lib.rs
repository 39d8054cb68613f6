//! Core types for the repograph portfolio graph
//!
//! This crate provides the foundational pieces shared by every other crate in
//! the workspace:
//!
//! - **Node**: the single entity of the synthesized hierarchy (root, project,
//!   directory, file, function)
//! - **Configuration**: layered TOML + environment configuration
//! - **Error handling**: unified error type and result alias
//!

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod config;
pub mod error;
pub mod node;

// Re-export main types for convenience
pub use config::{
    ChatConfig, Config, EmbeddingsConfig, FilterConfig, GithubConfig, LayoutConfig, PathsConfig,
    ServerConfig,
};
pub use error::{Error, Result, ResultExt};
pub use node::{file_extension, Details, Node, NodeType, CANONICAL_KEYS, PLACEHOLDER_PARENT_ID};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Result, ResultExt};
    pub use crate::node::{Node, NodeType};
}
