//! Library interface for the repograph CLI
//!
//! Subcommands live here so integration tests can drive them without
//! spawning the binary.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod commands;

pub use anyhow::Result;
pub use repograph_core::config::Config;

/// Helper function to create an embedding manager from configuration
pub fn create_embedding_manager(
    config: &Config,
) -> Result<std::sync::Arc<repograph_embeddings::EmbeddingManager>> {
    repograph_embeddings::create_embedding_manager_from_app_config(&config.embeddings)
        .map_err(Into::into)
}
