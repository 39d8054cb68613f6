//! Configuration module for the repograph system
//!
//! This module provides configuration structures and loading mechanisms.
//! Configuration can be loaded from TOML files and/or environment variables.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.repograph/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".repograph").join("config.toml"))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Code-hosting account and API settings
    #[serde(default)]
    pub github: GithubConfig,

    /// Input and output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Embeddings configuration
    #[serde(default)]
    pub embeddings: EmbeddingsConfig,

    /// File filter policy table
    #[serde(default)]
    pub filter: FilterConfig,

    /// Spatial layout parameters
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Retrieval endpoint configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Chat completion configuration
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Code-hosting account and repository metadata API settings
#[derive(Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Account whose repositories make up the graph
    #[serde(default = "default_owner")]
    pub owner: String,

    /// Label of the root node (defaults to `owner`)
    #[serde(default)]
    pub display_name: Option<String>,

    /// REST API base URL
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    /// Browsable web base URL used for node links
    #[serde(default = "default_github_web_url")]
    pub web_url: String,

    /// API token (or use GITHUB_TOKEN env var)
    #[serde(default)]
    pub token: Option<String>,

    /// Fixed delay between metadata API calls in milliseconds
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Attempts made on a rate-limited call before the unit is skipped
    #[serde(default = "default_github_max_retries")]
    pub max_retries: u32,

    /// First backoff delay after a rate-limit signal; doubles on each retry
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Branch used for links when the default branch cannot be resolved
    #[serde(default = "default_fallback_branch")]
    pub fallback_branch: String,
}

impl GithubConfig {
    /// Name shown on the root node
    pub fn root_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.owner)
    }
}

impl std::fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubConfig")
            .field("owner", &self.owner)
            .field("display_name", &self.display_name)
            .field("api_url", &self.api_url)
            .field("web_url", &self.web_url)
            .field("token", &self.token.as_ref().map(|_| "***REDACTED***"))
            .field("request_delay_ms", &self.request_delay_ms)
            .field("max_retries", &self.max_retries)
            .field("initial_backoff_ms", &self.initial_backoff_ms)
            .field("fallback_branch", &self.fallback_branch)
            .finish()
    }
}

/// Input and output locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory of crawled `<repo>.txt` documents
    #[serde(default = "default_dataset_dir")]
    pub dataset_dir: String,

    /// Directory of `<project>.json` detail records
    #[serde(default = "default_details_dir")]
    pub details_dir: String,

    /// Persisted graph file
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// Prepared retrieval corpus
    #[serde(default = "default_rag_data_file")]
    pub rag_data_file: String,
}

/// Configuration for embeddings generation
///
/// # Providers
/// - `api` (default): OpenAI-compatible embeddings API
/// - `mock`: deterministic offline provider for testing
#[derive(Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// Provider type: "api" (default), "mock"
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// Model name to use
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: Option<String>,

    /// API key for authentication (or use EMBEDDING_API_KEY / OPENAI_API_KEY env vars)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Embedding dimension size
    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,

    /// Number of texts sent in a single embedding API request
    #[serde(default = "default_texts_per_api_request")]
    pub texts_per_api_request: usize,

    /// Number of retry attempts for failed embedding requests
    #[serde(default = "default_embedding_retry_attempts")]
    pub retry_attempts: usize,

    /// Characters of file content embedded per node
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
}

impl std::fmt::Debug for EmbeddingsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingsConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***REDACTED***"))
            .field("embedding_dimension", &self.embedding_dimension)
            .field("texts_per_api_request", &self.texts_per_api_request)
            .field("retry_attempts", &self.retry_attempts)
            .field("max_text_chars", &self.max_text_chars)
            .finish()
    }
}

/// File filter policy table
///
/// A file is kept when its name is explicitly allowed, or when it is neither
/// denied by name or extension and its extension is allowed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    #[serde(default = "default_allowed_names")]
    pub allowed_names: Vec<String>,

    #[serde(default = "default_denied_names")]
    pub denied_names: Vec<String>,

    #[serde(default = "default_denied_extensions")]
    pub denied_extensions: Vec<String>,
}

/// Spatial layout parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Radial distance of the most recently modified sibling
    #[serde(default = "default_min_distance")]
    pub min_distance: f64,

    /// Radial distance of the oldest sibling
    #[serde(default = "default_max_distance")]
    pub max_distance: f64,

    /// Per-depth multiplicative shrinkage of distances
    #[serde(default = "default_decay_factor")]
    pub decay_factor: f64,

    /// Weight of a child's own embedding direction against its parent branch
    #[serde(default = "default_blend_alpha")]
    pub blend_alpha: f64,

    /// Scale of the logarithmic node size
    #[serde(default = "default_size_scale")]
    pub size_scale: f64,

    /// Seed for the root-level direction offset; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl LayoutConfig {
    /// Midpoint of the configured distance range
    pub fn mid_distance(&self) -> f64 {
        (self.min_distance + self.max_distance) / 2.0
    }
}

/// Configuration for the retrieval HTTP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,

    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Allowed CORS origins (empty = disabled, ["*"] = all origins)
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Documents returned by retrieval
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum best-sentence score for a document to be retrieved
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    /// Sentences kept per retrieved document
    #[serde(default = "default_top_n_sentences")]
    pub top_n_sentences: usize,

    /// Characters of document content included in the prompt
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,
}

/// Chat completion configuration
///
/// # Providers
/// - `api` (default): OpenAI-compatible chat completions, streamed
/// - `mock`: canned response for testing
#[derive(Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_provider")]
    pub provider: String,

    #[serde(default = "default_chat_model")]
    pub model: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: Option<String>,

    /// API key (or use OPENAI_API_KEY env var)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Person the assistant speaks for
    #[serde(default = "default_persona")]
    pub persona: String,
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***REDACTED***"))
            .field("persona", &self.persona)
            .finish()
    }
}

// Default implementations

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            owner: default_owner(),
            display_name: None,
            api_url: default_github_api_url(),
            web_url: default_github_web_url(),
            token: None,
            request_delay_ms: default_request_delay_ms(),
            max_retries: default_github_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            fallback_branch: default_fallback_branch(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            dataset_dir: default_dataset_dir(),
            details_dir: default_details_dir(),
            output_file: default_output_file(),
            rag_data_file: default_rag_data_file(),
        }
    }
}

impl Default for EmbeddingsConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            api_base_url: default_api_base_url(),
            api_key: None,
            embedding_dimension: default_embedding_dimension(),
            texts_per_api_request: default_texts_per_api_request(),
            retry_attempts: default_embedding_retry_attempts(),
            max_text_chars: default_max_text_chars(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: default_allowed_extensions(),
            allowed_names: default_allowed_names(),
            denied_names: default_denied_names(),
            denied_extensions: default_denied_extensions(),
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_distance: default_min_distance(),
            max_distance: default_max_distance(),
            decay_factor: default_decay_factor(),
            blend_alpha: default_blend_alpha(),
            size_scale: default_size_scale(),
            seed: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            allowed_origins: default_allowed_origins(),
            top_k: default_top_k(),
            threshold: default_threshold(),
            top_n_sentences: default_top_n_sentences(),
            max_content_length: default_max_content_length(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: default_chat_provider(),
            model: default_chat_model(),
            api_base_url: default_api_base_url(),
            api_key: None,
            persona: default_persona(),
        }
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.github.owner.trim().is_empty() {
            return Err(Error::config("github.owner cannot be empty".to_string()));
        }
        if self.github.max_retries == 0 {
            return Err(Error::config(
                "github.max_retries must be greater than 0".to_string(),
            ));
        }
        if self.github.max_retries > 10 {
            return Err(Error::config(format!(
                "github.max_retries too large (max 10, got {})",
                self.github.max_retries
            )));
        }

        let valid_providers = ["api", "mock"];
        if !valid_providers.contains(&self.embeddings.provider.as_str()) {
            return Err(Error::config(format!(
                "Invalid embeddings provider '{}'. Must be one of: {:?}",
                self.embeddings.provider, valid_providers
            )));
        }
        if !valid_providers.contains(&self.chat.provider.as_str()) {
            return Err(Error::config(format!(
                "Invalid chat provider '{}'. Must be one of: {:?}",
                self.chat.provider, valid_providers
            )));
        }

        if self.embeddings.embedding_dimension == 0 {
            return Err(Error::config(
                "embeddings.embedding_dimension must be greater than 0".to_string(),
            ));
        }
        if self.embeddings.texts_per_api_request == 0 {
            return Err(Error::config(
                "embeddings.texts_per_api_request must be greater than 0".to_string(),
            ));
        }
        if self.embeddings.texts_per_api_request > 2048 {
            return Err(Error::config(format!(
                "embeddings.texts_per_api_request too large (max 2048, got {})",
                self.embeddings.texts_per_api_request
            )));
        }
        if self.embeddings.max_text_chars == 0 {
            return Err(Error::config(
                "embeddings.max_text_chars must be greater than 0".to_string(),
            ));
        }

        let layout = &self.layout;
        if layout.min_distance < 0.0 {
            return Err(Error::config(
                "layout.min_distance must be non-negative".to_string(),
            ));
        }
        if layout.max_distance < layout.min_distance {
            return Err(Error::config(format!(
                "layout.max_distance ({}) cannot be less than min_distance ({})",
                layout.max_distance, layout.min_distance
            )));
        }
        if !(layout.decay_factor > 0.0 && layout.decay_factor < 1.0) {
            return Err(Error::config(format!(
                "layout.decay_factor must be in (0, 1), got {}",
                layout.decay_factor
            )));
        }
        // weight of the child's own direction; the parent branch must dominate
        if !(0.0..0.5).contains(&layout.blend_alpha) {
            return Err(Error::config(format!(
                "layout.blend_alpha must be in [0, 0.5), got {}",
                layout.blend_alpha
            )));
        }
        if layout.size_scale <= 0.0 {
            return Err(Error::config(
                "layout.size_scale must be greater than 0".to_string(),
            ));
        }

        if self.server.top_k == 0 {
            return Err(Error::config(
                "server.top_k must be greater than 0".to_string(),
            ));
        }
        if !(-1.0..=1.0).contains(&self.server.threshold) {
            return Err(Error::config(format!(
                "server.threshold must be in [-1, 1], got {}",
                self.server.threshold
            )));
        }

        Ok(())
    }

    /// Saves the configuration to a TOML file
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, toml_string)
            .map_err(|e| Error::config(format!("Failed to write config file: {e}")))?;

        Ok(())
    }
}
