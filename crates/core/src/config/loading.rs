//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::Path;

use super::{global_config_path, Config};

/// Helper to set a config override with consistent error mapping
fn set_config_override<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_override(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key}: {e}")))
}

/// Returns the first non-empty value among the given environment variables
fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `REPOGRAPH_` and use double underscores
    /// for nested values. For example:
    /// - `REPOGRAPH_GITHUB__OWNER=octocat`
    /// - `REPOGRAPH_LAYOUT__SEED=7`
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut builder = ConfigLib::builder();

        // Add the config file if it exists
        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        // Add environment variables with REPOGRAPH_ prefix
        builder = builder.add_source(
            Environment::with_prefix("REPOGRAPH")
                .separator("__")
                .try_parsing(true),
        );

        // Conventional secret variables, only when the prefixed form is absent
        if std::env::var("REPOGRAPH_GITHUB__TOKEN").is_err() {
            if let Some(token) = first_env(&["GITHUB_TOKEN"]) {
                builder = set_config_override(builder, "github.token", token)?;
            }
        }
        if std::env::var("REPOGRAPH_EMBEDDINGS__API_KEY").is_err() {
            if let Some(key) = first_env(&["EMBEDDING_API_KEY", "OPENAI_API_KEY"]) {
                builder = set_config_override(builder, "embeddings.api_key", key)?;
            }
        }
        if std::env::var("REPOGRAPH_CHAT__API_KEY").is_err() {
            if let Some(key) = first_env(&["OPENAI_API_KEY"]) {
                builder = set_config_override(builder, "chat.api_key", key)?;
            }
        }

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from a single file
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.repograph/config.toml or custom --config path)
    /// 3. Environment variables (REPOGRAPH_*, then GITHUB_TOKEN / OPENAI_API_KEY fallbacks)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        Self::from_file(&path)
    }
}
