//! Chat completion collaborator
//!
//! `prompt -> lazy sequence of text fragments`, consumed once.

use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use futures::stream::{self, Stream, StreamExt};
use repograph_core::config::ChatConfig;
use repograph_core::error::{Error, Result};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// Finite, non-restartable stream of completion fragments
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Start a completion for `prompt`
    async fn complete(&self, prompt: String) -> Result<TextStream>;
}

/// Streams chat completions from an OpenAI-compatible API
pub struct OpenAiChatProvider {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiChatProvider {
    pub fn new(config: &ChatConfig) -> Self {
        info!("Initializing OpenAI-compatible chat completions");
        info!("  Model: {}", config.model);

        let mut openai_config = OpenAIConfig::new();
        if let Some(ref base_url) = config.api_base_url {
            info!("  Base URL: {base_url}");
            openai_config = openai_config.with_api_base(base_url);
        }
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        match api_key {
            Some(key) => openai_config = openai_config.with_api_key(key),
            None => warn!("No chat API key configured; requests will likely be rejected"),
        }

        Self {
            client: Client::with_config(openai_config),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiChatProvider {
    async fn complete(&self, prompt: String) -> Result<TextStream> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| Error::chat(format!("Failed to build message: {e}")))?;
        let messages: Vec<ChatCompletionRequestMessage> = vec![message.into()];
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| Error::chat(format!("Failed to build request: {e}")))?;

        let stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| Error::chat(format!("Failed to start completion: {e}")))?;

        let fragments = stream.filter_map(|chunk| async move {
            match chunk {
                Ok(response) => response
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content)
                    .filter(|text| !text.is_empty())
                    .map(Ok),
                Err(e) => Some(Err(Error::chat(format!("Completion stream failed: {e}")))),
            }
        });
        Ok(Box::pin(fragments))
    }
}

/// Yields canned fragments and remembers the last prompt it saw
#[derive(Debug, Default)]
pub struct MockChatProvider {
    fragments: Vec<String>,
    last_prompt: Mutex<Option<String>>,
}

impl MockChatProvider {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn complete(&self, prompt: String) -> Result<TextStream> {
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt);
        }
        let fragments: Vec<Result<String>> = self.fragments.iter().cloned().map(Ok).collect();
        Ok(Box::pin(stream::iter(fragments)))
    }
}

/// Create the chat provider named by `config.provider`
pub fn create_chat_provider(config: &ChatConfig) -> Result<Arc<dyn ChatProvider>> {
    match config.provider.to_lowercase().as_str() {
        "mock" => Ok(Arc::new(MockChatProvider::new([
            "This is a canned answer ",
            "from the mock chat provider.",
        ]))),
        "api" => Ok(Arc::new(OpenAiChatProvider::new(config))),
        other => Err(Error::config(format!("Unknown chat provider '{other}'"))),
    }
}
