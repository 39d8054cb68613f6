//! Retrieval-augmented chat server for the portfolio graph
//!
//! This crate provides sentence-level retrieval over a prepared corpus, prompt
//! assembly, the chat completion collaborator and the `POST /rag` endpoint.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod chat;
pub mod corpus;
pub mod prepare;
pub mod prompt;
pub mod rest_server;
pub mod retrieval;

pub use chat::{create_chat_provider, ChatProvider, MockChatProvider, OpenAiChatProvider, TextStream};
pub use corpus::{load_corpus, save_corpus, DocumentSource, RagDocument, SentenceEmbedding};
pub use prepare::CorpusBuilder;
pub use prompt::build_prompt;
pub use rest_server::{build_router, ApiError, AppState};
pub use retrieval::{cosine_similarity, search, RetrievalResult, SearchParams};

// Re-export error types from core
pub use repograph_core::error::{Error, Result};

use repograph_core::config::Config;
use repograph_embeddings::create_embedding_manager_from_app_config;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Run the retrieval server until Ctrl+C.
///
/// Loads the prepared corpus from `paths.rag_data_file`, creates the
/// embedding and chat collaborators, and serves on `server.host:server.port`.
pub async fn run_server(config: Config) -> Result<()> {
    let corpus = load_corpus(Path::new(&config.paths.rag_data_file))?;
    let embeddings = create_embedding_manager_from_app_config(&config.embeddings)?;
    let chat = create_chat_provider(&config.chat)?;

    let state = AppState {
        corpus: Arc::new(corpus),
        embeddings,
        chat,
        params: SearchParams::from(&config.server),
        persona: config.chat.persona.clone(),
        max_content_length: config.server.max_content_length,
    };
    let app = build_router(state, &config.server);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| Error::config(format!("Invalid server address: {e}")))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to {addr}: {e}")))?;

    info!("Retrieval server listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    info!("Retrieval server shut down");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, initiating graceful shutdown"),
        Err(e) => tracing::error!("Error setting up signal handler: {e}"),
    }
}
