//! Retrieval HTTP endpoint using Axum

use crate::chat::ChatProvider;
use crate::corpus::RagDocument;
use crate::prompt::build_prompt;
use crate::retrieval::{search, SearchParams};
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::{future, StreamExt};
use repograph_core::config::ServerConfig;
use repograph_core::error::Error;
use repograph_embeddings::EmbeddingManager;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub corpus: Arc<Vec<RagDocument>>,
    pub embeddings: Arc<EmbeddingManager>,
    pub chat: Arc<dyn ChatProvider>,
    pub params: SearchParams,
    pub persona: String,
    pub max_content_length: usize,
}

/// Build the Axum router with all endpoints
pub fn build_router(state: AppState, server_config: &ServerConfig) -> Router {
    let router = Router::new()
        .route("/rag", post(rag_handler))
        .route("/health", get(health_handler));

    // Configure CORS based on allowed_origins
    let cors_layer = if server_config.allowed_origins.is_empty() {
        // CORS disabled
        CorsLayer::new()
    } else if server_config.allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let mut cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE]);

        for origin in &server_config.allowed_origins {
            if let Ok(header_value) = HeaderValue::from_str(origin) {
                cors = cors.allow_origin(header_value);
            }
        }
        cors
    };

    router
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

const MISSING_QUERY: &str = "Missing 'query' in JSON payload";

/// Extract the `query` string of a `/rag` request body
fn parse_query(body: &[u8]) -> repograph_core::error::Result<String> {
    let payload: Value =
        serde_json::from_slice(body).map_err(|_| Error::invalid_input(MISSING_QUERY))?;
    payload
        .get("query")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::invalid_input(MISSING_QUERY))
}

/// POST /rag
///
/// Streams the assistant's answer as plain text.
async fn rag_handler(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let query = parse_query(&body)?;
    tracing::info!("RAG request: query='{query}'");

    let query_embedding = state.embeddings.embed_one(&query).await.map_err(|e| {
        tracing::error!("Failed to embed query: {e}");
        ApiError::Upstream("Failed to embed query".to_string())
    })?;

    let results = search(&state.corpus, &query_embedding, &state.params);
    tracing::debug!("Retrieved {} documents", results.len());
    let prompt = build_prompt(&state.persona, &query, &results, state.max_content_length);

    let stream = state.chat.complete(prompt).await.map_err(|e| {
        tracing::error!("Failed to start chat completion: {e}");
        ApiError::Upstream("Failed to start chat completion".to_string())
    })?;

    // A fragment error after the headers are out ends the body early
    let fragments = stream.take_while(|fragment| {
        future::ready(match fragment {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Chat stream ended early: {e}");
                false
            }
        })
    });

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(fragments),
    )
        .into_response())
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let searchable = state.corpus.iter().filter(|d| d.is_searchable()).count();
    let health_status = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "corpus": {
            "documents": state.corpus.len(),
            "searchable": searchable
        }
    });

    (StatusCode::OK, Json(health_status))
}

/// Error handling for API endpoints; bodies are plain text
#[derive(Debug)]
pub enum ApiError {
    InvalidRequest(String),
    Upstream(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            ApiError::Internal(err) => {
                tracing::error!("Internal server error: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                )
            }
        };

        (status, message).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidInput(msg) => ApiError::InvalidRequest(msg),
            other => ApiError::Internal(other.into()),
        }
    }
}
