//! Integration tests for the retrieval endpoint
//!
//! The router is driven in-process with mock embedding and chat collaborators.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use repograph_core::config::ServerConfig;
use repograph_core::error::{Error, Result};
use repograph_embeddings::{EmbeddingManager, EmbeddingProvider};
use repograph_server::{
    build_router, AppState, MockChatProvider, RagDocument, SearchParams, SentenceEmbedding,
};
use repograph_server::corpus::DocumentSource;
use std::sync::Arc;
use tower::ServiceExt;

struct UnavailableProvider;

#[async_trait]
impl EmbeddingProvider for UnavailableProvider {
    async fn embed(&self, _texts: Vec<String>) -> Result<Vec<Option<Vec<f32>>>> {
        Err(Error::embedding("service unavailable"))
    }

    fn embedding_dimension(&self) -> usize {
        8
    }
}

async fn corpus(manager: &EmbeddingManager) -> Vec<RagDocument> {
    let sentence = "repograph turns repositories into a graph.";
    let mut doc = RagDocument::new("repograph.txt", DocumentSource::Txt, sentence);
    doc.sentence_embeddings.push(SentenceEmbedding {
        sentence: sentence.to_string(),
        embedding: manager.embed_one(sentence).await.unwrap(),
    });
    vec![doc, RagDocument::new("empty.json", DocumentSource::Json, "")]
}

async fn app(manager: EmbeddingManager, chat: Arc<MockChatProvider>) -> Router {
    let manager = Arc::new(manager);
    let corpus = corpus(&EmbeddingManager::mock(8)).await;
    let state = AppState {
        corpus: Arc::new(corpus),
        embeddings: manager,
        chat,
        params: SearchParams::default(),
        persona: "Jane Doe".to_string(),
        max_content_length: 1000,
    };
    build_router(state, &ServerConfig::default())
}

fn rag_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/rag")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_rag_streams_chat_answer() {
    let chat = Arc::new(MockChatProvider::new(["It builds ", "a graph."]));
    let app = app(EmbeddingManager::mock(8), chat.clone()).await;

    let response = app
        .oneshot(rag_request(
            r#"{"query": "repograph turns repositories into a graph."}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(body_text(response).await, "It builds a graph.");

    // identical text embeds identically, so the document clears the threshold
    let prompt = chat.last_prompt().unwrap();
    assert!(prompt.contains("Jane Doe"));
    assert!(prompt.contains("\"document_name\": \"repograph.txt\""));
    assert!(!prompt.contains("empty.json"));
}

#[tokio::test]
async fn test_rag_missing_query_is_bad_request() {
    for body in [r#"{"question": "hi"}"#, "not json", ""] {
        let chat = Arc::new(MockChatProvider::new(["unused"]));
        let app = app(EmbeddingManager::mock(8), chat.clone()).await;

        let response = app.oneshot(rag_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Missing 'query' in JSON payload");
        assert_eq!(chat.last_prompt(), None);
    }
}

#[tokio::test]
async fn test_rag_query_embedding_failure_is_bad_gateway() {
    let manager = EmbeddingManager::new(Arc::new(UnavailableProvider), "down".to_string());
    let chat = Arc::new(MockChatProvider::new(["unused"]));
    let app = app(manager, chat.clone()).await;

    let response = app
        .oneshot(rag_request(r#"{"query": "anything"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(chat.last_prompt(), None);
}

#[tokio::test]
async fn test_health_endpoint() {
    let chat = Arc::new(MockChatProvider::new(["unused"]));
    let app = app(EmbeddingManager::mock(8), chat).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(value["status"], "healthy");
    assert_eq!(value["corpus"]["documents"], 2);
    assert_eq!(value["corpus"]["searchable"], 1);
}
