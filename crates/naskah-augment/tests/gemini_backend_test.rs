//! HTTP-level tests for the Gemini backend against a wiremock server.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use naskah_augment::GeminiBackend;
use naskah_core::{Error, GenerateRequest, GenerationBackend};

fn backend_for(server: &MockServer) -> GeminiBackend {
    GeminiBackend::with_config(
        server.uri(),
        "gemini-2.5-flash".to_string(),
        "test-key".to_string(),
        5,
    )
}

fn text_envelope(text: &str) -> serde_json::Value {
    json!({
        "candidates": [
            {
                "content": {
                    "parts": [{ "text": text }]
                }
            }
        ]
    })
}

#[tokio::test]
async fn test_generate_returns_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_envelope("Serat summary.")))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let reply = backend
        .generate(GenerateRequest::text("summarize this", 0.5))
        .await
        .unwrap();

    assert_eq!(reply.text, "Serat summary.");
    assert!(reply.sources.is_empty());
}

#[tokio::test]
async fn test_generate_sends_json_mime_and_temperature() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(body_partial_json(json!({
            "generationConfig": {
                "temperature": 0.5,
                "responseMimeType": "application/json"
            }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(text_envelope(r#"{"author": "Anonim"}"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let reply = backend
        .generate(GenerateRequest::json("fill the fields", 0.5))
        .await
        .unwrap();
    assert_eq!(reply.text, r#"{"author": "Anonim"}"#);
}

#[tokio::test]
async fn test_generate_sends_search_tool_when_grounded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(body_partial_json(json!({
            "tools": [{ "googleSearch": {} }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [
                {
                    "content": {
                        "parts": [{ "text": "Answer with sources." }]
                    },
                    "groundingMetadata": {
                        "groundingChunks": [
                            {
                                "web": {
                                    "uri": "https://sources.example/one",
                                    "title": "Source One"
                                }
                            },
                            {
                                "retrievedContext": {
                                    "uri": "https://sources.example/two"
                                }
                            }
                        ]
                    }
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let reply = backend
        .generate(GenerateRequest::grounded("who copied this?"))
        .await
        .unwrap();

    assert_eq!(reply.text, "Answer with sources.");
    assert_eq!(reply.sources.len(), 2);
    assert_eq!(
        reply.sources[0].web.as_ref().unwrap().title.as_deref(),
        Some("Source One")
    );
    assert!(reply.sources[1].web.is_none());
    assert_eq!(
        reply.sources[1]
            .retrieved_context
            .as_ref()
            .unwrap()
            .uri
            .as_deref(),
        Some("https://sources.example/two")
    );
}

#[tokio::test]
async fn test_generate_maps_server_error_to_transport() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let err = backend
        .generate(GenerateRequest::text("hello", 0.5))
        .await
        .unwrap_err();

    match err {
        Error::Transport(msg) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("upstream exploded"));
        }
        other => panic!("expected Transport, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_rejects_empty_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let err = backend
        .generate(GenerateRequest::text("hello", 0.5))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(_)));
}

#[tokio::test]
async fn test_generate_rejects_undecodable_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    let err = backend
        .generate(GenerateRequest::text("hello", 0.5))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(_)));
}
