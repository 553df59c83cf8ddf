//! Augmentation service behavior tests using the deterministic mock
//! backend.

use naskah_augment::{
    AugmentService, MockGenerationBackend, AUTOFILL_TEMPERATURE, DESCRIPTION_TEMPERATURE,
    IDEAS_TEMPERATURE, SUMMARY_TEMPERATURE,
};
use naskah_core::{Error, GroundingSource, SourceRef};

#[tokio::test]
async fn test_unavailable_service_fails_typed() {
    let service = AugmentService::disabled();
    assert!(!service.is_available());

    let err = service.autofill_manuscript("Babad Diponegoro").await.unwrap_err();
    assert!(matches!(err, Error::Unavailable));

    let err = service
        .generate_description("Babad Diponegoro", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unavailable));

    let err = service.generate_post_ideas(None).await.unwrap_err();
    assert!(matches!(err, Error::Unavailable));

    let err = service.summarize("some passage").await.unwrap_err();
    assert!(matches!(err, Error::Unavailable));
}

#[tokio::test]
async fn test_unavailable_grounded_search_degrades_to_answer() {
    let service = AugmentService::disabled();

    let answer = service.grounded_search("siapa penyalin babad ini?").await.unwrap();
    assert!(answer.sources.is_empty());
    assert!(answer.text.contains("not configured"));
}

#[tokio::test]
async fn test_autofill_uses_json_output_and_low_temperature() {
    let mock = MockGenerationBackend::new()
        .with_text(r#"{"author": "Anonim", "category": "Babad", "language": "Jawa"}"#);
    let service = AugmentService::with_backend(Box::new(mock.clone()));

    let autofill = service.autofill_manuscript("Babad Tanah Jawi").await.unwrap();
    assert_eq!(autofill.author.as_deref(), Some("Anonim"));
    assert_eq!(autofill.category.as_deref(), Some("Babad"));
    assert_eq!(autofill.language.as_deref(), Some("Jawa"));
    assert!(autofill.script.is_none());

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].json_output);
    assert!(!calls[0].web_search);
    assert_eq!(calls[0].temperature, Some(AUTOFILL_TEMPERATURE));
    assert!(calls[0].prompt.contains("Babad Tanah Jawi"));
}

#[tokio::test]
async fn test_autofill_accepts_fenced_json() {
    let mock = MockGenerationBackend::new()
        .with_text("```json\n{\"author\": \"Anonim\"}\n```");
    let service = AugmentService::with_backend(Box::new(mock));

    let autofill = service.autofill_manuscript("Babad Tanah Jawi").await.unwrap();
    assert_eq!(autofill.author.as_deref(), Some("Anonim"));
}

#[tokio::test]
async fn test_autofill_rejects_non_object_response() {
    let mock = MockGenerationBackend::new().with_text("42");
    let service = AugmentService::with_backend(Box::new(mock));

    let err = service.autofill_manuscript("Babad Tanah Jawi").await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(_)));
}

#[tokio::test]
async fn test_autofill_rejects_invalid_json() {
    let mock = MockGenerationBackend::new().with_text("sorry, I cannot help with that");
    let service = AugmentService::with_backend(Box::new(mock));

    let err = service.autofill_manuscript("Babad Tanah Jawi").await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(_)));
}

#[tokio::test]
async fn test_description_is_plain_text_request() {
    let mock = MockGenerationBackend::new().with_text("A rare court chronicle.");
    let service = AugmentService::with_backend(Box::new(mock.clone()));

    let description = service
        .generate_description("Babad Tanah Jawi", Some("kraton, silsilah"))
        .await
        .unwrap();
    assert_eq!(description, "A rare court chronicle.");

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert!(!calls[0].json_output);
    assert_eq!(calls[0].temperature, Some(DESCRIPTION_TEMPERATURE));
    assert!(calls[0].prompt.contains("kraton, silsilah"));
}

#[tokio::test]
async fn test_post_ideas_happy_path() {
    let mock = MockGenerationBackend::new()
        .with_text(r#"["Conserving palm-leaf", "Reading Kawi script"]"#);
    let service = AugmentService::with_backend(Box::new(mock.clone()));

    let ideas = service.generate_post_ideas(Some("conservation")).await.unwrap();
    assert_eq!(ideas.len(), 2);
    assert_eq!(ideas[0], "Conserving palm-leaf");

    let calls = mock.calls();
    assert!(calls[0].json_output);
    assert_eq!(calls[0].temperature, Some(IDEAS_TEMPERATURE));
    assert!(calls[0].prompt.contains("conservation"));
}

#[tokio::test]
async fn test_post_ideas_rejects_unexpected_shape() {
    let mock = MockGenerationBackend::new().with_text(r#"{"ideas": ["one"]}"#);
    let service = AugmentService::with_backend(Box::new(mock));

    let err = service.generate_post_ideas(None).await.unwrap_err();
    match err {
        Error::MalformedResponse(msg) => assert_eq!(msg, "unexpected response shape"),
        other => panic!("expected MalformedResponse, got {:?}", other),
    }
}

#[tokio::test]
async fn test_summarize_round_trips_text() {
    let mock = MockGenerationBackend::new().with_text("Short summary.");
    let service = AugmentService::with_backend(Box::new(mock.clone()));

    let summary = service.summarize("a very long passage").await.unwrap();
    assert_eq!(summary, "Short summary.");

    let calls = mock.calls();
    assert!(!calls[0].json_output);
    assert_eq!(calls[0].temperature, Some(SUMMARY_TEMPERATURE));
}

#[tokio::test]
async fn test_grounded_search_returns_sources() {
    let mock = MockGenerationBackend::new()
        .with_text("The copyist was most likely a court scribe.")
        .with_sources(vec![GroundingSource {
            web: Some(SourceRef {
                uri: Some("https://sources.example/babad".to_string()),
                title: Some("Court chronicles".to_string()),
            }),
            retrieved_context: None,
        }]);
    let service = AugmentService::with_backend(Box::new(mock.clone()));

    let answer = service.grounded_search("who copied this babad?").await.unwrap();
    assert_eq!(answer.sources.len(), 1);
    assert_eq!(
        answer.sources[0].web.as_ref().unwrap().title.as_deref(),
        Some("Court chronicles")
    );

    let calls = mock.calls();
    assert!(calls[0].web_search);
    assert!(!calls[0].json_output);
}

#[tokio::test]
async fn test_transport_failure_propagates() {
    let mock = MockGenerationBackend::new().failing();
    let service = AugmentService::with_backend(Box::new(mock.clone()));

    let err = service.autofill_manuscript("Babad Tanah Jawi").await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(mock.call_count(), 1);
}
