//! Augmentation service: optional, best-effort generative proposals for
//! the authoring surfaces.
//!
//! Every operation checks availability first; when no credential is
//! configured the service performs zero network calls. Model output that
//! fails shape validation is discarded wholesale — a malformed response
//! is never partially applied.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;
use tracing::{info, warn};

use naskah_core::{
    Error, GenerateRequest, GenerationBackend, GroundedAnswer, ManuscriptAutofill, Result,
};

use crate::gemini::{GeminiBackend, DEFAULT_GEMINI_URL, DEFAULT_GEN_MODEL, GEN_TIMEOUT_SECS};

/// Sampling temperature for structured autofill.
pub const AUTOFILL_TEMPERATURE: f32 = 0.5;

/// Sampling temperature for description generation.
pub const DESCRIPTION_TEMPERATURE: f32 = 0.7;

/// Sampling temperature for title-idea generation.
pub const IDEAS_TEMPERATURE: f32 = 0.8;

/// Sampling temperature for summarization.
pub const SUMMARY_TEMPERATURE: f32 = 0.5;

/// Answer returned by grounded search when no credential is configured.
const SEARCH_UNAVAILABLE_ANSWER: &str =
    "The generative service is not configured, so grounded search cannot be performed.";

/// Optional surrounding code fence on model output: triple backtick, an
/// optional language tag, the payload, closing triple backtick.
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```(\w*)?\s*\n?(.*?)\n?\s*```$").expect("valid code fence regex")
});

/// Configuration for the augmentation service.
///
/// Availability is decided once, here, by the presence of `api_key`;
/// there is no ambient/static state, so tests can construct either
/// availability state directly.
#[derive(Debug, Clone)]
pub struct AugmentConfig {
    /// Service credential. `None` (or empty) disables augmentation.
    pub api_key: Option<String>,
    /// Generation model identifier.
    pub model: String,
    /// Base URL of the generative service.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEN_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_URL.to_string(),
            timeout_secs: GEN_TIMEOUT_SECS,
        }
    }
}

impl AugmentConfig {
    /// Create a configuration with the given credential.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Create from environment variables.
    ///
    /// `GEMINI_API_KEY` enables the service; `GEMINI_MODEL`,
    /// `GEMINI_BASE_URL`, and `GEMINI_TIMEOUT_SECS` override defaults.
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());
        let model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEN_MODEL.to_string());
        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_GEMINI_URL.to_string());
        let timeout_secs = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(GEN_TIMEOUT_SECS);

        Self {
            api_key,
            model,
            base_url,
            timeout_secs,
        }
    }
}

/// Generative augmentation service.
pub struct AugmentService {
    backend: Option<Box<dyn GenerationBackend>>,
}

impl AugmentService {
    /// Build the service from configuration. Without a credential the
    /// service is constructed in the unavailable state.
    pub fn new(config: AugmentConfig) -> Self {
        let AugmentConfig {
            api_key,
            model,
            base_url,
            timeout_secs,
        } = config;

        let backend = match api_key.filter(|key| !key.is_empty()) {
            Some(key) => Some(Box::new(GeminiBackend::with_config(
                base_url,
                model,
                key,
                timeout_secs,
            )) as Box<dyn GenerationBackend>),
            None => {
                warn!("GEMINI_API_KEY not configured; augmentation features disabled");
                None
            }
        };

        Self { backend }
    }

    /// Build the service from environment variables.
    pub fn from_env() -> Self {
        Self::new(AugmentConfig::from_env())
    }

    /// Build an explicitly unavailable service.
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    /// Build the service over a caller-supplied backend (used by tests).
    pub fn with_backend(backend: Box<dyn GenerationBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Whether a generative backend is configured.
    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    fn backend(&self) -> Result<&dyn GenerationBackend> {
        self.backend.as_deref().ok_or(Error::Unavailable)
    }

    /// Propose field values for a manuscript from its title.
    ///
    /// The whole response is rejected when it is not a JSON object of the
    /// expected shape.
    pub async fn autofill_manuscript(&self, title: &str) -> Result<ManuscriptAutofill> {
        let backend = self.backend()?;

        let prompt = format!(
            "Given the title of an archival Nusantara manuscript, \"{}\", fill in the \
             fields below as a JSON object. Give your best guess when uncertain.\n\
             - author: (the author or copyist most likely associated with it)\n\
             - description: (a short description, 2-3 sentences, of the probable contents)\n\
             - category: (e.g. Babad, Sejarah, Sastra, Keagamaan, Primbon)\n\
             - language: (e.g. Jawa Kuno, Sansekerta, Melayu Kuno)\n\
             - script: (e.g. Kawi, Pallawa, Arab-Melayu, Hanacaraka)\n\
             - condition: (e.g. Good, Fragile, Missing sections)\n\
             - readability: (e.g. Clear, Hard to read, Faded)\n\n\
             Return only the JSON object, with no extra text or markdown.",
            title
        );

        let reply = backend
            .generate(GenerateRequest::json(prompt, AUTOFILL_TEMPERATURE))
            .await
            .map_err(|e| {
                warn!(title, error = %e, "Manuscript autofill failed");
                e
            })?;

        decode_autofill(&reply.text)
    }

    /// Generate a short descriptive paragraph for a manuscript title,
    /// optionally steered by keywords.
    pub async fn generate_description(
        &self,
        title: &str,
        keywords: Option<&str>,
    ) -> Result<String> {
        let backend = self.backend()?;

        let keyword_hint = keywords
            .map(|kw| format!(" The manuscript relates to: {}.", kw))
            .unwrap_or_default();
        let prompt = format!(
            "Write a short, engaging description for an archival manuscript titled \
             \"{}\".{} Aim for 50-100 words and highlight what makes the manuscript \
             distinctive or historically valuable.",
            title, keyword_hint
        );

        let reply = backend
            .generate(GenerateRequest::text(prompt, DESCRIPTION_TEMPERATURE))
            .await
            .map_err(|e| {
                warn!(title, error = %e, "Description generation failed");
                e
            })?;

        Ok(reply.text)
    }

    /// Generate five candidate article titles for the journal.
    pub async fn generate_post_ideas(&self, topic: Option<&str>) -> Result<Vec<String>> {
        let backend = self.backend()?;

        let focus = match topic {
            Some(topic) => format!("Focus on the topic: \"{}\".", topic),
            None => "Topics can range from manuscript history and conservation work to \
                     the stories behind the collection."
                .to_string(),
        };
        let prompt = format!(
            "Suggest 5 engaging, relevant article titles for a manuscript gallery \
             journal. {} Format the output as a JSON array of strings. \
             Example: [\"First idea\", \"Second idea\"]",
            focus
        );

        let reply = backend
            .generate(GenerateRequest::json(prompt, IDEAS_TEMPERATURE))
            .await
            .map_err(|e| {
                warn!(error = %e, "Post idea generation failed");
                e
            })?;

        decode_ideas(&reply.text)
    }

    /// Summarize a passage in 2-3 sentences.
    pub async fn summarize(&self, text: &str) -> Result<String> {
        let backend = self.backend()?;

        let prompt = format!(
            "Summarize the following text in 2-3 sentences:\n\n\"{}\"",
            text
        );

        let reply = backend
            .generate(GenerateRequest::text(prompt, SUMMARY_TEMPERATURE))
            .await
            .map_err(|e| {
                warn!(error = %e, "Summarization failed");
                e
            })?;

        Ok(reply.text)
    }

    /// Answer a free-text question with the external-search tool enabled,
    /// returning citations when the service provides them.
    ///
    /// Unlike the other operations this degrades to an explanatory answer
    /// with no sources when the service is unavailable.
    pub async fn grounded_search(&self, query: &str) -> Result<GroundedAnswer> {
        let Ok(backend) = self.backend() else {
            info!("Grounded search requested while augmentation is disabled");
            return Ok(GroundedAnswer {
                text: SEARCH_UNAVAILABLE_ANSWER.to_string(),
                sources: Vec::new(),
            });
        };

        let prompt = format!(
            "Answer the following question using up-to-date web search results: \
             \"{}\". Cite sources where possible.",
            query
        );

        let reply = backend
            .generate(GenerateRequest::grounded(prompt))
            .await
            .map_err(|e| {
                warn!(query, error = %e, "Grounded search failed");
                e
            })?;

        Ok(GroundedAnswer {
            text: reply.text,
            sources: reply.sources,
        })
    }
}

/// Remove an optional surrounding code fence from model output.
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(caps) = CODE_FENCE.captures(trimmed) {
        if let Some(inner) = caps.get(2) {
            return inner.as_str().trim();
        }
    }
    trimmed
}

/// Decode the structured autofill payload, rejecting anything that is
/// not a JSON object of the expected shape.
fn decode_autofill(text: &str) -> Result<ManuscriptAutofill> {
    let payload = strip_code_fence(text);
    let value: JsonValue = serde_json::from_str(payload)
        .map_err(|e| Error::MalformedResponse(format!("invalid JSON: {}", e)))?;
    if !value.is_object() {
        return Err(Error::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| Error::MalformedResponse(e.to_string()))
}

/// Decode the title-idea payload, which must be a JSON array of strings.
fn decode_ideas(text: &str) -> Result<Vec<String>> {
    let payload = strip_code_fence(text);
    let value: JsonValue = serde_json::from_str(payload)
        .map_err(|e| Error::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let ideas = value
        .as_array()
        .and_then(|items| {
            items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<String>>>()
        })
        .ok_or_else(|| Error::MalformedResponse("unexpected response shape".to_string()))?;

    Ok(ideas)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fence_passthrough() {
        assert_eq!(strip_code_fence("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("  plain text  "), "plain text");
    }

    #[test]
    fn test_strip_code_fence_with_language_tag() {
        let fenced = "```json\n{\"author\": \"Anonim\"}\n```";
        assert_eq!(strip_code_fence(fenced), "{\"author\": \"Anonim\"}");
    }

    #[test]
    fn test_strip_code_fence_without_language_tag() {
        let fenced = "```\n[\"one\", \"two\"]\n```";
        assert_eq!(strip_code_fence(fenced), "[\"one\", \"two\"]");
    }

    #[test]
    fn test_strip_code_fence_multiline_payload() {
        let fenced = "```json\n{\n  \"author\": \"Anonim\",\n  \"category\": \"Babad\"\n}\n```";
        assert_eq!(
            strip_code_fence(fenced),
            "{\n  \"author\": \"Anonim\",\n  \"category\": \"Babad\"\n}"
        );
    }

    #[test]
    fn test_decode_autofill_fenced_and_bare_agree() {
        let bare = r#"{"author": "Anonim", "category": "Babad"}"#;
        let fenced = format!("```json\n{}\n```", bare);

        let from_bare = decode_autofill(bare).unwrap();
        let from_fenced = decode_autofill(&fenced).unwrap();
        assert_eq!(from_bare, from_fenced);
        assert_eq!(from_bare.author.as_deref(), Some("Anonim"));
        assert_eq!(from_bare.category.as_deref(), Some("Babad"));
    }

    #[test]
    fn test_decode_autofill_rejects_non_object() {
        let err = decode_autofill("42").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));

        let err = decode_autofill("[\"author\"]").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_decode_autofill_rejects_invalid_json() {
        let err = decode_autofill("not json at all").unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_decode_autofill_rejects_non_string_values() {
        let err = decode_autofill(r#"{"author": 1862}"#).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_decode_ideas_happy_path() {
        let ideas = decode_ideas(r#"["Idea one", "Idea two"]"#).unwrap();
        assert_eq!(ideas, vec!["Idea one", "Idea two"]);
    }

    #[test]
    fn test_decode_ideas_fenced() {
        let ideas = decode_ideas("```json\n[\"Idea one\"]\n```").unwrap();
        assert_eq!(ideas, vec!["Idea one"]);
    }

    #[test]
    fn test_decode_ideas_rejects_non_array() {
        let err = decode_ideas(r#"{"ideas": []}"#).unwrap_err();
        match err {
            Error::MalformedResponse(msg) => assert_eq!(msg, "unexpected response shape"),
            other => panic!("expected MalformedResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_ideas_rejects_mixed_array() {
        let err = decode_ideas(r#"["Idea one", 2]"#).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_config_default_is_unavailable() {
        let service = AugmentService::new(AugmentConfig::default());
        assert!(!service.is_available());
    }

    #[test]
    fn test_config_empty_key_is_unavailable() {
        let service = AugmentService::new(AugmentConfig {
            api_key: Some(String::new()),
            ..AugmentConfig::default()
        });
        assert!(!service.is_available());
    }

    #[test]
    fn test_config_with_key_is_available() {
        let service = AugmentService::new(AugmentConfig::with_api_key("test-key"));
        assert!(service.is_available());
    }
}
