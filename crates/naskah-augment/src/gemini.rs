//! Gemini generation backend implementation.
//!
//! Speaks the `generativelanguage` REST protocol: one `generateContent`
//! call per request, with optional JSON output enforcement and the
//! external-search grounding tool enabled per call.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use naskah_core::{
    Error, GenerateReply, GenerateRequest, GenerationBackend, GroundingSource, Result, SourceRef,
};

/// Default Gemini API endpoint.
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";

/// Default generation model.
pub const DEFAULT_GEN_MODEL: &str = "gemini-2.5-flash";

/// Timeout for generation requests (seconds).
pub const GEN_TIMEOUT_SECS: u64 = 60;

/// Gemini generation backend.
pub struct GeminiBackend {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    timeout_secs: u64,
}

impl GeminiBackend {
    /// Create a new Gemini backend with default settings.
    pub fn new(api_key: String) -> Self {
        Self::with_config(
            DEFAULT_GEMINI_URL.to_string(),
            DEFAULT_GEN_MODEL.to_string(),
            api_key,
            GEN_TIMEOUT_SECS,
        )
    }

    /// Create a new Gemini backend with custom configuration.
    pub fn with_config(base_url: String, model: String, api_key: String, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        info!(
            "Initializing Gemini backend: url={}, model={}",
            base_url, model
        );

        Self {
            client,
            base_url,
            model,
            api_key,
            timeout_secs,
        }
    }

    /// Set the generation model to use.
    pub fn set_model(&mut self, model: String) {
        info!("Switching generation model from {} to {}", self.model, model);
        self.model = model;
    }
}

/// Request payload for the `generateContent` endpoint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    /// Set to `"application/json"` for JSON-formatted output.
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Serialize)]
struct GoogleSearch {}

/// Response from the `generateContent` endpoint.
#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<WireGroundingChunk>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireGroundingChunk {
    web: Option<WireSourceRef>,
    retrieved_context: Option<WireSourceRef>,
}

#[derive(Deserialize)]
struct WireSourceRef {
    uri: Option<String>,
    title: Option<String>,
}

impl From<WireSourceRef> for SourceRef {
    fn from(wire: WireSourceRef) -> Self {
        Self {
            uri: wire.uri,
            title: wire.title,
        }
    }
}

impl From<WireGroundingChunk> for GroundingSource {
    fn from(wire: WireGroundingChunk) -> Self {
        Self {
            web: wire.web.map(Into::into),
            retrieved_context: wire.retrieved_context.map(Into::into),
        }
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    #[instrument(skip(self, req), fields(subsystem = "augment", component = "gemini", model = %self.model, json_output = req.json_output, web_search = req.web_search))]
    async fn generate(&self, req: GenerateRequest) -> Result<GenerateReply> {
        let start = Instant::now();

        let generation_config = if req.temperature.is_some() || req.json_output {
            Some(GenerationConfig {
                temperature: req.temperature,
                response_mime_type: req
                    .json_output
                    .then(|| "application/json".to_string()),
            })
        } else {
            None
        };
        let tools = req.web_search.then(|| {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        });

        let payload = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: &req.prompt }],
            }],
            generation_config,
            tools,
        };

        let response = self
            .client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .timeout(Duration::from_secs(self.timeout_secs))
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Transport(format!(
                "generative service returned {}: {}",
                status, body
            )));
        }

        let result: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| Error::MalformedResponse(format!("invalid response envelope: {}", e)))?;

        let Some(candidate) = result.candidates.into_iter().next() else {
            return Err(Error::MalformedResponse(
                "response contained no candidates".to_string(),
            ));
        };

        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(Error::MalformedResponse(
                "response contained no text".to_string(),
            ));
        }

        let sources: Vec<GroundingSource> = candidate
            .grounding_metadata
            .map(|meta| meta.grounding_chunks.into_iter().map(Into::into).collect())
            .unwrap_or_default();

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            response_len = text.len(),
            source_count = sources.len(),
            duration_ms = elapsed,
            "Generation complete"
        );
        if elapsed > 30000 {
            warn!(
                duration_ms = elapsed,
                prompt_len = req.prompt.len(),
                slow = true,
                "Slow generation operation"
            );
        }

        Ok(GenerateReply { text, sources })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
