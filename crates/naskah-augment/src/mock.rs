//! Mock generation backend for deterministic testing.
//!
//! Always compiled so integration tests (in `tests/`) can drive the
//! augmentation service without a live generative endpoint. Responses
//! are canned and every call is logged for assertion.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use naskah_core::{
    Error, GenerateReply, GenerateRequest, GenerationBackend, GroundingSource, Result,
};

/// One logged backend call.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub prompt: String,
    pub temperature: Option<f32>,
    pub json_output: bool,
    pub web_search: bool,
}

/// Deterministic mock backend.
#[derive(Clone)]
pub struct MockGenerationBackend {
    text: String,
    sources: Vec<GroundingSource>,
    fail_transport: bool,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockGenerationBackend {
    /// Create a mock that replies with a fixed placeholder text.
    pub fn new() -> Self {
        Self {
            text: "Mock response".to_string(),
            sources: Vec::new(),
            fail_transport: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the reply text for every call.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the grounding sources returned with every reply.
    pub fn with_sources(mut self, sources: Vec<GroundingSource>) -> Self {
        self.sources = sources;
        self
    }

    /// Make every call fail with a transport error.
    pub fn failing(mut self) -> Self {
        self.fail_transport = true;
        self
    }

    /// Get all logged calls for assertion.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate(&self, req: GenerateRequest) -> Result<GenerateReply> {
        self.calls.lock().unwrap().push(MockCall {
            prompt: req.prompt.clone(),
            temperature: req.temperature,
            json_output: req.json_output,
            web_search: req.web_search,
        });

        if self.fail_transport {
            return Err(Error::Transport("mock transport failure".to_string()));
        }

        Ok(GenerateReply {
            text: self.text.clone(),
            sources: self.sources.clone(),
        })
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
