/// Generative model abstraction
///
/// Ranking and narrative services talk to a hosted language model through the
/// [`GenerativeModel`] trait. The concrete client is built once at startup and
/// injected, so the services never read credentials themselves and tests can
/// substitute a mock.
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

pub mod gemini;

pub use gemini::GeminiClient;

/// A single prompt sent to the model
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
    /// Ask the model to answer with a JSON document only
    pub json_output: bool,
}

impl GenerationRequest {
    pub fn json(prompt: String, temperature: f32) -> Self {
        Self {
            prompt,
            temperature,
            json_output: true,
        }
    }

    pub fn text(prompt: String, temperature: f32) -> Self {
        Self {
            prompt,
            temperature,
            json_output: false,
        }
    }
}

/// Trait for hosted generative models
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Sends the prompt and returns the raw text of the first candidate
    async fn generate(&self, request: GenerationRequest) -> AppResult<String>;

    /// Model name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Stand-in used when no credentials are configured. Every call fails, which
/// puts the callers on their deterministic path.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledModel;

#[async_trait::async_trait]
impl GenerativeModel for DisabledModel {
    async fn generate(&self, _request: GenerationRequest) -> AppResult<String> {
        Err(AppError::ExternalApi(
            "Generative model credentials not configured".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Removes a surrounding markdown code fence, if any
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = body.strip_prefix("json").unwrap_or(body);
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Parses a model reply as JSON, tolerating markdown fences
pub fn parse_model_json<T: DeserializeOwned>(raw: &str) -> AppResult<T> {
    serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| AppError::Generation(format!("Model returned malformed JSON: {}", e)))
}
