/// Gemini `generateContent` client
///
/// API Flow:
/// POST {api_url}/v1beta/models/{model}:generateContent?key=... with a single
/// user turn; the reply text is read from the first candidate's first part.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    error::{AppError, AppResult},
    services::generative::{GenerationRequest, GenerativeModel},
};

const MAX_OUTPUT_TOKENS: u32 = 2000;
const TOP_P: f32 = 0.8;
const TOP_K: u32 = 40;

#[derive(Clone)]
pub struct GeminiClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl GeminiClient {
    /// Builds a client when an API key is configured, `None` otherwise
    pub fn from_config(config: &Config) -> AppResult<Option<Self>> {
        let Some(api_key) = config.gemini_credentials() else {
            return Ok(None);
        };

        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.gemini_timeout_secs))
            .build()?;

        Ok(Some(Self {
            http_client,
            api_key: api_key.to_string(),
            api_url: config.gemini_api_url.trim_end_matches('/').to_string(),
            model: config.gemini_model.clone(),
        }))
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url, self.model
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<WireContent<'a>>,
    generation_config: WireGenerationConfig,
}

#[derive(Debug, Serialize)]
struct WireContent<'a> {
    role: &'static str,
    parts: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
struct WirePart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    top_k: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

impl<'a> GenerateContentBody<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        Self {
            contents: vec![WireContent {
                role: "user",
                parts: vec![WirePart {
                    text: &request.prompt,
                }],
            }],
            generation_config: WireGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: MAX_OUTPUT_TOKENS,
                top_p: TOP_P,
                top_k: TOP_K,
                response_mime_type: request.json_output.then_some("application/json"),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
            .filter(|text| !text.trim().is_empty())
    }
}

#[async_trait::async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> AppResult<String> {
        let body = GenerateContentBody::from_request(&request);

        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Gemini API returned status {}: {}",
                status, body
            )));
        }

        let reply: GenerateContentResponse = response.json().await?;

        let text = reply
            .into_text()
            .ok_or_else(|| AppError::Generation("Gemini returned no candidate text".to_string()))?;

        tracing::debug!(
            model = %self.model,
            json_output = request.json_output,
            reply_chars = text.len(),
            "Gemini generation completed"
        );

        Ok(text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> Config {
        let mut vars = vec![("GEMINI_API_URL".to_string(), "https://example.test/".to_string())];
        if let Some(key) = api_key {
            vars.push(("GEMINI_API_KEY".to_string(), key.to_string()));
        }
        envy::from_iter(vars).unwrap()
    }

    #[test]
    fn test_no_client_without_credentials() {
        assert!(GeminiClient::from_config(&config(None)).unwrap().is_none());
        assert!(GeminiClient::from_config(&config(Some("   "))).unwrap().is_none());
    }

    #[test]
    fn test_endpoint_uses_configured_model() {
        let client = GeminiClient::from_config(&config(Some("secret")))
            .unwrap()
            .unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_wire_format() {
        let request = GenerationRequest::json("Rank these".to_string(), 0.3);
        let body = serde_json::to_value(GenerateContentBody::from_request(&request)).unwrap();

        assert_eq!(body["contents"][0]["parts"][0]["text"], "Rank these");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2000);
        assert_eq!(body["generationConfig"]["topK"], 40);
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_text_request_omits_mime_type() {
        let request = GenerationRequest::text("Plan a trip".to_string(), 0.7);
        let body = serde_json::to_value(GenerateContentBody::from_request(&request)).unwrap();
        assert!(body["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_response_text_extraction() {
        let reply: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "[]"}], "role": "model"}}]}"#,
        )
        .unwrap();
        assert_eq!(reply.into_text().as_deref(), Some("[]"));

        let empty: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(empty.into_text(), None);
    }
}
