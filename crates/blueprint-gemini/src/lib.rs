//! Gemini-backed implementation of the generation boundary.
//!
//! Speaks the `generateContent` REST API in structured-output mode: every
//! request carries `responseMimeType: application/json` plus the capability's
//! response schema, so the model's reply is the JSON document itself.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use blueprint_core::genai::{GenerationError, GenerationRequest, Generator};

/// Gemini client configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication.
    pub api_key: String,
    /// Model name (e.g., "gemini-2.5-flash").
    pub model: String,
    /// Base endpoint URL.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 60,
        }
    }
}

/// A [`Generator`] backed by the Gemini API.
pub struct GeminiGenerator {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiGenerator {
    pub fn new(config: GeminiConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn build_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.endpoint, self.config.model, self.config.api_key
        )
    }
}

// Gemini API request/response structures

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContentResponse,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiPartResponse {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
    #[allow(dead_code)]
    code: Option<i32>,
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Value, GenerationError> {
        let url = self.build_url();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: request.schema.clone(),
            },
        };

        debug!(model = %self.config.model, "sending generateContent request");
        let response = self
            .client
            .post(&url)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api(format!("HTTP {status}: {text}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let parsed: GeminiResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::MalformedJson(e.to_string()))?;

        if let Some(error) = parsed.error {
            return Err(GenerationError::Api(format!(
                "Gemini API error: {}",
                error.message
            )));
        }

        let content = parsed
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| GenerationError::Api("no content in response".to_string()))?;

        // In structured-output mode the candidate text is the JSON document.
        serde_json::from_str(content.trim())
            .map_err(|e| GenerationError::MalformedJson(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_core::genai::requests;

    #[test]
    fn default_config_targets_the_flash_model() {
        let config = GeminiConfig::default();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert!(config.endpoint.contains("generativelanguage.googleapis.com"));
    }

    #[test]
    fn build_url_embeds_model_and_key() {
        let config = GeminiConfig {
            api_key: "test-key".to_string(),
            ..Default::default()
        };
        let generator = GeminiGenerator::new(config).unwrap();
        let url = generator.build_url();
        assert!(url.contains("gemini-2.5-flash:generateContent"));
        assert!(url.contains("key=test-key"));
    }

    #[test]
    fn request_body_serializes_the_schema_verbatim() {
        let request = requests::initial_ideas("fitness");
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: request.schema.clone(),
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["responseSchema"], request.schema);
        assert_eq!(json["contents"][0]["role"], "user");
    }

    #[tokio::test]
    #[ignore = "requires live GEMINI_API_KEY and network"]
    async fn live_inspiration_call_when_env_set() {
        let api_key = match std::env::var("GEMINI_API_KEY") {
            Ok(v) if !v.trim().is_empty() => v,
            _ => {
                eprintln!("skipped: GEMINI_API_KEY is not set");
                return;
            }
        };

        let generator = GeminiGenerator::new(GeminiConfig {
            api_key,
            ..Default::default()
        })
        .expect("client should initialize");

        let value = generator
            .generate(&requests::inspiration())
            .await
            .expect("live generation should succeed");
        assert!(value.get("idea").is_some());
        assert!(value.get("category").is_some());
    }
}
