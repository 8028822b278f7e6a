use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use quillon_core::config::ProviderConfig;
use quillon_core::error::{QuillonError, Result};
use quillon_core::traits::LlmClient;
use quillon_core::types::CompletionRequest;

const GOOGLE_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Google Gemini native API client.
pub struct GoogleClient {
    http: Client,
    model: String,
    api_key: Option<String>,
    base_url: String,
}

impl GoogleClient {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            http: Client::new(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key: config.api_key.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| GOOGLE_API_BASE.to_string()),
        }
    }
}

// Gemini API request types
#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

// Gemini API response types
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

impl LlmClient for GoogleClient {
    fn complete(&self, request: &CompletionRequest) -> BoxFuture<'_, Result<String>> {
        let request = request.clone();

        Box::pin(async move {
            let api_key = self
                .api_key
                .as_deref()
                .ok_or_else(|| QuillonError::Config("Google API key not set".into()))?;

            let url = format!(
                "{}/{}:generateContent?key={}",
                self.base_url, self.model, api_key
            );

            let system_instruction = request.system.as_ref().map(|text| GeminiContent {
                parts: vec![GeminiPart { text: text.clone() }],
            });

            let body = GenerateRequest {
                contents: vec![GeminiContent {
                    parts: vec![GeminiPart {
                        text: request.prompt.clone(),
                    }],
                }],
                system_instruction,
                generation_config: GenerationConfig {
                    temperature: request.temperature,
                    top_p: request.top_p,
                    max_output_tokens: request.max_tokens,
                },
            };

            debug!(model = %self.model, "sending Gemini completion request");

            let response = self
                .http
                .post(&url)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| QuillonError::LlmRequest(e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown error".to_string());
                return Err(QuillonError::LlmRequest(format!(
                    "HTTP {}: {}",
                    status, body
                )));
            }

            let parsed: GenerateResponse = response
                .json()
                .await
                .map_err(|e| QuillonError::LlmParse(e.to_string()))?;

            let text = parsed
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content)
                .and_then(|content| content.parts.into_iter().next())
                .map(|part| part.text)
                .ok_or_else(|| {
                    QuillonError::LlmParse("response contained no candidates".to_string())
                })?;

            Ok(text.trim().to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_from_empty_config() {
        let client = GoogleClient::new(&ProviderConfig::default());
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(client.base_url, GOOGLE_API_BASE);
    }

    #[test]
    fn test_response_parse_reads_first_candidate_part() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"forty-two"}],"role":"model"}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap();
        assert_eq!(text, "forty-two");
    }

    #[test]
    fn test_generation_config_uses_camel_case_keys() {
        let config = GenerationConfig {
            temperature: 0.2,
            top_p: 0.9,
            max_output_tokens: 256,
        };
        let raw = serde_json::to_string(&config).unwrap();
        assert!(raw.contains("\"topP\""));
        assert!(raw.contains("\"maxOutputTokens\""));
    }
}
