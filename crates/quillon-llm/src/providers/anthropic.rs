use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use quillon_core::config::ProviderConfig;
use quillon_core::error::{QuillonError, Result};
use quillon_core::traits::LlmClient;
use quillon_core::types::CompletionRequest;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";

pub struct AnthropicClient {
    http: Client,
    model: String,
    api_key: Option<String>,
    base_url: String,
}

impl AnthropicClient {
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
                .unwrap_or_else(|| ANTHROPIC_API_URL.to_string()),
        }
    }
}

// Anthropic API request types
#[derive(Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<ApiMessage>,
    temperature: f32,
    top_p: f32,
}

#[derive(Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

// Anthropic API response types
#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl LlmClient for AnthropicClient {
    fn complete(&self, request: &CompletionRequest) -> BoxFuture<'_, Result<String>> {
        let request = request.clone();

        Box::pin(async move {
            let api_key = self
                .api_key
                .as_deref()
                .ok_or_else(|| QuillonError::Config("Anthropic API key not set".into()))?;

            let body = MessagesRequest {
                model: self.model.clone(),
                max_tokens: request.max_tokens,
                system: request.system.clone(),
                messages: vec![ApiMessage {
                    role: "user".to_string(),
                    content: request.prompt.clone(),
                }],
                temperature: request.temperature,
                top_p: request.top_p,
            };

            debug!(model = %self.model, "sending Anthropic completion request");

            let response = self
                .http
                .post(&self.base_url)
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
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

            let parsed: MessagesResponse = response
                .json()
                .await
                .map_err(|e| QuillonError::LlmParse(e.to_string()))?;

            let text = parsed
                .content
                .into_iter()
                .find_map(|block| block.text)
                .ok_or_else(|| {
                    QuillonError::LlmParse("response contained no text blocks".to_string())
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
        let client = AnthropicClient::new(&ProviderConfig::default());
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(client.base_url, ANTHROPIC_API_URL);
    }

    #[test]
    fn test_response_parse_takes_first_text_block() {
        let raw = r#"{"content":[{"type":"text","text":"hi there"}]}"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        let text = parsed.content.into_iter().find_map(|b| b.text).unwrap();
        assert_eq!(text, "hi there");
    }

    #[test]
    fn test_empty_content_is_a_parse_error_case() {
        let raw = r#"{"content":[]}"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.content.into_iter().find_map(|b| b.text).is_none());
    }
}
