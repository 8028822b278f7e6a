use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use quillon_core::config::ProviderConfig;
use quillon_core::error::{QuillonError, Result};
use quillon_core::traits::LlmClient;
use quillon_core::types::CompletionRequest;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o";

/// OpenAI chat-completions client. Also speaks to any OpenAI-compatible
/// endpoint when `base_url` points elsewhere.
pub struct OpenAiClient {
    http: Client,
    model: String,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiClient {
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
                .unwrap_or_else(|| OPENAI_API_URL.to_string()),
        }
    }
}

// OpenAI API request types
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ApiMessage>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

// OpenAI API response types
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn build_messages(request: &CompletionRequest) -> Vec<ApiMessage> {
    let mut messages = Vec::new();
    if let Some(system) = &request.system {
        messages.push(ApiMessage {
            role: "system".to_string(),
            content: system.clone(),
        });
    }
    messages.push(ApiMessage {
        role: "user".to_string(),
        content: request.prompt.clone(),
    });
    messages
}

impl LlmClient for OpenAiClient {
    fn complete(&self, request: &CompletionRequest) -> BoxFuture<'_, Result<String>> {
        let request = request.clone();

        Box::pin(async move {
            let api_key = self
                .api_key
                .as_deref()
                .ok_or_else(|| QuillonError::Config("OpenAI API key not set".into()))?;

            let body = ChatRequest {
                model: self.model.clone(),
                messages: build_messages(&request),
                temperature: request.temperature,
                top_p: request.top_p,
                max_tokens: request.max_tokens,
            };

            debug!(model = %self.model, "sending OpenAI completion request");

            let response = self
                .http
                .post(&self.base_url)
                .header("authorization", format!("Bearer {}", api_key))
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

            let parsed: ChatResponse = response
                .json()
                .await
                .map_err(|e| QuillonError::LlmParse(e.to_string()))?;

            let text = parsed
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .ok_or_else(|| {
                    QuillonError::LlmParse("response contained no choices".to_string())
                })?;

            Ok(text.trim().to_string())
        })
    }
}
