use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use quillon_core::config::ProviderConfig;
use quillon_core::error::{QuillonError, Result};
use quillon_core::traits::LlmClient;
use quillon_core::types::CompletionRequest;

const OLLAMA_API_URL: &str = "http://localhost:11434/api/chat";
const DEFAULT_MODEL: &str = "llama2";

/// Local Ollama client. No API key; the host defaults to localhost.
pub struct OllamaClient {
    http: Client,
    model: String,
    base_url: String,
}

impl OllamaClient {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            http: Client::new(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| OLLAMA_API_URL.to_string()),
        }
    }
}

// Ollama API request types
#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<ApiMessage>,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

// Ollama API response types
#[derive(Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

impl LlmClient for OllamaClient {
    fn complete(&self, request: &CompletionRequest) -> BoxFuture<'_, Result<String>> {
        let request = request.clone();

        Box::pin(async move {
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

            let body = OllamaRequest {
                model: self.model.clone(),
                messages,
                stream: false,
                options: OllamaOptions {
                    temperature: request.temperature,
                    top_p: request.top_p,
                    num_predict: request.max_tokens,
                },
            };

            debug!(model = %self.model, url = %self.base_url, "sending Ollama completion request");

            let response = self
                .http
                .post(&self.base_url)
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

            let parsed: OllamaResponse = response
                .json()
                .await
                .map_err(|e| QuillonError::LlmParse(e.to_string()))?;

            let text = parsed
                .message
                .map(|m| m.content)
                .ok_or_else(|| QuillonError::LlmParse("response contained no message".to_string()))?;

            Ok(text.trim().to_string())
        })
    }
}
