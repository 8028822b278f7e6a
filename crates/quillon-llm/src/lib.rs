pub mod blocking;
pub mod providers;
pub mod retry;

use quillon_core::config::ProviderConfig;
use quillon_core::error::{QuillonError, Result};
use quillon_core::traits::LlmClient;

pub use blocking::BlockingGenerator;
pub use providers::anthropic::AnthropicClient;
pub use providers::google::GoogleClient;
pub use providers::ollama::OllamaClient;
pub use providers::openai::OpenAiClient;
pub use retry::RetryingClient;

/// Create an LLM client based on the provider name in the config.
///
/// An unset API key falls back to the provider's conventional environment
/// variable. Providers that require a key fail here rather than on the first
/// request.
pub fn create_client(config: &ProviderConfig) -> Result<Box<dyn LlmClient>> {
    let preset = providers::presets::get_preset(&config.name).ok_or_else(|| {
        QuillonError::UnsupportedProvider(format!(
            "{} (expected one of: {})",
            config.name,
            providers::presets::all_preset_names().join(", ")
        ))
    })?;

    let mut config = config.clone();
    if config.api_key.is_none() {
        if let Some(var) = preset.api_key_env {
            config.api_key = std::env::var(var).ok();
        }
    }
    if preset.needs_api_key && config.api_key.is_none() {
        return Err(QuillonError::Config(format!(
            "provider '{}' requires an API key (set {} or [provider].api_key)",
            config.name,
            preset.api_key_env.unwrap_or("api_key"),
        )));
    }

    Ok(match config.name.as_str() {
        "anthropic" | "claude" => Box::new(AnthropicClient::new(&config)),
        "ollama" => Box::new(OllamaClient::new(&config)),
        "google" | "gemini" => Box::new(GoogleClient::new(&config)),
        _ => Box::new(OpenAiClient::new(&config)),
    })
}
