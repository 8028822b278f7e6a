pub mod anthropic;
pub mod google;
pub mod ollama;
pub mod openai;
pub mod presets;

pub use anthropic::AnthropicClient;
pub use google::GoogleClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;
