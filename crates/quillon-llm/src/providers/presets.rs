/// Static metadata for a named provider.
pub struct ProviderPreset {
    /// Environment variable consulted when the config carries no key.
    pub api_key_env: Option<&'static str>,
    pub needs_api_key: bool,
}

/// Look up a provider preset by name.
pub fn get_preset(provider: &str) -> Option<ProviderPreset> {
    match provider {
        "openai" => Some(ProviderPreset {
            api_key_env: Some("OPENAI_API_KEY"),
            needs_api_key: true,
        }),
        "anthropic" | "claude" => Some(ProviderPreset {
            api_key_env: Some("ANTHROPIC_API_KEY"),
            needs_api_key: true,
        }),
        "ollama" => Some(ProviderPreset {
            api_key_env: None,
            needs_api_key: false,
        }),
        "google" | "gemini" => Some(ProviderPreset {
            api_key_env: Some("GEMINI_API_KEY"),
            needs_api_key: true,
        }),
        _ => None,
    }
}

/// List all known provider names, canonical spellings only.
pub fn all_preset_names() -> &'static [&'static str] {
    &["openai", "anthropic", "ollama", "google"]
}
