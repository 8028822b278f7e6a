use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{QuillonError, Result};
use crate::types::OutputMode;

/// Top-level Quillon configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub flow: FlowConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// LLM provider selection and sampling defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider")]
    pub name: String,
    /// Model id; None picks the provider preset's default.
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: default_provider(),
            model: None,
            api_key: None,
            base_url: None,
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_provider() -> String { "openai".to_string() }
fn default_temperature() -> f32 { 0.2 }
fn default_top_p() -> f32 { 0.9 }
fn default_max_tokens() -> u32 { 1024 }

/// Retry configuration for LLM requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff")]
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff(),
            max_backoff_ms: default_max_backoff(),
        }
    }
}

fn default_max_retries() -> u32 { 3 }
fn default_initial_backoff() -> u64 { 1000 }
fn default_max_backoff() -> u64 { 30000 }

/// Flow runner limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowConfig {
    /// Step ceiling applied by the CLI; 0 disables the ceiling.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
        }
    }
}

fn default_max_steps() -> usize { 1000 }

impl FlowConfig {
    pub fn step_limit(&self) -> Option<usize> {
        if self.max_steps == 0 {
            None
        } else {
            Some(self.max_steps)
        }
    }
}

/// Output defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub mode: OutputMode,
}

/// Session persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_db")]
    pub db_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            db_path: default_session_db(),
        }
    }
}

fn default_session_db() -> String { "~/.quillon/sessions.db".to_string() }

impl AppConfig {
    /// Load config from a TOML file, with env var expansion.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| QuillonError::Config(format!("config file not found: {}", path.display())))?;

        // Expand ${ENV_VAR} references
        let expanded = expand_env_vars(&content);

        toml::from_str(&expanded).map_err(|e| QuillonError::Config(e.to_string()))
    }

    /// Load from the given path, or from the default location, or fall back
    /// to built-in defaults when no file exists.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Self::default_path();
                if default_path.is_file() {
                    Self::load(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Default config location: `~/.quillon/config.toml`.
    pub fn default_path() -> PathBuf {
        match dirs_home() {
            Some(home) => home.join(".quillon").join("config.toml"),
            None => PathBuf::from(".quillon/config.toml"),
        }
    }

    /// Resolve the session database path (expand ~).
    pub fn session_db_path(&self) -> PathBuf {
        expand_home(&self.session.db_path)
    }
}

/// Expand a leading `~/` against $HOME.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Expand `${ENV_VAR}` patterns in a string.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_name.push(c);
            }
            match std::env::var(&var_name) {
                Ok(val) => result.push_str(&val),
                Err(_) => {
                    // Keep original if env var not set
                    result.push_str(&format!("${{{}}}", var_name));
                }
            }
        } else {
            result.push(c);
        }
    }
    result
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_vars() {
        std::env::set_var("TEST_QUILLON_VAR", "hello");
        let result = expand_env_vars("key = \"${TEST_QUILLON_VAR}\"");
        assert_eq!(result, "key = \"hello\"");
        std::env::remove_var("TEST_QUILLON_VAR");
    }

    #[test]
    fn test_expand_env_vars_missing() {
        let result = expand_env_vars("key = \"${NONEXISTENT_QUILLON_VAR}\"");
        assert_eq!(result, "key = \"${NONEXISTENT_QUILLON_VAR}\"");
    }

    #[test]
    fn test_defaults_from_empty_toml() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.provider.name, "openai");
        assert!(config.provider.model.is_none());
        assert_eq!(config.provider.temperature, 0.2);
        assert_eq!(config.provider.top_p, 0.9);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.flow.max_steps, 1000);
        assert_eq!(config.output.mode, OutputMode::Console);
        assert_eq!(config.session.db_path, "~/.quillon/sessions.db");
    }

    #[test]
    fn test_partial_provider_section() {
        let toml_str = r#"
[provider]
name = "anthropic"
model = "claude-3-haiku-20240307"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.provider.name, "anthropic");
        assert_eq!(config.provider.model.as_deref(), Some("claude-3-haiku-20240307"));
        assert_eq!(config.provider.max_tokens, 1024);
    }

    #[test]
    fn test_step_limit_zero_disables_ceiling() {
        let toml_str = r#"
[flow]
max_steps = 0
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.flow.step_limit(), None);
        assert_eq!(FlowConfig::default().step_limit(), Some(1000));
    }

    #[test]
    fn test_expand_home() {
        std::env::set_var("HOME", "/home/sample");
        assert_eq!(expand_home("~/x/y"), PathBuf::from("/home/sample/x/y"));
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
    }
}
