use std::io::Write;

use quillon_core::config::AppConfig;
use quillon_core::types::OutputMode;

#[test]
fn test_load_full_config_from_file() {
    let toml_content = r#"
[provider]
name = "anthropic"
model = "claude-sonnet-4-20250514"
api_key = "sk-test-key"
temperature = 0.5
top_p = 0.95
max_tokens = 4096

[retry]
max_retries = 5
initial_backoff_ms = 500
max_backoff_ms = 10000

[flow]
max_steps = 50

[output]
mode = "in-place"

[session]
db_path = "/tmp/quillon-test/sessions.db"
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");

    assert_eq!(config.provider.name, "anthropic");
    assert_eq!(
        config.provider.model,
        Some("claude-sonnet-4-20250514".to_string())
    );
    assert_eq!(config.provider.api_key, Some("sk-test-key".to_string()));
    assert_eq!(config.provider.max_tokens, 4096);

    assert_eq!(config.retry.max_retries, 5);
    assert_eq!(config.retry.initial_backoff_ms, 500);
    assert_eq!(config.retry.max_backoff_ms, 10000);

    assert_eq!(config.flow.max_steps, 50);
    assert_eq!(config.flow.step_limit(), Some(50));

    assert_eq!(config.output.mode, OutputMode::InPlace);
    assert_eq!(config.session.db_path, "/tmp/quillon-test/sessions.db");
}

#[test]
fn test_env_var_expansion_in_config() {
    std::env::set_var("QUILLON_TEST_API_KEY", "expanded-key-value");

    let toml_content = r#"
[provider]
name = "openai"
api_key = "${QUILLON_TEST_API_KEY}"
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");
    assert_eq!(config.provider.api_key, Some("expanded-key-value".to_string()));

    std::env::remove_var("QUILLON_TEST_API_KEY");
}

#[test]
fn test_minimal_config_uses_defaults() {
    let toml_content = r#"
[provider]
name = "ollama"
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");

    assert_eq!(config.provider.name, "ollama");
    assert!(config.provider.model.is_none());
    assert!(config.provider.api_key.is_none());
    assert_eq!(config.provider.temperature, 0.2);
    assert_eq!(config.provider.max_tokens, 1024);

    assert_eq!(config.retry.max_retries, 3);
    assert_eq!(config.retry.initial_backoff_ms, 1000);
    assert_eq!(config.retry.max_backoff_ms, 30000);

    assert_eq!(config.flow.max_steps, 1000);
    assert_eq!(config.output.mode, OutputMode::Console);
    assert_eq!(config.session.db_path, "~/.quillon/sessions.db");
}

#[test]
fn test_zero_max_steps_disables_the_ceiling() {
    let toml_content = r#"
[flow]
max_steps = 0
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");
    assert_eq!(config.flow.step_limit(), None);
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let missing = std::path::Path::new("/nonexistent/quillon-config.toml");
    let err = AppConfig::load_or_default(Some(missing)).unwrap_err();
    assert!(err.to_string().contains("config file not found"));
}
