use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuillonError {
    // Node lifecycle errors
    #[error("Preparation failed: {0}")]
    Preparation(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    // Graph errors
    #[error("Flow configuration error: {0}")]
    Configuration(String),

    #[error("Flow exceeded step limit ({0})")]
    StepLimitExceeded(usize),

    // LLM errors
    #[error("LLM request failed: {0}")]
    LlmRequest(String),

    #[error("LLM response parse error: {0}")]
    LlmParse(String),

    #[error("LLM provider not supported: {0}")]
    UnsupportedProvider(String),

    // Config errors
    #[error("Config error: {0}")]
    Config(String),

    // Storage errors
    #[error("Session store error: {0}")]
    Session(String),

    // User interaction errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl QuillonError {
    /// Whether this error came out of a node's prepare phase.
    pub fn is_preparation(&self) -> bool {
        matches!(self, QuillonError::Preparation(_))
    }
}

pub type Result<T> = std::result::Result<T, QuillonError>;
