use serde::{Deserialize, Serialize};

/// The specialized agents the CLI can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// Generate Google-style docstrings for every function in a file.
    Doc,
    /// Summarize the purpose and structure of a file.
    Summary,
    /// Suggest type annotations for every function.
    Type,
    /// Migrate code to a new version or framework.
    Migration,
    /// Generate pytest-style unit tests.
    Test,
    /// Find bugs and suggest fixes.
    Bug,
    /// Refactor for readability and maintainability.
    Refactor,
    /// Map a natural-language instruction to a plan of other agents.
    Orchestrator,
}

impl AgentKind {
    pub const ALL: [AgentKind; 8] = [
        AgentKind::Doc,
        AgentKind::Summary,
        AgentKind::Type,
        AgentKind::Migration,
        AgentKind::Test,
        AgentKind::Bug,
        AgentKind::Refactor,
        AgentKind::Orchestrator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Doc => "doc",
            AgentKind::Summary => "summary",
            AgentKind::Type => "type",
            AgentKind::Migration => "migration",
            AgentKind::Test => "test",
            AgentKind::Bug => "bug",
            AgentKind::Refactor => "refactor",
            AgentKind::Orchestrator => "orchestrator",
        }
    }

    pub fn parse(s: &str) -> Option<AgentKind> {
        Self::ALL.iter().copied().find(|k| k.as_str() == s)
    }

    /// Whether this agent needs a source file to operate on.
    pub fn requires_file(&self) -> bool {
        !matches!(self, AgentKind::Orchestrator)
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where generated content goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Print to stdout.
    Console,
    /// Rewrite the original file, keeping a `.bak` backup.
    InPlace,
    /// Write a sibling file with an agent-specific suffix.
    NewFile,
}

impl OutputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMode::Console => "console",
            OutputMode::InPlace => "in-place",
            OutputMode::NewFile => "new-file",
        }
    }

    /// Whether this mode touches the filesystem.
    pub fn modifies_files(&self) -> bool {
        !matches!(self, OutputMode::Console)
    }
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Console
    }
}

impl std::fmt::Display for OutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Response from the interactive-approval collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalDecision {
    Approved,
    Refine,
    Denied,
}

impl ApprovalDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalDecision::Approved => "approved",
            ApprovalDecision::Refine => "refine",
            ApprovalDecision::Denied => "denied",
        }
    }
}

/// One function definition extracted from a source file.
///
/// Lines are 1-based and inclusive. `indentation` is the leading whitespace
/// of the `def` line, used to re-indent inserted docstrings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub source: String,
    pub start_line: usize,
    pub end_line: usize,
    pub indentation: String,
}

/// One turn of chat history kept in the shared context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// A single non-streaming completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System prompt, sent separately where the provider supports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// User prompt.
    pub prompt: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Request with the sampling defaults used across the prompt catalog.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            temperature: 0.2,
            top_p: 0.9,
            max_tokens: 1024,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_kind_round_trip() {
        for kind in AgentKind::ALL {
            assert_eq!(AgentKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(AgentKind::parse("linter"), None);
    }

    #[test]
    fn test_agent_kind_requires_file() {
        assert!(AgentKind::Doc.requires_file());
        assert!(AgentKind::Bug.requires_file());
        assert!(!AgentKind::Orchestrator.requires_file());
    }

    #[test]
    fn test_output_mode_serde_names() {
        let json = serde_json::to_string(&OutputMode::InPlace).unwrap();
        assert_eq!(json, "\"in-place\"");
        let back: OutputMode = serde_json::from_str("\"new-file\"").unwrap();
        assert_eq!(back, OutputMode::NewFile);
    }

    #[test]
    fn test_output_mode_modifies_files() {
        assert!(!OutputMode::Console.modifies_files());
        assert!(OutputMode::InPlace.modifies_files());
        assert!(OutputMode::NewFile.modifies_files());
    }

    #[test]
    fn test_completion_request_builders() {
        let req = CompletionRequest::new("hello")
            .with_system("be brief")
            .with_temperature(0.1)
            .with_max_tokens(256);
        assert_eq!(req.system.as_deref(), Some("be brief"));
        assert_eq!(req.temperature, 0.1);
        assert_eq!(req.top_p, 0.9);
        assert_eq!(req.max_tokens, 256);
    }
}
