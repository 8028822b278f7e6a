use futures::future::BoxFuture;

use crate::error::Result;
use crate::types::{ApprovalDecision, CompletionRequest};

/// Provider-agnostic, non-streaming LLM client.
pub trait LlmClient: Send + Sync + 'static {
    /// Send a completion request and receive the response text.
    fn complete(&self, request: &CompletionRequest) -> BoxFuture<'_, Result<String>>;
}

impl std::fmt::Debug for dyn LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn LlmClient")
    }
}

/// Synchronous text-generation collaborator consumed by node execute phases.
///
/// The engine is single-threaded and blocking; implementations that sit on
/// async transports own their runtime behind this seam.
pub trait TextGenerator: Send + Sync {
    fn generate(&self, request: &CompletionRequest) -> Result<String>;
}

/// Interactive-approval collaborator consumed by approval and safety nodes.
///
/// Maps raw user input to the decision enumeration; nodes never read stdin
/// themselves.
pub trait Approver: Send + Sync {
    /// Yes/no confirmation for a destructive action.
    fn confirm(&self, message: &str) -> Result<bool>;

    /// Present content for review and return approve / refine / deny.
    fn review(&self, title: &str, message: &str, content: &str) -> Result<ApprovalDecision>;

    /// Free-form follow-up question (clarification prompts).
    fn ask(&self, prompt: &str) -> Result<String>;
}
