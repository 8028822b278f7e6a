//! The agent node catalog.
//!
//! Every node implements the engine's three-phase [`Node`] trait and talks to
//! its collaborators through the `quillon-core` traits, so the whole catalog
//! can be exercised with scripted stand-ins. Nodes communicate through the
//! shared context under the keys in [`keys`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use quillon_core::error::{QuillonError, Result};
use quillon_core::traits::{Approver, TextGenerator};
use quillon_core::types::{AgentKind, OutputMode};
use quillon_flow::{Node, Outcome, SharedContext};

pub mod approval;
pub mod bugscan;
pub mod chat;
pub mod context;
pub mod doc;
pub mod migration;
pub mod orchestrator;
pub mod refactor;
pub mod report;
pub mod safety;
pub mod summary;
pub mod testgen;
pub mod type_hint;

pub use approval::ApprovalNode;
pub use bugscan::BugScanNode;
pub use chat::{ClarificationNode, FileManagementNode, GeneralAnswerNode, IntentNode};
pub use context::ContextNode;
pub use doc::DocNode;
pub use migration::MigrationNode;
pub use orchestrator::OrchestratorNode;
pub use refactor::RefactorNode;
pub use report::ReportNode;
pub use safety::SafetyGateNode;
pub use summary::SummaryNode;
pub use testgen::TestGenNode;
pub use type_hint::TypeHintNode;

/// Shared-context keys the nodes read and write.
pub mod keys {
    /// Snapshot of the run inputs, staged by the context node.
    pub const RUN: &str = "run";
    /// Raw text of the input file.
    pub const SOURCE_CODE: &str = "source_code";
    /// Extracted function records, as a JSON array.
    pub const FUNCTIONS: &str = "functions";
    /// Rendered output of the agent node, reviewed by the approval node.
    pub const RESULT: &str = "result";
    /// `"approved"` or `"denied"`, written by the safety gate.
    pub const SAFETY_DECISION: &str = "safety_decision";
    /// The orchestrator instruction.
    pub const INSTRUCTION: &str = "instruction";
    /// Final answer of a chat turn or orchestrator run.
    pub const ANSWER: &str = "answer";
    /// Latest user message in a chat turn.
    pub const USER_INPUT: &str = "user_input";
    /// Chat history, a JSON array of `{role, content}` turns.
    pub const HISTORY: &str = "history";
    /// Intent label chosen for the current chat turn.
    pub const INTENT: &str = "intent";
}

/// Per-run settings shared by the agent nodes.
#[derive(Debug, Clone)]
pub struct AgentOptions {
    /// Source file the agents operate on, if any.
    pub file: Option<PathBuf>,
    /// Where generated content goes.
    pub output: OutputMode,
    /// Skip interactive confirmations.
    pub no_confirm: bool,
    /// Target named in migration prompts.
    pub migration_target: String,
    /// Natural-language instruction for the orchestrator.
    pub instruction: Option<String>,
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            file: None,
            output: OutputMode::Console,
            no_confirm: false,
            migration_target: "Python 3".to_string(),
            instruction: None,
        }
    }
}

/// Construct the node for an agent kind with its collaborators injected.
pub fn agent_node(
    kind: AgentKind,
    generator: Arc<dyn TextGenerator>,
    approver: Arc<dyn Approver>,
    options: AgentOptions,
) -> Box<dyn Node> {
    match kind {
        AgentKind::Doc => Box::new(DocNode::new(generator, approver, options)),
        AgentKind::Summary => Box::new(SummaryNode::new(generator, options)),
        AgentKind::Type => Box::new(TypeHintNode::new(generator, options)),
        AgentKind::Migration => Box::new(MigrationNode::new(generator, options)),
        AgentKind::Test => Box::new(TestGenNode::new(generator, options)),
        AgentKind::Bug => Box::new(BugScanNode::new(generator, options)),
        AgentKind::Refactor => Box::new(RefactorNode::new(generator, options)),
        AgentKind::Orchestrator => {
            Box::new(OrchestratorNode::new(generator, approver, options))
        }
    }
}

/// Drive a single node through its full lifecycle over `context`.
pub(crate) fn run_node_once(
    node: &mut dyn Node,
    context: &mut SharedContext,
) -> Result<Outcome> {
    let prepared = node.prepare(context)?;
    let result = node.execute(&prepared)?;
    node.finalize(context, prepared, result)
}

fn require_file(options: &AgentOptions) -> Result<&Path> {
    options.file.as_deref().ok_or_else(|| {
        QuillonError::Preparation("No input file provided for this operation.".to_string())
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use quillon_core::error::{QuillonError, Result};
    use quillon_core::traits::{Approver, TextGenerator};
    use quillon_core::types::{ApprovalDecision, CompletionRequest};

    /// Replays a fixed list of replies and records every prompt it saw.
    pub struct ScriptedGenerator {
        replies: Mutex<VecDeque<String>>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        pub fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    impl TextGenerator for ScriptedGenerator {
        fn generate(&self, request: &CompletionRequest) -> Result<String> {
            self.prompts.lock().unwrap().push(request.prompt.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| QuillonError::LlmRequest("scripted replies exhausted".to_string()))
        }
    }

    /// Approver with scripted outcomes. Unscripted confirms approve and
    /// unscripted reviews accept, so tests only script what they assert.
    pub struct ScriptedApprover {
        confirms: Mutex<VecDeque<bool>>,
        reviews: Mutex<VecDeque<ApprovalDecision>>,
        answers: Mutex<VecDeque<String>>,
        pub confirm_messages: Mutex<Vec<String>>,
    }

    impl ScriptedApprover {
        pub fn new() -> Self {
            Self {
                confirms: Mutex::new(VecDeque::new()),
                reviews: Mutex::new(VecDeque::new()),
                answers: Mutex::new(VecDeque::new()),
                confirm_messages: Mutex::new(Vec::new()),
            }
        }

        pub fn confirms(self, values: &[bool]) -> Self {
            *self.confirms.lock().unwrap() = values.iter().copied().collect();
            self
        }

        pub fn reviews(self, values: &[ApprovalDecision]) -> Self {
            *self.reviews.lock().unwrap() = values.iter().copied().collect();
            self
        }

        pub fn answers(self, values: &[&str]) -> Self {
            *self.answers.lock().unwrap() = values.iter().map(|a| a.to_string()).collect();
            self
        }
    }

    impl Approver for ScriptedApprover {
        fn confirm(&self, message: &str) -> Result<bool> {
            self.confirm_messages.lock().unwrap().push(message.to_string());
            Ok(self.confirms.lock().unwrap().pop_front().unwrap_or(true))
        }

        fn review(&self, _title: &str, _message: &str, _content: &str) -> Result<ApprovalDecision> {
            Ok(self
                .reviews
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(ApprovalDecision::Approved))
        }

        fn ask(&self, _prompt: &str) -> Result<String> {
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| QuillonError::Prompt("no scripted answer".to_string()))
        }
    }
}
