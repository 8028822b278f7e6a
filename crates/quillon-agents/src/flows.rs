//! Prebuilt flow graphs behind the CLI commands.
//!
//! Node ids are stable, short names; the Mermaid rendering and the runner's
//! step logs both show them, so a diagram lines up with a trace of the same
//! run.

use std::sync::Arc;

use quillon_core::error::Result;
use quillon_core::traits::{Approver, TextGenerator};
use quillon_core::types::AgentKind;
use quillon_flow::Flow;

use crate::nodes::{
    agent_node, AgentOptions, ApprovalNode, ClarificationNode, ContextNode, DocNode,
    FileManagementNode, GeneralAnswerNode, IntentNode, OrchestratorNode, ReportNode,
    SafetyGateNode, SummaryNode,
};

/// The guarded flow used by `run`: safety gate, agent, human review, report.
///
/// A rejected review loops back to the agent for another attempt; a denied
/// safety gate skips straight to the report.
pub fn agent_flow(
    kind: AgentKind,
    generator: Arc<dyn TextGenerator>,
    approver: Arc<dyn Approver>,
    options: AgentOptions,
) -> Result<Flow> {
    Flow::builder()
        .node("context", ContextNode::new(kind, options.clone()))
        .node(
            "safety",
            SafetyGateNode::new(kind.as_str(), options.clone(), approver.clone()),
        )
        .node(
            "agent",
            agent_node(kind, generator, approver.clone(), options),
        )
        .node("approval", ApprovalNode::result_review(approver))
        .node("report", ReportNode::new(kind.as_str()))
        .default_edge("context", "safety")
        .edge("safety", "approved", "agent")
        .edge("safety", "denied", "report")
        .default_edge("agent", "approval")
        .edge("approval", "approved", "report")
        .edge("approval", "refine", "agent")
        .start("context")
        .build()
}

/// Unguarded variant: context, agent, report. Used for console runs with
/// confirmations disabled, where neither gate nor review has anything to ask.
pub fn simple_flow(
    kind: AgentKind,
    generator: Arc<dyn TextGenerator>,
    approver: Arc<dyn Approver>,
    options: AgentOptions,
) -> Result<Flow> {
    Flow::builder()
        .node("context", ContextNode::new(kind, options.clone()))
        .node("agent", agent_node(kind, generator, approver, options))
        .node("report", ReportNode::new(kind.as_str()))
        .default_edge("context", "agent")
        .default_edge("agent", "report")
        .start("context")
        .build()
}

/// One chat turn: classify the message, handle it, report.
///
/// Clarification loops back to the classifier with the restated input; every
/// other branch ends at the report node.
pub fn chat_flow(
    generator: Arc<dyn TextGenerator>,
    approver: Arc<dyn Approver>,
    options: AgentOptions,
) -> Result<Flow> {
    Flow::builder()
        .node("intent", IntentNode::new(generator.clone()))
        .node(
            "clarification",
            ClarificationNode::new("Please clarify your request", approver.clone()),
        )
        .node("files", FileManagementNode::new(generator.clone()))
        .node(
            "doc",
            DocNode::new(generator.clone(), approver.clone(), options.clone()),
        )
        .node("summary", SummaryNode::new(generator.clone(), options))
        .node("answer", GeneralAnswerNode::new(generator))
        .node("report", ReportNode::new("chat"))
        .edge("intent", "clarification", "clarification")
        .edge("intent", "file_management", "files")
        .edge("intent", "code_generation", "doc")
        .edge("intent", "code_analysis", "summary")
        .edge("intent", "general_question", "answer")
        .default_edge("clarification", "intent")
        .default_edge("files", "report")
        .default_edge("doc", "report")
        .default_edge("summary", "report")
        .default_edge("answer", "report")
        .start("intent")
        .build()
}

/// Instruction-driven flow: context, orchestrator, report.
pub fn orchestrator_flow(
    generator: Arc<dyn TextGenerator>,
    approver: Arc<dyn Approver>,
    options: AgentOptions,
) -> Result<Flow> {
    Flow::builder()
        .node(
            "context",
            ContextNode::new(AgentKind::Orchestrator, options.clone()),
        )
        .node(
            "orchestrator",
            OrchestratorNode::new(generator, approver, options),
        )
        .node("report", ReportNode::new("orchestrator"))
        .default_edge("context", "orchestrator")
        .default_edge("orchestrator", "report")
        .start("context")
        .build()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use quillon_core::types::ApprovalDecision;
    use quillon_flow::FlowRunner;

    use crate::nodes::keys;
    use crate::nodes::testing::{ScriptedApprover, ScriptedGenerator};

    use super::*;

    #[test]
    fn test_agent_flow_wiring() {
        let flow = agent_flow(
            AgentKind::Doc,
            Arc::new(ScriptedGenerator::new(&[])),
            Arc::new(ScriptedApprover::new()),
            AgentOptions::default(),
        )
        .unwrap();

        assert_eq!(flow.start(), "context");
        assert_eq!(
            flow.node_ids(),
            vec!["agent", "approval", "context", "report", "safety"]
        );
        assert_eq!(flow.successor("safety", "approved"), Some("agent"));
        assert_eq!(flow.successor("safety", "denied"), Some("report"));
        // The agent's "done" label rides the default edge into review.
        assert_eq!(flow.successor("agent", "done"), Some("approval"));
        assert_eq!(flow.successor("approval", "refine"), Some("agent"));
        assert_eq!(flow.successor("approval", "approved"), Some("report"));
        // Report is terminal.
        assert_eq!(flow.successor("report", "done"), None);
    }

    #[test]
    fn test_chat_flow_wiring() {
        let flow = chat_flow(
            Arc::new(ScriptedGenerator::new(&[])),
            Arc::new(ScriptedApprover::new()),
            AgentOptions::default(),
        )
        .unwrap();

        assert_eq!(flow.start(), "intent");
        assert_eq!(flow.successor("intent", "file_management"), Some("files"));
        assert_eq!(flow.successor("intent", "general_question"), Some("answer"));
        assert_eq!(flow.successor("clarification", "default"), Some("intent"));
        assert_eq!(flow.successor("summary", "done"), Some("report"));
    }

    #[test]
    fn test_simple_flow_runs_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("mod.py");
        fs::write(&file, "def f():\n    pass\n").unwrap();

        let options = AgentOptions {
            file: Some(file),
            ..AgentOptions::default()
        };
        let flow = simple_flow(
            AgentKind::Summary,
            Arc::new(ScriptedGenerator::new(&["Does nothing."])),
            Arc::new(ScriptedApprover::new()),
            options,
        )
        .unwrap();

        let mut context = quillon_flow::SharedContext::new();
        let report = FlowRunner::new(flow).run(&mut context).unwrap();

        assert_eq!(report.path, vec!["context", "agent", "report"]);
        assert_eq!(report.final_label.as_str(), "done");
        assert_eq!(context.get_str(keys::RESULT), Some("Does nothing."));
    }

    #[test]
    fn test_agent_flow_refine_loop_reruns_the_agent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("mod.py");
        fs::write(&file, "def f():\n    pass\n").unwrap();

        let generator = Arc::new(ScriptedGenerator::new(&["First try.", "Second try."]));
        let approver = Arc::new(
            ScriptedApprover::new()
                .reviews(&[ApprovalDecision::Refine, ApprovalDecision::Approved]),
        );
        let options = AgentOptions {
            file: Some(file),
            ..AgentOptions::default()
        };
        let flow = agent_flow(AgentKind::Summary, generator, approver, options).unwrap();

        let mut context = quillon_flow::SharedContext::new();
        let report = FlowRunner::new(flow).run(&mut context).unwrap();

        assert_eq!(
            report.path,
            vec![
                "context", "safety", "agent", "approval", "agent", "approval", "report"
            ]
        );
        // The reviewed result is the second attempt.
        assert_eq!(context.get_str(keys::RESULT), Some("Second try."));
    }

    #[test]
    fn test_denied_safety_gate_skips_the_agent() {
        let generator = Arc::new(ScriptedGenerator::new(&[]));
        let approver = Arc::new(ScriptedApprover::new().confirms(&[false]));
        let options = AgentOptions {
            file: Some("demo.py".into()),
            output: quillon_core::types::OutputMode::InPlace,
            ..AgentOptions::default()
        };
        let flow = agent_flow(AgentKind::Refactor, generator, approver, options).unwrap();

        let mut context = quillon_flow::SharedContext::new();
        let report = FlowRunner::new(flow).run(&mut context).unwrap();

        assert_eq!(report.path, vec!["context", "safety", "report"]);
        assert_eq!(context.get_str(keys::SAFETY_DECISION), Some("denied"));
    }

    #[test]
    fn test_chat_turn_reaches_the_answer_node() {
        let generator = Arc::new(ScriptedGenerator::new(&[
            "general_question",
            "Closures capture their environment.",
        ]));
        let flow = chat_flow(
            generator,
            Arc::new(ScriptedApprover::new()),
            AgentOptions::default(),
        )
        .unwrap();

        let mut context = quillon_flow::SharedContext::new();
        context.set_str(keys::USER_INPUT, "what is a closure?");
        let report = FlowRunner::new(flow).run(&mut context).unwrap();

        assert_eq!(report.path, vec!["intent", "answer", "report"]);
        assert_eq!(
            context.get_str(keys::ANSWER),
            Some("Closures capture their environment.")
        );
    }

    #[test]
    fn test_orchestrator_flow_answers_directly() {
        let generator = Arc::new(ScriptedGenerator::new(&["Happy to help."]));
        let options = AgentOptions {
            instruction: Some("hello there".to_string()),
            ..AgentOptions::default()
        };
        let flow = orchestrator_flow(generator, Arc::new(ScriptedApprover::new()), options).unwrap();

        let mut context = quillon_flow::SharedContext::new();
        let report = FlowRunner::new(flow).run(&mut context).unwrap();

        assert_eq!(report.path, vec!["context", "orchestrator", "report"]);
        assert_eq!(context.get_str(keys::ANSWER), Some("Happy to help."));
    }
}
