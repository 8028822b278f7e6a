use std::sync::Arc;

use serde_json::{json, Value};
use tracing::info;

use quillon_core::error::{QuillonError, Result};
use quillon_core::traits::{Approver, TextGenerator};
use quillon_core::types::AgentKind;
use quillon_flow::{Node, Outcome, SharedContext};

use crate::prompts;

use super::{agent_node, keys, run_node_once, AgentOptions};

const FALLBACK_ANSWER: &str =
    "I'm sorry, I didn't understand that. Please rephrase your question or instruction.";

/// Maps a natural-language instruction to a plan of agent runs.
///
/// The model either returns a JSON array of agent names, which are run in
/// order over scratch contexts, or answers the instruction directly. Either
/// way the combined report lands under `answer`.
pub struct OrchestratorNode {
    generator: Arc<dyn TextGenerator>,
    approver: Arc<dyn Approver>,
    options: AgentOptions,
}

impl OrchestratorNode {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        approver: Arc<dyn Approver>,
        options: AgentOptions,
    ) -> Self {
        Self {
            generator,
            approver,
            options,
        }
    }

    fn run_plan(&self, plan: &[Value]) -> String {
        let names: Vec<String> = plan
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();

        let mut valid = Vec::new();
        let mut invalid = Vec::new();
        for name in &names {
            match AgentKind::parse(name) {
                Some(kind) if kind != AgentKind::Orchestrator => valid.push(kind),
                _ => invalid.push(name.clone()),
            }
        }

        // A plan with nothing runnable reads like prose the model failed to
        // format; hand it back as the answer.
        if valid.is_empty() && !invalid.is_empty() {
            return names.join(" ");
        }

        let mut lines = Vec::new();
        if !invalid.is_empty() {
            lines.push(format!(
                "Warning: the following actions are not supported and will be ignored: {}",
                invalid.join(", ")
            ));
        }

        if self.options.file.is_none() && !valid.is_empty() {
            lines.push(
                "This action requires a file. Please provide one with --file or upload it."
                    .to_string(),
            );
            return lines.join("\n");
        }

        for kind in valid {
            info!(agent = %kind, "orchestrator running planned agent");
            let mut node = agent_node(
                kind,
                self.generator.clone(),
                self.approver.clone(),
                self.options.clone(),
            );
            let mut scratch = SharedContext::new();
            match run_node_once(node.as_mut(), &mut scratch) {
                Ok(_) => lines.push(format!("Agent '{}' completed.", kind)),
                Err(e) => lines.push(format!("Agent '{}' failed: {}", kind, e)),
            }
        }

        if lines.is_empty() {
            return "All requested agent actions completed.".to_string();
        }
        lines.join("\n")
    }
}

impl Node for OrchestratorNode {
    fn prepare(&mut self, context: &mut SharedContext) -> Result<Value> {
        let instruction = self
            .options
            .instruction
            .clone()
            .or_else(|| context.get_str(keys::INSTRUCTION).map(str::to_string))
            .ok_or_else(|| {
                QuillonError::Preparation(
                    "No instruction provided for the orchestrator.".to_string(),
                )
            })?;
        context.set_str(keys::INSTRUCTION, &instruction);
        Ok(json!(instruction))
    }

    fn execute(&mut self, prepared: &Value) -> Result<Value> {
        let instruction = prepared.as_str().unwrap_or_default();
        let raw = self.generator.generate(&prompts::plan_request(instruction))?;
        Ok(parse_plan(&raw))
    }

    fn finalize(
        &mut self,
        context: &mut SharedContext,
        _prepared: Value,
        result: Value,
    ) -> Result<Outcome> {
        let answer = if let Some(plan) = result.get("plan").and_then(Value::as_array) {
            self.run_plan(plan)
        } else {
            let text = result
                .get("answer")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim()
                .to_string();
            if text.is_empty() {
                FALLBACK_ANSWER.to_string()
            } else {
                text
            }
        };

        context.set_str(keys::ANSWER, &answer);
        Ok(Outcome::new("done"))
    }
}

/// Tag the raw plan output: a JSON array of names becomes a plan, anything
/// else a direct answer.
fn parse_plan(raw: &str) -> Value {
    let trimmed = raw.trim().trim_start_matches("```json").trim_matches('`').trim();
    if let Ok(plan) = serde_json::from_str::<Vec<String>>(trimmed) {
        return json!({ "plan": plan });
    }
    json!({ "answer": raw.trim() })
}
