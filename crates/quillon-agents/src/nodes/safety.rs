use std::sync::Arc;

use serde_json::{json, Value};
use tracing::warn;

use quillon_core::error::Result;
use quillon_core::traits::Approver;
use quillon_flow::{Node, Outcome, SharedContext};

use super::{keys, AgentOptions};

/// Confirmation gate in front of file-modifying runs.
///
/// Console-only runs and auto-confirmed runs pass straight through;
/// everything else asks the approver once before any file is touched. The
/// decision lands in the context under `safety_decision` and doubles as the
/// routing label.
pub struct SafetyGateNode {
    operation: String,
    options: AgentOptions,
    approver: Arc<dyn Approver>,
}

impl SafetyGateNode {
    pub fn new(
        operation: impl Into<String>,
        options: AgentOptions,
        approver: Arc<dyn Approver>,
    ) -> Self {
        Self {
            operation: operation.into(),
            options,
            approver,
        }
    }
}

impl Node for SafetyGateNode {
    fn prepare(&mut self, _context: &mut SharedContext) -> Result<Value> {
        Ok(json!({
            "operation": self.operation,
            "output": self.options.output.as_str(),
            "file": self.options.file.as_ref().map(|p| p.display().to_string()),
        }))
    }

    fn execute(&mut self, _prepared: &Value) -> Result<Value> {
        if !self.options.output.modifies_files() || self.options.no_confirm {
            return Ok(json!("approved"));
        }

        let file = self
            .options
            .file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "the input file".to_string());
        let message = format!(
            "The {} run will modify {} ({} mode). Proceed?",
            self.operation, file, self.options.output
        );
        let approved = self.approver.confirm(&message)?;
        Ok(json!(if approved { "approved" } else { "denied" }))
    }

    fn finalize(
        &mut self,
        context: &mut SharedContext,
        _prepared: Value,
        result: Value,
    ) -> Result<Outcome> {
        let decision = result.as_str().unwrap_or("denied").to_string();
        context.set_str(keys::SAFETY_DECISION, &decision);
        if decision == "denied" {
            warn!(operation = %self.operation, "run stopped at the safety gate");
        }
        Ok(Outcome::from(decision))
    }
}
