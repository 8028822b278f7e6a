use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use quillon_core::error::Result;
use quillon_core::traits::Approver;
use quillon_flow::{Node, Outcome, SharedContext};

use super::keys;

/// Presents a context value for review and routes on the verdict.
///
/// The reviewed key defaults to the agent result; the verdict becomes the
/// outgoing label (`approved`, `refine` or `denied`), so the flow wiring
/// decides what a rejection means.
pub struct ApprovalNode {
    key: String,
    message: String,
    title: String,
    approver: Arc<dyn Approver>,
}

impl ApprovalNode {
    pub fn new(
        key: impl Into<String>,
        message: impl Into<String>,
        title: impl Into<String>,
        approver: Arc<dyn Approver>,
    ) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
            title: title.into(),
            approver,
        }
    }

    /// The standard post-agent review over the `result` key.
    pub fn result_review(approver: Arc<dyn Approver>) -> Self {
        Self::new(
            keys::RESULT,
            "Please review the generated result:",
            "Result Review",
            approver,
        )
    }
}

impl Node for ApprovalNode {
    fn prepare(&mut self, context: &mut SharedContext) -> Result<Value> {
        Ok(context
            .get(&self.key)
            .cloned()
            .unwrap_or_else(|| Value::String(String::new())))
    }

    fn execute(&mut self, prepared: &Value) -> Result<Value> {
        let content = match prepared {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let decision = self.approver.review(&self.title, &self.message, &content)?;
        Ok(json!(decision.as_str()))
    }

    fn finalize(
        &mut self,
        _context: &mut SharedContext,
        _prepared: Value,
        result: Value,
    ) -> Result<Outcome> {
        let verdict = result.as_str().unwrap_or("refine").to_string();
        debug!(key = %self.key, verdict = %verdict, "review finished");
        Ok(Outcome::from(verdict))
    }
}
