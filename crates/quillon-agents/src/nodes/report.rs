use serde_json::Value;
use tracing::debug;

use quillon_core::error::Result;
use quillon_flow::{Node, Outcome, SharedContext};

use super::keys;

/// Terminal node: prints a closing status line for the run.
///
/// A denied safety gate turns into an explicit "nothing was changed" line.
/// When the run produced an `answer` the caller delivers it, so this node
/// stays quiet apart from a debug log.
pub struct ReportNode {
    operation: String,
}

impl ReportNode {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }
}

impl Node for ReportNode {
    fn finalize(
        &mut self,
        context: &mut SharedContext,
        _prepared: Value,
        _result: Value,
    ) -> Result<Outcome> {
        if context.get_str(keys::SAFETY_DECISION) == Some("denied") {
            println!(
                "\nOperation '{}' was denied; no changes were made.",
                self.operation
            );
        } else if let Some(answer) = context.get_str(keys::ANSWER) {
            debug!(operation = %self.operation, chars = answer.len(), "run finished with an answer");
        } else {
            println!("\nOperation '{}' completed.", self.operation);
        }
        Ok(Outcome::new("done"))
    }
}
