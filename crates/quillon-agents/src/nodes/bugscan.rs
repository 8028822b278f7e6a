use std::sync::Arc;

use serde_json::{json, Value};

use quillon_core::error::Result;
use quillon_core::traits::TextGenerator;
use quillon_flow::{Node, Outcome, SharedContext};

use crate::extract;
use crate::prompts;

use super::{keys, require_file, AgentOptions};

/// Scans the input file for bugs and prints a numbered report.
pub struct BugScanNode {
    generator: Arc<dyn TextGenerator>,
    options: AgentOptions,
}

impl BugScanNode {
    pub fn new(generator: Arc<dyn TextGenerator>, options: AgentOptions) -> Self {
        Self { generator, options }
    }
}

impl Node for BugScanNode {
    fn prepare(&mut self, context: &mut SharedContext) -> Result<Value> {
        let source = extract::read_source(require_file(&self.options)?)?;
        context.set_str(keys::SOURCE_CODE, &source);
        Ok(json!(source))
    }

    fn execute(&mut self, prepared: &Value) -> Result<Value> {
        let source = prepared.as_str().unwrap_or_default();
        let report = self
            .generator
            .generate(&prompts::bug_report_request(source))?;
        Ok(json!(report))
    }

    fn finalize(
        &mut self,
        context: &mut SharedContext,
        _prepared: Value,
        result: Value,
    ) -> Result<Outcome> {
        let report = result.as_str().unwrap_or_default();
        println!("\n=== Bug Report ===\n");
        println!("{}", report);
        context.set_str(keys::RESULT, report);
        Ok(Outcome::new("done"))
    }
}
