use std::sync::Arc;

use serde_json::{json, Value};

use quillon_core::error::Result;
use quillon_core::traits::TextGenerator;
use quillon_flow::{Node, Outcome, SharedContext};

use crate::extract;
use crate::prompts;

use super::{keys, require_file, AgentOptions};

/// Produces a high-level summary of the input file on the console.
pub struct SummaryNode {
    generator: Arc<dyn TextGenerator>,
    options: AgentOptions,
}

impl SummaryNode {
    pub fn new(generator: Arc<dyn TextGenerator>, options: AgentOptions) -> Self {
        Self { generator, options }
    }
}

impl Node for SummaryNode {
    fn prepare(&mut self, context: &mut SharedContext) -> Result<Value> {
        let source = extract::read_source(require_file(&self.options)?)?;
        context.set_str(keys::SOURCE_CODE, &source);
        Ok(json!(source))
    }

    fn execute(&mut self, prepared: &Value) -> Result<Value> {
        let source = prepared.as_str().unwrap_or_default();
        let summary = self.generator.generate(&prompts::summary_request(source))?;
        Ok(json!(summary))
    }

    fn finalize(
        &mut self,
        context: &mut SharedContext,
        _prepared: Value,
        result: Value,
    ) -> Result<Outcome> {
        let summary = result.as_str().unwrap_or_default();
        println!("\n=== File Summary ===\n");
        println!("{}", summary);
        context.set_str(keys::RESULT, summary);
        Ok(Outcome::new("done"))
    }
}
