use std::sync::Arc;

use serde_json::{json, Value};

use quillon_core::error::Result;
use quillon_core::traits::TextGenerator;
use quillon_flow::{Node, Outcome, SharedContext};

use crate::extract;
use crate::output::OutputWriter;
use crate::prompts;

use super::{keys, require_file, AgentOptions};

/// Rewrites the whole file for readability and maintainability.
pub struct RefactorNode {
    generator: Arc<dyn TextGenerator>,
    writer: OutputWriter,
    options: AgentOptions,
}

impl RefactorNode {
    pub fn new(generator: Arc<dyn TextGenerator>, options: AgentOptions) -> Self {
        Self {
            generator,
            writer: OutputWriter::new(options.output),
            options,
        }
    }
}

impl Node for RefactorNode {
    fn prepare(&mut self, context: &mut SharedContext) -> Result<Value> {
        let source = extract::read_source(require_file(&self.options)?)?;
        context.set_str(keys::SOURCE_CODE, &source);
        Ok(json!(source))
    }

    fn execute(&mut self, prepared: &Value) -> Result<Value> {
        let source = prepared.as_str().unwrap_or_default();
        let refactored = self
            .generator
            .generate(&prompts::refactor_request(source))?;
        Ok(json!(refactored))
    }

    fn finalize(
        &mut self,
        context: &mut SharedContext,
        _prepared: Value,
        result: Value,
    ) -> Result<Outcome> {
        let refactored = result.as_str().unwrap_or_default();
        let file = require_file(&self.options)?.to_path_buf();
        self.writer
            .write(&file, refactored, "refactored", "Refactored Code")?;
        context.set_str(keys::RESULT, refactored);
        Ok(Outcome::new("done"))
    }
}
