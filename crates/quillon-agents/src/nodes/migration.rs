use std::sync::Arc;

use serde_json::{json, Value};

use quillon_core::error::Result;
use quillon_core::traits::TextGenerator;
use quillon_flow::{Node, Outcome, SharedContext};

use crate::extract;
use crate::output::OutputWriter;
use crate::prompts;

use super::{keys, require_file, AgentOptions};

/// Rewrites the whole file for the configured migration target.
pub struct MigrationNode {
    generator: Arc<dyn TextGenerator>,
    writer: OutputWriter,
    options: AgentOptions,
}

impl MigrationNode {
    pub fn new(generator: Arc<dyn TextGenerator>, options: AgentOptions) -> Self {
        Self {
            generator,
            writer: OutputWriter::new(options.output),
            options,
        }
    }
}

impl Node for MigrationNode {
    fn prepare(&mut self, context: &mut SharedContext) -> Result<Value> {
        let source = extract::read_source(require_file(&self.options)?)?;
        context.set_str(keys::SOURCE_CODE, &source);
        Ok(json!(source))
    }

    fn execute(&mut self, prepared: &Value) -> Result<Value> {
        let source = prepared.as_str().unwrap_or_default();
        let migrated = self
            .generator
            .generate(&prompts::migration_request(source, &self.options.migration_target))?;
        Ok(json!(migrated))
    }

    fn finalize(
        &mut self,
        context: &mut SharedContext,
        _prepared: Value,
        result: Value,
    ) -> Result<Outcome> {
        let migrated = result.as_str().unwrap_or_default();
        let file = require_file(&self.options)?.to_path_buf();
        self.writer
            .write(&file, migrated, "migrated", "Migrated Code")?;
        context.set_str(keys::RESULT, migrated);
        Ok(Outcome::new("done"))
    }
}
