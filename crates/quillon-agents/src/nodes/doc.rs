use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use quillon_core::error::{QuillonError, Result};
use quillon_core::traits::{Approver, TextGenerator};
use quillon_core::types::FunctionRecord;
use quillon_flow::{Node, Outcome, SharedContext};

use crate::docstring::{apply_docstrings, clean_docstring};
use crate::extract;
use crate::output::OutputWriter;
use crate::prompts;

use super::{keys, require_file, AgentOptions};

/// Generates a Google-style docstring for every function in the input file.
///
/// Console mode prints each function next to its generated docstring; the
/// file-writing modes splice the docstrings into the source, asking for
/// per-function confirmation unless confirmations are disabled.
pub struct DocNode {
    generator: Arc<dyn TextGenerator>,
    approver: Arc<dyn Approver>,
    writer: OutputWriter,
    options: AgentOptions,
}

impl DocNode {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        approver: Arc<dyn Approver>,
        options: AgentOptions,
    ) -> Self {
        Self {
            generator,
            approver,
            writer: OutputWriter::new(options.output),
            options,
        }
    }
}

impl Node for DocNode {
    fn prepare(&mut self, context: &mut SharedContext) -> Result<Value> {
        let file = require_file(&self.options)?;
        let source = extract::read_source(file)?;
        let functions = extract::extract_functions(&source)?;

        let value = serde_json::to_value(&functions)?;
        context.set(keys::FUNCTIONS, value.clone());
        context.set_str(keys::SOURCE_CODE, &source);
        Ok(value)
    }

    fn execute(&mut self, prepared: &Value) -> Result<Value> {
        let functions: Vec<FunctionRecord> = serde_json::from_value(prepared.clone())?;
        let mut docstrings = Vec::with_capacity(functions.len());
        for func in &functions {
            debug!(function = %func.name, "generating docstring");
            let doc = self
                .generator
                .generate(&prompts::docstring_request(&func.source))?;
            docstrings.push(doc);
        }
        Ok(serde_json::to_value(docstrings)?)
    }

    fn finalize(
        &mut self,
        context: &mut SharedContext,
        prepared: Value,
        result: Value,
    ) -> Result<Outcome> {
        let functions: Vec<FunctionRecord> = serde_json::from_value(prepared)?;
        let docstrings: Vec<String> = serde_json::from_value(result)?;

        if !self.writer.mode().modifies_files() {
            let mut rendered = String::new();
            for (func, doc) in functions.iter().zip(docstrings.iter()) {
                let clean = clean_docstring(doc);
                println!("\nFunction: {}\n{}", func.name, "-".repeat(40));
                println!("{}", func.source);
                println!("\nGenerated docstring:\n{}\n", clean);
                rendered.push_str(&format!("{}:\n{}\n\n", func.name, clean));
            }
            context.set_str(keys::RESULT, rendered.trim_end());
            return Ok(Outcome::new("done"));
        }

        let source = context
            .get_str(keys::SOURCE_CODE)
            .map(str::to_string)
            .ok_or_else(|| {
                QuillonError::Execution("source code missing from the shared context".to_string())
            })?;
        let file = require_file(&self.options)?.to_path_buf();

        let approver = self.approver.clone();
        let no_confirm = self.options.no_confirm;
        let updated = apply_docstrings(&source, &functions, &docstrings, |name| {
            if no_confirm {
                return Ok(true);
            }
            approver.confirm(&format!("Insert the generated docstring into '{}'?", name))
        })?;

        self.writer
            .write(&file, &updated, "documented", "Documented File")?;
        context.set_str(keys::RESULT, &updated);
        Ok(Outcome::new("done"))
    }
}
