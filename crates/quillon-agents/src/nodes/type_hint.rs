use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use quillon_core::error::Result;
use quillon_core::traits::TextGenerator;
use quillon_core::types::FunctionRecord;
use quillon_flow::{Node, Outcome, SharedContext};

use crate::extract;
use crate::prompts;

use super::{keys, require_file, AgentOptions};

#[derive(Debug, Serialize, Deserialize)]
struct TypeSuggestion {
    name: String,
    suggestion: String,
}

/// Suggests type annotations for every function, printed per function.
pub struct TypeHintNode {
    generator: Arc<dyn TextGenerator>,
    options: AgentOptions,
}

impl TypeHintNode {
    pub fn new(generator: Arc<dyn TextGenerator>, options: AgentOptions) -> Self {
        Self { generator, options }
    }
}

impl Node for TypeHintNode {
    fn prepare(&mut self, context: &mut SharedContext) -> Result<Value> {
        let source = extract::read_source(require_file(&self.options)?)?;
        let functions = extract::extract_functions(&source)?;
        let value = serde_json::to_value(&functions)?;
        context.set(keys::FUNCTIONS, value.clone());
        Ok(value)
    }

    fn execute(&mut self, prepared: &Value) -> Result<Value> {
        let functions: Vec<FunctionRecord> = serde_json::from_value(prepared.clone())?;
        let mut suggestions = Vec::with_capacity(functions.len());
        for func in &functions {
            let suggestion = self
                .generator
                .generate(&prompts::type_hint_request(&func.source))?;
            suggestions.push(TypeSuggestion {
                name: func.name.clone(),
                suggestion,
            });
        }
        Ok(serde_json::to_value(suggestions)?)
    }

    fn finalize(
        &mut self,
        context: &mut SharedContext,
        _prepared: Value,
        result: Value,
    ) -> Result<Outcome> {
        let suggestions: Vec<TypeSuggestion> = serde_json::from_value(result)?;

        println!("\n=== Type Annotation Suggestions ===\n");
        let mut rendered = String::new();
        for item in &suggestions {
            println!("Function: {}", item.name);
            println!("{}", item.suggestion);
            println!("{}", "-".repeat(40));
            rendered.push_str(&format!("Function: {}\n{}\n\n", item.name, item.suggestion));
        }
        context.set_str(keys::RESULT, rendered.trim_end());
        Ok(Outcome::new("done"))
    }
}
