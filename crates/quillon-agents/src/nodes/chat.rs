//! Nodes behind the chat REPL: intent classification and the per-intent
//! handlers that do not reuse a full agent node.

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use quillon_core::error::{QuillonError, Result};
use quillon_core::traits::{Approver, TextGenerator};
use quillon_core::types::ChatTurn;
use quillon_flow::{Node, Outcome, SharedContext};

use crate::prompts;

use super::keys;

const INTENTS: [&str; 5] = [
    "clarification",
    "file_management",
    "code_generation",
    "code_analysis",
    "general_question",
];

fn history(context: &SharedContext) -> Vec<ChatTurn> {
    context
        .get(keys::HISTORY)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

/// Classifies the user's message and routes the turn by intent label.
pub struct IntentNode {
    generator: Arc<dyn TextGenerator>,
}

impl IntentNode {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

impl Node for IntentNode {
    fn prepare(&mut self, context: &mut SharedContext) -> Result<Value> {
        let input = context.get_str(keys::USER_INPUT).ok_or_else(|| {
            QuillonError::Preparation("No user input to classify.".to_string())
        })?;
        Ok(json!({ "input": input, "history": history(context) }))
    }

    fn execute(&mut self, prepared: &Value) -> Result<Value> {
        let input = prepared["input"].as_str().unwrap_or_default();
        let turns: Vec<ChatTurn> =
            serde_json::from_value(prepared["history"].clone()).unwrap_or_default();

        let raw = self
            .generator
            .generate(&prompts::intent_request(input, &turns))?;
        let normalized = raw.trim().to_lowercase();
        let intent = if INTENTS.contains(&normalized.as_str()) {
            normalized
        } else {
            // Anything the classifier mangles is handled as a plain question.
            "general_question".to_string()
        };
        Ok(json!(intent))
    }

    fn finalize(
        &mut self,
        context: &mut SharedContext,
        _prepared: Value,
        result: Value,
    ) -> Result<Outcome> {
        let intent = result.as_str().unwrap_or("general_question").to_string();
        context.set_str(keys::INTENT, &intent);
        debug!(intent = %intent, "classified chat message");
        Ok(Outcome::from(intent))
    }
}

/// Asks the user to restate their request, then loops back to the intent
/// classifier with the new input.
pub struct ClarificationNode {
    prompt: String,
    approver: Arc<dyn Approver>,
}

impl ClarificationNode {
    pub fn new(prompt: impl Into<String>, approver: Arc<dyn Approver>) -> Self {
        Self {
            prompt: prompt.into(),
            approver,
        }
    }
}

impl Node for ClarificationNode {
    fn execute(&mut self, _prepared: &Value) -> Result<Value> {
        let answer = self.approver.ask(&self.prompt)?;
        Ok(json!(answer))
    }

    fn finalize(
        &mut self,
        context: &mut SharedContext,
        _prepared: Value,
        result: Value,
    ) -> Result<Outcome> {
        context.set_str(keys::USER_INPUT, result.as_str().unwrap_or_default());
        Ok(Outcome::default())
    }
}

#[derive(Debug, Deserialize)]
struct FileOp {
    op: String,
    #[serde(default)]
    path: String,
}

/// Answers list/read file requests rooted at the working directory.
pub struct FileManagementNode {
    generator: Arc<dyn TextGenerator>,
}

impl FileManagementNode {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

impl Node for FileManagementNode {
    fn prepare(&mut self, context: &mut SharedContext) -> Result<Value> {
        let input = context.get_str(keys::USER_INPUT).ok_or_else(|| {
            QuillonError::Preparation("No user input for the file operation.".to_string())
        })?;
        Ok(json!(input))
    }

    fn execute(&mut self, prepared: &Value) -> Result<Value> {
        let input = prepared.as_str().unwrap_or_default();
        let raw = self.generator.generate(&prompts::file_op_request(input))?;
        let op: FileOp = serde_json::from_str(raw.trim()).map_err(|e| {
            QuillonError::LlmParse(format!("file operation was not valid JSON: {}", e))
        })?;
        Ok(json!(perform(&op)?))
    }

    fn finalize(
        &mut self,
        context: &mut SharedContext,
        _prepared: Value,
        result: Value,
    ) -> Result<Outcome> {
        context.set_str(keys::ANSWER, result.as_str().unwrap_or_default());
        Ok(Outcome::default())
    }
}

fn perform(op: &FileOp) -> Result<String> {
    if op.path.starts_with('/') || op.path.split('/').any(|part| part == "..") {
        return Ok("Only paths inside the working directory are supported.".to_string());
    }
    match op.op.as_str() {
        "list" => {
            let dir = if op.path.is_empty() { "." } else { &op.path };
            list_dir(Path::new(dir))
        }
        "read" => read_file(Path::new(&op.path)),
        other => Ok(format!(
            "Unsupported file operation '{}'. I can list files or read a file.",
            other
        )),
    }
}

fn list_dir(dir: &Path) -> Result<String> {
    if !dir.is_dir() {
        return Ok(format!("Directory not found: {}", dir.display()));
    }
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if entry.path().is_dir() {
            dirs.push(format!("📁 {}", name));
        } else if name.ends_with(".py") {
            files.push(format!("📄 {}", name));
        }
    }
    dirs.sort();
    files.sort();

    let mut lines = vec![format!("Files in {}:", dir.display())];
    lines.extend(dirs);
    lines.extend(files);
    if lines.len() == 1 {
        lines.push("(no Python files)".to_string());
    }
    Ok(lines.join("\n"))
}

fn read_file(path: &Path) -> Result<String> {
    if path.as_os_str().is_empty() {
        return Ok("Which file should I read?".to_string());
    }
    if !path.is_file() {
        return Ok(format!("File not found: {}", path.display()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(format!("Contents of {}:\n\n{}", path.display(), content))
}

/// Plain single-turn answer over the user input and recent history.
pub struct GeneralAnswerNode {
    generator: Arc<dyn TextGenerator>,
}

impl GeneralAnswerNode {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

impl Node for GeneralAnswerNode {
    fn prepare(&mut self, context: &mut SharedContext) -> Result<Value> {
        let input = context.get_str(keys::USER_INPUT).ok_or_else(|| {
            QuillonError::Preparation("No user input to answer.".to_string())
        })?;
        Ok(json!({ "input": input, "history": history(context) }))
    }

    fn execute(&mut self, prepared: &Value) -> Result<Value> {
        let input = prepared["input"].as_str().unwrap_or_default();
        let turns: Vec<ChatTurn> =
            serde_json::from_value(prepared["history"].clone()).unwrap_or_default();
        let answer = self
            .generator
            .generate(&prompts::chat_answer_request(input, &turns))?;
        Ok(json!(answer))
    }

    fn finalize(
        &mut self,
        context: &mut SharedContext,
        _prepared: Value,
        result: Value,
    ) -> Result<Outcome> {
        context.set_str(keys::ANSWER, result.as_str().unwrap_or_default());
        Ok(Outcome::default())
    }
}
