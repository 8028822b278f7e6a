use serde_json::{json, Value};

use quillon_core::error::Result;
use quillon_core::types::AgentKind;
use quillon_flow::{Node, SharedContext};

use super::{keys, AgentOptions};

/// Stages the run inputs into the shared context before any agent work.
///
/// Later nodes and the final report read the snapshot instead of carrying
/// their own copies of the invocation arguments.
pub struct ContextNode {
    kind: AgentKind,
    options: AgentOptions,
}

impl ContextNode {
    pub fn new(kind: AgentKind, options: AgentOptions) -> Self {
        Self { kind, options }
    }
}

impl Node for ContextNode {
    fn prepare(&mut self, context: &mut SharedContext) -> Result<Value> {
        let cwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let run = json!({
            "agent": self.kind.as_str(),
            "file": self.options.file.as_ref().map(|p| p.display().to_string()),
            "output": self.options.output.as_str(),
            "instruction": self.options.instruction,
            "cwd": cwd,
        });
        context.set(keys::RUN, run.clone());
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use quillon_core::types::OutputMode;

    use super::super::run_node_once;
    use super::*;

    #[test]
    fn test_snapshots_run_inputs() {
        let options = AgentOptions {
            file: Some("src/demo.py".into()),
            output: OutputMode::NewFile,
            ..AgentOptions::default()
        };
        let mut node = ContextNode::new(AgentKind::Doc, options);
        let mut context = SharedContext::new();

        let label = run_node_once(&mut node, &mut context).unwrap();

        assert!(label.is_default());
        let run = context.get(keys::RUN).unwrap();
        assert_eq!(run["agent"], json!("doc"));
        assert_eq!(run["file"], json!("src/demo.py"));
        assert_eq!(run["output"], json!("new-file"));
        assert_eq!(run["instruction"], json!(null));
    }
}
