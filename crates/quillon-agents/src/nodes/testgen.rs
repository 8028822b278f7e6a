use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use quillon_core::error::Result;
use quillon_core::traits::TextGenerator;
use quillon_core::types::FunctionRecord;
use quillon_flow::{Node, Outcome, SharedContext};

use crate::extract;
use crate::output::OutputWriter;
use crate::prompts;

use super::{keys, require_file, AgentOptions};

#[derive(Debug, Serialize, Deserialize)]
struct GeneratedTest {
    name: String,
    test_code: String,
}

/// Generates pytest-style unit tests for every function.
///
/// Console mode prints the tests per function; the file-writing modes
/// collect them into `test_<stem>.py` next to the source file.
pub struct TestGenNode {
    generator: Arc<dyn TextGenerator>,
    writer: OutputWriter,
    options: AgentOptions,
}

impl TestGenNode {
    pub fn new(generator: Arc<dyn TextGenerator>, options: AgentOptions) -> Self {
        Self {
            generator,
            writer: OutputWriter::new(options.output),
            options,
        }
    }
}

impl Node for TestGenNode {
    fn prepare(&mut self, context: &mut SharedContext) -> Result<Value> {
        let source = extract::read_source(require_file(&self.options)?)?;
        let functions = extract::extract_functions(&source)?;
        let value = serde_json::to_value(&functions)?;
        context.set(keys::FUNCTIONS, value.clone());
        Ok(value)
    }

    fn execute(&mut self, prepared: &Value) -> Result<Value> {
        let functions: Vec<FunctionRecord> = serde_json::from_value(prepared.clone())?;
        let mut tests = Vec::with_capacity(functions.len());
        for func in &functions {
            let test_code = self
                .generator
                .generate(&prompts::test_request(&func.source))?;
            tests.push(GeneratedTest {
                name: func.name.clone(),
                test_code,
            });
        }
        Ok(serde_json::to_value(tests)?)
    }

    fn finalize(
        &mut self,
        context: &mut SharedContext,
        _prepared: Value,
        result: Value,
    ) -> Result<Outcome> {
        let tests: Vec<GeneratedTest> = serde_json::from_value(result)?;
        let file = require_file(&self.options)?.to_path_buf();

        let rendered = if self.writer.mode().modifies_files() {
            tests
                .iter()
                .map(|t| format!("# Tests for {}\n{}\n", t.name, strip_code_fences(&t.test_code)))
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            tests
                .iter()
                .map(|t| {
                    format!(
                        "Function: {}\n{}\n{}",
                        t.name,
                        strip_code_fences(&t.test_code),
                        "-".repeat(40)
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        };

        self.writer.write_tests(&file, &rendered)?;
        context.set_str(keys::RESULT, &rendered);
        Ok(Outcome::new("done"))
    }
}

fn strip_code_fences(code: &str) -> String {
    let open = Regex::new(r"(?m)^```(?:python)?").unwrap();
    let stripped = open.replace_all(code, "");
    let close = Regex::new(r"(?m)```$").unwrap();
    close.replace_all(&stripped, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use quillon_core::types::OutputMode;

    use super::super::run_node_once;
    use super::super::testing::ScriptedGenerator;
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        let fenced = "```python\ndef test_add():\n    assert add(1, 2) == 3\n```";
        assert_eq!(
            strip_code_fences(fenced),
            "def test_add():\n    assert add(1, 2) == 3"
        );
        assert_eq!(strip_code_fences("plain"), "plain");
    }

    #[test]
    fn test_writes_test_file_with_per_function_headers() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("calc.py");
        fs::write(
            &file,
            "def add(a, b):\n    return a + b\n\ndef sub(a, b):\n    return a - b\n",
        )
        .unwrap();

        let generator = Arc::new(ScriptedGenerator::new(&[
            "```python\ndef test_add():\n    assert add(1, 1) == 2\n```",
            "def test_sub():\n    assert sub(1, 1) == 0",
        ]));
        let options = AgentOptions {
            file: Some(file),
            output: OutputMode::NewFile,
            ..AgentOptions::default()
        };
        let mut node = TestGenNode::new(generator, options);
        let mut context = SharedContext::new();

        let label = run_node_once(&mut node, &mut context).unwrap();

        assert_eq!(label.as_str(), "done");
        let written = fs::read_to_string(dir.path().join("test_calc.py")).unwrap();
        assert!(written.starts_with("# Tests for add\n"));
        assert!(written.contains("assert add(1, 1) == 2"));
        assert!(written.contains("# Tests for sub\n"));
        assert!(!written.contains("```"));
    }

    #[test]
    fn test_console_rendering_separates_functions() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("calc.py");
        fs::write(&file, "def add(a, b):\n    return a + b\n").unwrap();

        let generator =
            Arc::new(ScriptedGenerator::new(&["def test_add():\n    assert True"]));
        let options = AgentOptions {
            file: Some(file),
            ..AgentOptions::default()
        };
        let mut node = TestGenNode::new(generator, options);
        let mut context = SharedContext::new();

        run_node_once(&mut node, &mut context).unwrap();

        let rendered = context.get_str(keys::RESULT).unwrap();
        assert!(rendered.starts_with("Function: add\n"));
        assert!(rendered.contains(&"-".repeat(40)));
    }
}
