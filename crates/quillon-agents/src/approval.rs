use dialoguer::{Confirm, Input};

use quillon_core::error::{QuillonError, Result};
use quillon_core::traits::Approver;
use quillon_core::types::ApprovalDecision;

/// Interactive approver backed by terminal prompts.
pub struct ConsoleApprover;

impl Approver for ConsoleApprover {
    fn confirm(&self, message: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(message)
            .default(false)
            .interact()
            .map_err(|e| QuillonError::Prompt(e.to_string()))
    }

    fn review(&self, title: &str, message: &str, content: &str) -> Result<ApprovalDecision> {
        println!("\n=== {} ===\n", title);
        println!("{}", message);
        println!("{}", content);
        let good = Confirm::new()
            .with_prompt("Is this result good?")
            .default(true)
            .interact()
            .map_err(|e| QuillonError::Prompt(e.to_string()))?;
        Ok(if good {
            ApprovalDecision::Approved
        } else {
            ApprovalDecision::Refine
        })
    }

    fn ask(&self, prompt: &str) -> Result<String> {
        Input::<String>::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| QuillonError::Prompt(e.to_string()))
    }
}

/// Non-interactive approver: waves everything through and cannot ask
/// follow-up questions. Used with `--no-confirm` and in scripted runs.
pub struct AutoApprover;

impl Approver for AutoApprover {
    fn confirm(&self, _message: &str) -> Result<bool> {
        Ok(true)
    }

    fn review(&self, _title: &str, _message: &str, _content: &str) -> Result<ApprovalDecision> {
        Ok(ApprovalDecision::Approved)
    }

    fn ask(&self, prompt: &str) -> Result<String> {
        Err(QuillonError::Prompt(format!(
            "cannot answer '{}' without an interactive terminal",
            prompt
        )))
    }
}
