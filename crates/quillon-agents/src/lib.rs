//! Agent nodes, prebuilt flows and their supporting services: source
//! extraction, the prompt catalog, output delivery, interactive approval and
//! chat-session persistence.
//!
//! Everything model-facing goes through the `quillon-core` collaborator
//! traits, so the whole crate tests against scripted stand-ins and the CLI
//! decides which real client to inject.

pub mod approval;
pub mod docstring;
pub mod extract;
pub mod flows;
pub mod nodes;
pub mod output;
pub mod prompts;
pub mod session;

pub use approval::{AutoApprover, ConsoleApprover};
pub use flows::{agent_flow, chat_flow, orchestrator_flow, simple_flow};
pub use nodes::{keys, AgentOptions};
pub use output::OutputWriter;
pub use session::{SessionRecord, SessionStore};
