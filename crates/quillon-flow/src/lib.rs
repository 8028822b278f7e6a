//! Synchronous workflow engine: nodes, labeled edges, and a step runner.
//!
//! A [`Flow`] is a directed graph of [`Node`] implementations keyed by string
//! ids, with edges keyed by outcome label. The [`FlowRunner`] visits one node
//! at a time on the calling thread, running the prepare, execute, finalize
//! lifecycle at each step and routing on the finalize label: exact match
//! first, then the node's default edge, and a clean finish when neither
//! exists. All cross-node state lives in a [`SharedContext`] that the runner
//! threads through every visit.

pub mod context;
pub mod graph;
pub mod node;
pub mod runner;
pub mod viz;

pub use context::SharedContext;
pub use graph::{Flow, FlowBuilder};
pub use node::{Node, Outcome, DEFAULT_LABEL};
pub use runner::{FlowRunner, RunReport, RunState};
