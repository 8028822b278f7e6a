use serde_json::Value;
use tracing::{debug, error, info};

use quillon_core::{QuillonError, Result};

use super::context::SharedContext;
use super::graph::Flow;
use super::node::Outcome;

/// Runner state: either about to visit a node, or done. Nothing else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunState {
    Running(String),
    Finished,
}

/// Summary of a finished run.
///
/// The value of a run is the last `execute` result (`final_result`); the
/// last finalize label rides along for callers that branch on it.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Number of node visits.
    pub steps: usize,
    /// Node ids in visit order.
    pub path: Vec<String>,
    /// Label returned by the last finalize phase.
    pub final_label: Outcome,
    /// Result returned by the last execute phase.
    pub final_result: Value,
}

/// Drives a flow: visits one node at a time, strictly in traversal order,
/// on the calling thread.
///
/// Each step runs the three-phase lifecycle, then resolves the next node
/// through the flow's edge table (exact label, else default edge). A label
/// with no matching edge finishes the run cleanly. Phase errors propagate
/// verbatim to the caller; whatever the context holds at that point stays.
pub struct FlowRunner {
    flow: Flow,
    step_limit: Option<usize>,
}

impl FlowRunner {
    pub fn new(flow: Flow) -> Self {
        Self {
            flow,
            step_limit: None,
        }
    }

    /// Cap the number of node visits per run.
    ///
    /// Runs are unbounded by default, cycles included; an unconditional
    /// self-loop is a graph bug the engine does not guard against. Callers
    /// that want a guard set a ceiling here; exceeding it aborts the run
    /// with [`QuillonError::StepLimitExceeded`].
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = Some(limit);
        self
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }

    /// Run the flow over the given context until no edge matches.
    pub fn run(&mut self, context: &mut SharedContext) -> Result<RunReport> {
        let mut state = RunState::Running(self.flow.start().to_string());
        let mut steps = 0usize;
        let mut path = Vec::new();
        let mut final_label = Outcome::default();
        let mut final_result = Value::Null;

        while let RunState::Running(current) = state {
            if let Some(limit) = self.step_limit {
                if steps >= limit {
                    error!(node = %current, limit, "step limit reached, aborting flow");
                    return Err(QuillonError::StepLimitExceeded(limit));
                }
            }
            steps += 1;
            path.push(current.clone());
            info!(node = %current, step = steps, "visiting flow node");

            let node = self.flow.node_mut(&current).ok_or_else(|| {
                QuillonError::Configuration(format!("node '{}' missing from registry", current))
            })?;

            let prepared = node.prepare(context)?;
            let result = node.execute(&prepared)?;
            final_result = result.clone();
            let label = node.finalize(context, prepared, result)?;
            debug!(node = %current, label = %label, "node finalized");

            state = match self.flow.successor(&current, label.as_str()) {
                Some(next) => RunState::Running(next.to_string()),
                None => {
                    debug!(node = %current, label = %label, "no matching edge, flow finished");
                    RunState::Finished
                }
            };
            final_label = label;
        }

        Ok(RunReport {
            steps,
            path,
            final_label,
            final_result,
        })
    }
}
