use std::collections::HashMap;

use tracing::warn;

use quillon_core::{QuillonError, Result};

use super::node::{Node, DEFAULT_LABEL};

/// An immutable flow graph: a node registry, a label-keyed edge table, and a
/// start node. Built once by [`FlowBuilder`]; never rewired afterwards.
pub struct Flow {
    nodes: HashMap<String, Box<dyn Node>>,
    edges: HashMap<String, HashMap<String, String>>,
    start: String,
}

impl Flow {
    pub fn builder() -> FlowBuilder {
        FlowBuilder::new()
    }

    /// Id of the start node.
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Registered node ids, sorted for deterministic iteration.
    pub fn node_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Outgoing edges of a node as a label-to-successor map.
    pub fn edges_from(&self, node: &str) -> Option<&HashMap<String, String>> {
        self.edges.get(node)
    }

    /// The outcome router: exact label match wins, else the default edge,
    /// else none. No label normalization.
    pub fn successor(&self, node: &str, label: &str) -> Option<&str> {
        let outgoing = self.edges.get(node)?;
        outgoing
            .get(label)
            .or_else(|| outgoing.get(DEFAULT_LABEL))
            .map(String::as_str)
    }

    pub(crate) fn node_mut(&mut self, id: &str) -> Option<&mut Box<dyn Node>> {
        self.nodes.get_mut(id)
    }
}

impl std::fmt::Debug for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Flow")
            .field("start", &self.start)
            .field("nodes", &self.node_ids())
            .field("edges", &self.edges)
            .finish()
    }
}

/// Builder for [`Flow`]. Nodes are registered under string ids; edges are
/// declared as `(from, label, to)` triples in any order.
///
/// Duplicate `(from, label)` declarations keep the last write and log a
/// warning at wiring time. `build()` rejects a missing or unregistered start
/// node and edges whose endpoints are not registered.
pub struct FlowBuilder {
    nodes: HashMap<String, Box<dyn Node>>,
    edges: HashMap<String, HashMap<String, String>>,
    start: Option<String>,
}

impl FlowBuilder {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            start: None,
        }
    }

    /// Register a node under an id. Re-registering an id replaces the node.
    pub fn node(mut self, id: impl Into<String>, node: impl Node + 'static) -> Self {
        let id = id.into();
        if self.nodes.insert(id.clone(), Box::new(node)).is_some() {
            warn!(node = %id, "node id re-registered, earlier node replaced");
        }
        self
    }

    /// Declare an edge: from `from`, along `label`, to `to`.
    pub fn edge(
        mut self,
        from: impl Into<String>,
        label: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        let from = from.into();
        let label = label.into();
        let to = to.into();
        let outgoing = self.edges.entry(from.clone()).or_default();
        if let Some(previous) = outgoing.insert(label.clone(), to.clone()) {
            warn!(
                node = %from,
                label = %label,
                previous = %previous,
                replacement = %to,
                "duplicate edge label, last write wins"
            );
        }
        self
    }

    /// Declare a default edge, taken when no exact label matches.
    pub fn default_edge(self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.edge(from, DEFAULT_LABEL, to)
    }

    /// Designate the start node.
    pub fn start(mut self, id: impl Into<String>) -> Self {
        self.start = Some(id.into());
        self
    }

    /// Validate the wiring and produce the immutable flow.
    pub fn build(self) -> Result<Flow> {
        let start = self
            .start
            .ok_or_else(|| QuillonError::Configuration("no start node designated".to_string()))?;

        if !self.nodes.contains_key(&start) {
            return Err(QuillonError::Configuration(format!(
                "start node '{}' is not registered",
                start
            )));
        }

        for (from, outgoing) in &self.edges {
            if !self.nodes.contains_key(from) {
                return Err(QuillonError::Configuration(format!(
                    "edge source '{}' is not a registered node",
                    from
                )));
            }
            for (label, to) in outgoing {
                if !self.nodes.contains_key(to) {
                    return Err(QuillonError::Configuration(format!(
                        "edge '{}' -[{}]-> '{}' points at an unregistered node",
                        from, label, to
                    )));
                }
            }
        }

        Ok(Flow {
            nodes: self.nodes,
            edges: self.edges,
            start,
        })
    }
}

impl Default for FlowBuilder {
    fn default() -> Self {
        Self::new()
    }
}
