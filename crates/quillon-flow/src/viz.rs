use std::collections::HashSet;

use super::graph::Flow;
use super::node::DEFAULT_LABEL;

/// Render a flow as a Mermaid `flowchart TD` diagram.
///
/// The walk is rooted at the start node and visits edge labels in sorted
/// order, so the output is stable for a given flow. Nodes the start cannot
/// reach do not appear.
pub fn mermaid(flow: &Flow) -> String {
    let mut lines = vec!["flowchart TD".to_string()];
    let mut visited = HashSet::new();
    walk(flow, flow.start(), &mut visited, &mut lines);
    lines.join("\n")
}

fn walk(flow: &Flow, id: &str, visited: &mut HashSet<String>, lines: &mut Vec<String>) {
    if !visited.insert(id.to_string()) {
        return;
    }
    lines.push(format!("    {}[\"{}\"]", id, id));

    let outgoing = match flow.edges_from(id) {
        Some(map) => map,
        None => return,
    };
    let mut labels: Vec<&str> = outgoing.keys().map(String::as_str).collect();
    labels.sort_unstable();

    for label in labels {
        let target = &outgoing[label];
        if label == DEFAULT_LABEL {
            lines.push(format!("    {} --> {}", id, target));
        } else {
            lines.push(format!("    {} -->|{}| {}", id, label, target));
        }
        walk(flow, target, visited, lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    struct Inert;
    impl Node for Inert {}

    #[test]
    fn test_labeled_and_default_edges() {
        let flow = Flow::builder()
            .node("review", Inert)
            .node("apply", Inert)
            .node("report", Inert)
            .edge("review", "approved", "apply")
            .default_edge("review", "report")
            .start("review")
            .build()
            .unwrap();

        let expected = "\
flowchart TD
    review[\"review\"]
    review -->|approved| apply
    apply[\"apply\"]
    review --> report
    report[\"report\"]";
        assert_eq!(mermaid(&flow), expected);
    }

    #[test]
    fn test_self_loop_rendered_once() {
        let flow = Flow::builder()
            .node("agent", Inert)
            .node("done", Inert)
            .edge("agent", "refine", "agent")
            .edge("agent", "approved", "done")
            .start("agent")
            .build()
            .unwrap();

        let expected = "\
flowchart TD
    agent[\"agent\"]
    agent -->|approved| done
    done[\"done\"]
    agent -->|refine| agent";
        assert_eq!(mermaid(&flow), expected);
    }

    #[test]
    fn test_unreachable_node_omitted() {
        let flow = Flow::builder()
            .node("a", Inert)
            .node("island", Inert)
            .start("a")
            .build()
            .unwrap();

        let rendered = mermaid(&flow);
        assert!(rendered.contains("a[\"a\"]"));
        assert!(!rendered.contains("island"));
    }
}
