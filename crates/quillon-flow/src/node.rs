use serde_json::Value;

use quillon_core::Result;

use super::context::SharedContext;

/// The reserved fallback label. An edge registered under it matches any
/// finalize label that has no exact-match edge of its own.
pub const DEFAULT_LABEL: &str = "default";

/// Routing label returned by a node's finalize phase.
///
/// Labels are matched exactly (case-sensitive, no trimming). `Outcome::default()`
/// is what a node returns when it declines to pick a label; it routes along
/// the default edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Outcome(String);

impl Outcome {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_LABEL
    }
}

impl Default for Outcome {
    fn default() -> Self {
        Self(DEFAULT_LABEL.to_string())
    }
}

impl From<&str> for Outcome {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

impl From<String> for Outcome {
    fn from(label: String) -> Self {
        Self(label)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unit of work in the flow graph.
///
/// Every visit invokes the three phases strictly in order:
///
/// 1. `prepare` reads (and may stage data into) the shared context and loads
///    any external inputs. It must not perform the core side-effecting
///    action.
/// 2. `execute` performs the core action. Its signature carries no context,
///    so it cannot read or write shared state.
/// 3. `finalize` writes results into the context, performs the side effects
///    contracted to this phase (printing, file writes), and returns the
///    label used for the next edge lookup.
///
/// Data threads through the phases as JSON values: `prepare`'s output is
/// `execute`'s input, and `finalize` receives both. All default
/// implementations are no-ops routing along the default edge, so a node only
/// overrides the phases it needs.
pub trait Node {
    /// Gather inputs before the real work. Errors abort the run as
    /// preparation failures.
    fn prepare(&mut self, context: &mut SharedContext) -> Result<Value> {
        let _ = context;
        Ok(Value::Null)
    }

    /// Perform the core action (typically the outbound LLM call). Errors
    /// abort the run as execution failures; the engine never retries.
    fn execute(&mut self, prepared: &Value) -> Result<Value> {
        let _ = prepared;
        Ok(Value::Null)
    }

    /// Record results and route. Returning a label no edge matches ends the
    /// run at this node unless a default edge exists.
    fn finalize(
        &mut self,
        context: &mut SharedContext,
        prepared: Value,
        result: Value,
    ) -> Result<Outcome> {
        let _ = (context, prepared, result);
        Ok(Outcome::default())
    }
}

impl Node for Box<dyn Node> {
    fn prepare(&mut self, context: &mut SharedContext) -> Result<Value> {
        (**self).prepare(context)
    }

    fn execute(&mut self, prepared: &Value) -> Result<Value> {
        (**self).execute(prepared)
    }

    fn finalize(
        &mut self,
        context: &mut SharedContext,
        prepared: Value,
        result: Value,
    ) -> Result<Outcome> {
        (**self).finalize(context, prepared, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Node for Echo {
        fn prepare(&mut self, context: &mut SharedContext) -> Result<Value> {
            Ok(context.get("input").cloned().unwrap_or(Value::Null))
        }

        fn execute(&mut self, prepared: &Value) -> Result<Value> {
            Ok(prepared.clone())
        }

        fn finalize(
            &mut self,
            context: &mut SharedContext,
            _prepared: Value,
            result: Value,
        ) -> Result<Outcome> {
            context.set("output", result);
            Ok(Outcome::new("done"))
        }
    }

    #[test]
    fn test_phases_thread_data() {
        let mut ctx = SharedContext::new();
        ctx.set_str("input", "hello");

        let mut node = Echo;
        let prepared = node.prepare(&mut ctx).unwrap();
        let result = node.execute(&prepared).unwrap();
        let label = node.finalize(&mut ctx, prepared, result).unwrap();

        assert_eq!(ctx.get_str("output"), Some("hello"));
        assert_eq!(label.as_str(), "done");
    }

    #[test]
    fn test_default_phase_implementations() {
        struct Inert;
        impl Node for Inert {}

        let mut ctx = SharedContext::new();
        let mut node = Inert;
        let prepared = node.prepare(&mut ctx).unwrap();
        let result = node.execute(&prepared).unwrap();
        let label = node.finalize(&mut ctx, prepared, result).unwrap();

        assert!(label.is_default());
        assert!(ctx.data().is_empty());
    }

    #[test]
    fn test_outcome_label_matching_is_exact() {
        assert_eq!(Outcome::new("Approved").as_str(), "Approved");
        assert_ne!(Outcome::new("Approved"), Outcome::new("approved"));
        assert_ne!(Outcome::new(" approved"), Outcome::new("approved"));
        assert_eq!(Outcome::from("default"), Outcome::default());
    }
}
