use tokio::runtime::Runtime;

use quillon_core::error::Result;
use quillon_core::traits::{LlmClient, TextGenerator};
use quillon_core::types::CompletionRequest;

/// Synchronous facade over an async [`LlmClient`].
///
/// Flow nodes run on the calling thread and expect blocking calls, while the
/// provider clients are async through reqwest. This wrapper owns a
/// current-thread runtime and drives each completion to its end, so callers
/// never touch the async machinery. Must not be used from inside an async
/// context.
pub struct BlockingGenerator {
    runtime: Runtime,
    client: Box<dyn LlmClient>,
}

impl BlockingGenerator {
    pub fn new(client: Box<dyn LlmClient>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self { runtime, client })
    }
}

impl TextGenerator for BlockingGenerator {
    fn generate(&self, request: &CompletionRequest) -> Result<String> {
        self.runtime.block_on(self.client.complete(request))
    }
}
