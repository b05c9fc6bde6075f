//! Worker contract and shared generation plumbing.
//!
//! A worker consumes upstream artifacts, produces exactly one artifact of
//! its own, appends one summary message, and always hands control back to
//! the supervisor; routing is never a worker's decision. A worker invoked
//! without its upstream artifact refuses to run instead of generating from
//! garbage, even though the router's policy should make that unreachable.

pub mod analyst;
pub mod researcher;
pub mod writer;

pub use analyst::Analyst;
pub use researcher::Researcher;
pub use writer::Writer;

use async_trait::async_trait;
use shared_types::NodeId;

use crate::llm::{ChatClient, LlmError};
use crate::state::PipelineState;

#[derive(Debug, Clone, thiserror::Error)]
pub enum WorkerError {
    #[error("{worker} invoked without required {requires} artifact")]
    MissingDependency {
        worker: &'static str,
        requires: &'static str,
    },
    #[error("{worker} generation failed: {source}")]
    GenerationFailed {
        worker: &'static str,
        #[source]
        source: LlmError,
    },
}

/// One pipeline stage.
#[async_trait]
pub trait Worker: Send + Sync {
    /// The node this worker occupies in the route table.
    fn node(&self) -> NodeId;

    /// Execute one turn against the shared state.
    async fn run(&self, state: &mut PipelineState) -> Result<(), WorkerError>;
}

/// Text generation seam so tests can script worker output.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

/// Generator backed by the shared chat client.
pub struct HttpTextGenerator {
    client: ChatClient,
}

impl HttpTextGenerator {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TextGenerator for HttpTextGenerator {
    async fn generate(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        self.client.complete(system, prompt).await
    }
}

/// Char-bounded excerpt for message-log summaries.
pub(crate) fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut shortened: String = text.chars().take(max_chars).collect();
        shortened.push_str("...");
        shortened
    }
}
