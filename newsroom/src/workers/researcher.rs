//! Research worker: turns the task into a research brief.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{Message, NodeId};

use super::{excerpt, TextGenerator, Worker, WorkerError};
use crate::state::PipelineState;

/// Char budget for the research excerpt shown in the message log.
const SUMMARY_BUDGET: usize = 500;

pub struct Researcher {
    generator: Arc<dyn TextGenerator>,
}

impl Researcher {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    fn prompt(task: &str) -> String {
        format!(
            "As a research specialist, provide comprehensive information about: {task}\n\n\
             Include:\n\
             1. Key facts and background\n\
             2. Current trends or developments\n\
             3. Important statistics or data points\n\
             4. Notable examples or case studies\n\n\
             Be concise but thorough."
        )
    }
}

#[async_trait]
impl Worker for Researcher {
    fn node(&self) -> NodeId {
        NodeId::Researcher
    }

    async fn run(&self, state: &mut PipelineState) -> Result<(), WorkerError> {
        let task = state.task().to_string();
        let research = self
            .generator
            .generate("You are a research specialist.", &Self::prompt(&task))
            .await
            .map_err(|source| WorkerError::GenerationFailed {
                worker: "researcher",
                source,
            })?;

        let summary = excerpt(&research, SUMMARY_BUDGET);
        state.record_research(research);
        state.append_message(Message::agent(
            "researcher",
            format!("Researcher: completed research on '{task}'.\n\nKey findings:\n{summary}"),
        ));
        state.set_next_node(NodeId::Supervisor);
        tracing::info!(worker = "researcher", "Research artifact recorded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;
    use shared_types::MessageRole;

    struct CannedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_researcher_records_artifact_and_returns_to_supervisor() {
        let researcher = Researcher::new(Arc::new(CannedGenerator("EV adoption is rising")));
        let mut state = PipelineState::new("market trends in EVs");

        researcher.run(&mut state).await.unwrap();

        assert_eq!(state.research_artifact(), Some("EV adoption is rising"));
        assert_eq!(state.next_node(), NodeId::Supervisor);

        let last = state.messages().last().unwrap();
        assert_eq!(last.role, MessageRole::Agent);
        assert_eq!(last.author, "researcher");
        assert!(last.content.contains("market trends in EVs"));
    }

    #[tokio::test]
    async fn test_generation_failure_surfaces_as_worker_error() {
        struct BrokenGenerator;

        #[async_trait]
        impl TextGenerator for BrokenGenerator {
            async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
                Err(LlmError::MalformedResponse("empty body".to_string()))
            }
        }

        let researcher = Researcher::new(Arc::new(BrokenGenerator));
        let mut state = PipelineState::new("task");

        let err = researcher.run(&mut state).await.unwrap_err();
        assert!(matches!(
            err,
            WorkerError::GenerationFailed {
                worker: "researcher",
                ..
            }
        ));
        assert!(state.research_artifact().is_none());
    }
}
