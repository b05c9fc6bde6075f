//! Analysis worker: distills the research brief into insights.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{Message, NodeId};

use super::{excerpt, TextGenerator, Worker, WorkerError};
use crate::state::PipelineState;

/// Char budget for the insight excerpt shown in the message log.
const SUMMARY_BUDGET: usize = 400;

pub struct Analyst {
    generator: Arc<dyn TextGenerator>,
}

impl Analyst {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    fn prompt(task: &str, research: &str) -> String {
        format!(
            "As a data analyst, analyze this research data and provide insights:\n\n\
             Research data:\n{research}\n\n\
             Provide:\n\
             1. Key insights and patterns\n\
             2. Strategic implications\n\
             3. Risks and opportunities\n\
             4. Recommendations\n\n\
             Focus on actionable insights related to: {task}"
        )
    }
}

#[async_trait]
impl Worker for Analyst {
    fn node(&self) -> NodeId {
        NodeId::Analyst
    }

    async fn run(&self, state: &mut PipelineState) -> Result<(), WorkerError> {
        let research = state
            .research_artifact()
            .ok_or(WorkerError::MissingDependency {
                worker: "analyst",
                requires: "research",
            })?
            .to_string();
        let task = state.task().to_string();

        let analysis = self
            .generator
            .generate("You are a data analyst.", &Self::prompt(&task, &research))
            .await
            .map_err(|source| WorkerError::GenerationFailed {
                worker: "analyst",
                source,
            })?;

        let summary = excerpt(&analysis, SUMMARY_BUDGET);
        state
            .record_analysis(analysis)
            .map_err(|_| WorkerError::MissingDependency {
                worker: "analyst",
                requires: "research",
            })?;
        state.append_message(Message::agent(
            "analyst",
            format!("Analyst: analysis complete.\n\nTop insights:\n{summary}"),
        ));
        state.set_next_node(NodeId::Supervisor);
        tracing::info!(worker = "analyst", "Analysis artifact recorded");
        Ok(())
    }
}
