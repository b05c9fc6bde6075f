//! Report worker: assembles the executive report from research and analysis.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{Message, NodeId};

use super::{excerpt, TextGenerator, Worker, WorkerError};
use crate::state::PipelineState;

/// Char budget applied to each upstream artifact embedded in the prompt.
const PROMPT_EXCERPT_BUDGET: usize = 1000;

pub struct Writer {
    generator: Arc<dyn TextGenerator>,
}

impl Writer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    fn prompt(task: &str, research: &str, analysis: &str) -> String {
        format!(
            "As a professional writer, create an executive report based on:\n\n\
             Task: {task}\n\n\
             Research findings:\n{}\n\n\
             Analysis:\n{}\n\n\
             Create a well-structured report with:\n\
             1. Executive Summary\n\
             2. Key Findings\n\
             3. Analysis & Insights\n\
             4. Recommendations\n\
             5. Conclusion\n\n\
             Keep it professional and concise.",
            excerpt(research, PROMPT_EXCERPT_BUDGET),
            excerpt(analysis, PROMPT_EXCERPT_BUDGET),
        )
    }

    fn format_report(task: &str, body: &str) -> String {
        let rule = "=".repeat(50);
        format!(
            "FINAL REPORT\n{rule}\nGenerated: {}\nTopic: {task}\n{rule}\n\n{body}\n",
            chrono::Utc::now().format("%Y-%m-%d %H:%M"),
        )
    }
}

#[async_trait]
impl Worker for Writer {
    fn node(&self) -> NodeId {
        NodeId::Writer
    }

    async fn run(&self, state: &mut PipelineState) -> Result<(), WorkerError> {
        let analysis = state
            .analysis_artifact()
            .ok_or(WorkerError::MissingDependency {
                worker: "writer",
                requires: "analysis",
            })?
            .to_string();
        let research = state
            .research_artifact()
            .ok_or(WorkerError::MissingDependency {
                worker: "writer",
                requires: "research",
            })?
            .to_string();
        let task = state.task().to_string();

        let body = self
            .generator
            .generate(
                "You are a professional report writer.",
                &Self::prompt(&task, &research, &analysis),
            )
            .await
            .map_err(|source| WorkerError::GenerationFailed {
                worker: "writer",
                source,
            })?;

        let report = Self::format_report(&task, &body);
        state
            .record_report(report)
            .map_err(|_| WorkerError::MissingDependency {
                worker: "writer",
                requires: "analysis",
            })?;
        state.append_message(Message::agent(
            "writer",
            "Writer: report complete. See the final report artifact for the full document."
                .to_string(),
        ));
        state.set_next_node(NodeId::Supervisor);
        tracing::info!(worker = "writer", "Report artifact recorded; run complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmError;

    struct CannedGenerator(&'static str);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    fn primed_state() -> PipelineState {
        let mut state = PipelineState::new("market trends in EVs");
        state.record_research("sales doubled".to_string());
        state.record_analysis("growth is accelerating".to_string()).unwrap();
        state
    }

    #[tokio::test]
    async fn test_writer_refuses_to_run_without_analysis() {
        let writer = Writer::new(Arc::new(CannedGenerator("report body")));
        let mut state = PipelineState::new("task");
        state.record_research("facts".to_string());

        let err = writer.run(&mut state).await.unwrap_err();
        assert!(matches!(
            err,
            WorkerError::MissingDependency {
                worker: "writer",
                requires: "analysis",
            }
        ));
        assert!(!state.is_done());
    }

    #[tokio::test]
    async fn test_writer_completes_the_run_with_a_framed_report() {
        let writer = Writer::new(Arc::new(CannedGenerator("Executive summary: buy EVs.")));
        let mut state = primed_state();

        writer.run(&mut state).await.unwrap();

        assert!(state.is_done());
        assert_eq!(state.next_node(), NodeId::Supervisor);

        let report = state.report_artifact().unwrap();
        assert!(report.starts_with("FINAL REPORT"));
        assert!(report.contains("Topic: market trends in EVs"));
        assert!(report.contains("Executive summary: buy EVs."));
    }

    #[tokio::test]
    async fn test_writer_prompt_embeds_both_artifacts() {
        struct PromptCapture;

        #[async_trait]
        impl TextGenerator for PromptCapture {
            async fn generate(&self, _system: &str, prompt: &str) -> Result<String, LlmError> {
                assert!(prompt.contains("sales doubled"));
                assert!(prompt.contains("growth is accelerating"));
                Ok("ok".to_string())
            }
        }

        let writer = Writer::new(Arc::new(PromptCapture));
        let mut state = primed_state();
        writer.run(&mut state).await.unwrap();
    }
}
