//! Routing contract under adversarial or degenerate oracle behavior.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{CompletionFlags, TerminationReason};

use newsroom::config::OracleFailurePolicy;
use newsroom::driver::WorkflowDriver;
use newsroom::llm::LlmError;
use newsroom::oracle::{OracleError, RoutingOracle};
use newsroom::supervisor::Supervisor;
use newsroom::workers::{Analyst, Researcher, TextGenerator, Worker, Writer};

struct FixedOracle(&'static str);

#[async_trait]
impl RoutingOracle for FixedOracle {
    async fn classify(&self, _task: &str, _flags: CompletionFlags) -> Result<String, OracleError> {
        Ok(self.0.to_string())
    }
}

struct CannedGenerator;

#[async_trait]
impl TextGenerator for CannedGenerator {
    async fn generate(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
        Ok("generated text".to_string())
    }
}

/// Generator that fails only for the analyst persona.
struct AnalystOutageGenerator;

#[async_trait]
impl TextGenerator for AnalystOutageGenerator {
    async fn generate(&self, system: &str, _prompt: &str) -> Result<String, LlmError> {
        if system.contains("data analyst") {
            Err(LlmError::BadStatus {
                status: 503,
                body: "over capacity".to_string(),
            })
        } else {
            Ok("generated text".to_string())
        }
    }
}

fn build_driver(
    oracle: Arc<dyn RoutingOracle>,
    generator: Arc<dyn TextGenerator>,
) -> WorkflowDriver {
    let supervisor = Supervisor::new(oracle, OracleFailurePolicy::Terminate);
    let workers: Vec<Arc<dyn Worker>> = vec![
        Arc::new(Researcher::new(generator.clone())),
        Arc::new(Analyst::new(generator.clone())),
        Arc::new(Writer::new(generator)),
    ];
    WorkflowDriver::new(supervisor, workers)
}

fn worker_order(outcome: &shared_types::PipelineOutcome) -> Vec<&str> {
    outcome
        .messages
        .iter()
        .filter(|m| m.author != "user" && m.author != "supervisor")
        .map(|m| m.author.as_str())
        .collect()
}

#[tokio::test]
async fn test_oracle_demanding_the_writer_cannot_skip_the_chain() {
    // The oracle insists on the writer from the first turn; completion flags
    // still force research and analysis to happen first.
    let driver = build_driver(Arc::new(FixedOracle("writer")), Arc::new(CannedGenerator));

    let outcome = driver.submit("market trends in EVs", 16).await;

    assert_eq!(outcome.termination_reason, TerminationReason::Completed);
    assert_eq!(worker_order(&outcome), vec!["researcher", "analyst", "writer"]);
    assert!(outcome.research.is_some());
    assert!(outcome.analysis.is_some());
    assert!(outcome.final_report.is_some());
}

#[tokio::test]
async fn test_empty_oracle_answers_still_drive_the_pipeline_to_completion() {
    let driver = build_driver(Arc::new(FixedOracle("")), Arc::new(CannedGenerator));

    let outcome = driver.submit("market trends in EVs", 16).await;

    assert_eq!(outcome.termination_reason, TerminationReason::Completed);
    assert_eq!(worker_order(&outcome), vec!["researcher", "analyst", "writer"]);
}

#[tokio::test]
async fn test_unparseable_oracle_answers_still_terminate_within_budget() {
    let driver = build_driver(
        Arc::new(FixedOracle("I am not sure what comes next")),
        Arc::new(CannedGenerator),
    );

    let outcome = driver.submit("market trends in EVs", 16).await;

    // Flag-based clauses route each missing artifact in turn, and the
    // recorded report terminates the run.
    assert_eq!(outcome.termination_reason, TerminationReason::Completed);
    assert!(outcome.steps_taken <= 16);
    assert!(outcome.final_report.is_some());
}

#[tokio::test]
async fn test_worker_generation_failure_is_fatal_with_partial_artifacts() {
    let driver = build_driver(
        Arc::new(FixedOracle("keep going")),
        Arc::new(AnalystOutageGenerator),
    );

    let outcome = driver.submit("market trends in EVs", 16).await;

    assert_eq!(outcome.termination_reason, TerminationReason::Fatal);
    let error = outcome.error.expect("fatal outcome carries the error");
    assert!(error.contains("analyst"));
    // The research produced before the failure is still handed back.
    assert!(outcome.research.is_some());
    assert!(outcome.analysis.is_none());
    assert!(outcome.final_report.is_none());
}

#[tokio::test]
async fn test_outcome_serializes_for_external_surfaces() {
    let driver = build_driver(Arc::new(FixedOracle("done")), Arc::new(CannedGenerator));

    let outcome = driver.submit("market trends in EVs", 16).await;

    let wire = serde_json::to_string(&outcome).expect("outcome serializes");
    assert!(wire.contains("\"termination_reason\":\"completed\""));
    let back: shared_types::PipelineOutcome = serde_json::from_str(&wire).unwrap();
    assert_eq!(back, outcome);
}
