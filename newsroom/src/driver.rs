//! Workflow driver: the outer loop.
//!
//! Strictly sequential: one node executes at a time against the single-owner
//! `PipelineState`, so no locking is needed. The loop stops on the terminal
//! routing state, on the caller's cancellation token, on step-budget
//! exhaustion, or on a fatal worker error; each of these maps to a distinct
//! `TerminationReason` and the caller always receives whatever partial
//! artifacts were produced.

use std::sync::Arc;

use shared_types::{NodeId, PipelineOutcome, RunId, TerminationReason};
use tokio_util::sync::CancellationToken;

use crate::config::{ModelProfile, OracleFailurePolicy, PipelineConfig};
use crate::llm::{ChatClient, LlmError};
use crate::oracle::HttpRoutingOracle;
use crate::router;
use crate::state::PipelineState;
use crate::supervisor::Supervisor;
use crate::workers::{Analyst, HttpTextGenerator, Researcher, TextGenerator, Worker, Writer};

pub struct WorkflowDriver {
    supervisor: Supervisor,
    workers: Vec<Arc<dyn Worker>>,
    cancel: CancellationToken,
}

impl WorkflowDriver {
    pub fn new(supervisor: Supervisor, workers: Vec<Arc<dyn Worker>>) -> Self {
        Self {
            supervisor,
            workers,
            cancel: CancellationToken::new(),
        }
    }

    /// Build the production pipeline: one chat client shared by the routing
    /// oracle and all three workers.
    pub fn from_client(client: ChatClient, on_oracle_failure: OracleFailurePolicy) -> Self {
        let oracle = Arc::new(HttpRoutingOracle::new(client.clone()));
        let generator: Arc<dyn TextGenerator> = Arc::new(HttpTextGenerator::new(client));
        let supervisor = Supervisor::new(oracle, on_oracle_failure);
        let workers: Vec<Arc<dyn Worker>> = vec![
            Arc::new(Researcher::new(generator.clone())),
            Arc::new(Analyst::new(generator.clone())),
            Arc::new(Writer::new(generator)),
        ];
        Self::new(supervisor, workers)
    }

    /// Build the production pipeline from config, constructing the client.
    pub fn from_profile(profile: ModelProfile, config: &PipelineConfig) -> Result<Self, LlmError> {
        let client = ChatClient::new(profile, config.request_timeout_ms)?;
        Ok(Self::from_client(client, config.oracle_failure))
    }

    /// Token the caller can use to abort a run in flight. Checked before
    /// every node invocation; once it fires, the state is not mutated again.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn worker_for(&self, node: NodeId) -> Option<&Arc<dyn Worker>> {
        self.workers.iter().find(|w| w.node() == node)
    }

    /// Drive one task to termination. Every node execution, supervisor or
    /// worker, consumes one step of the budget.
    pub async fn submit(&self, task: impl Into<String>, max_steps: usize) -> PipelineOutcome {
        let run_id = RunId::new();
        let mut state = PipelineState::new(task);
        let mut current = NodeId::Supervisor;
        let mut steps = 0usize;
        let mut error: Option<String> = None;

        tracing::info!(run_id = %run_id, max_steps, "Starting pipeline run");

        let termination_reason = loop {
            if current == NodeId::Terminate {
                break TerminationReason::Completed;
            }
            if self.cancel.is_cancelled() {
                tracing::warn!(run_id = %run_id, steps, "Run cancelled");
                break TerminationReason::Cancelled;
            }
            if steps >= max_steps {
                tracing::warn!(run_id = %run_id, max_steps, "Step budget exhausted");
                break TerminationReason::BudgetExceeded;
            }

            match current {
                NodeId::Supervisor => self.supervisor.run(&mut state).await,
                node => match self.worker_for(node) {
                    Some(worker) => {
                        if let Err(e) = worker.run(&mut state).await {
                            tracing::error!(
                                run_id = %run_id,
                                node = %node,
                                error = %e,
                                "Worker failed; aborting run"
                            );
                            error = Some(e.to_string());
                            break TerminationReason::Fatal;
                        }
                    }
                    None => {
                        // Routable node with nobody registered for it: treat
                        // as corrupt routing and hand back to the supervisor.
                        // The step still counts, so the budget bounds this.
                        tracing::warn!(
                            run_id = %run_id,
                            node = %node,
                            "No worker registered; returning to supervisor"
                        );
                        state.set_next_node(NodeId::Supervisor);
                    }
                },
            }

            steps += 1;
            current = router::route(&state);
        };

        tracing::info!(
            run_id = %run_id,
            steps,
            reason = %termination_reason,
            "Pipeline run finished"
        );

        PipelineOutcome {
            run_id,
            final_report: state.report_artifact().map(ToString::to_string),
            research: state.research_artifact().map(ToString::to_string),
            analysis: state.analysis_artifact().map(ToString::to_string),
            messages: state.messages().to_vec(),
            termination_reason,
            steps_taken: steps,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared_types::CompletionFlags;

    use crate::oracle::{OracleError, RoutingOracle};

    struct FixedOracle(&'static str);

    #[async_trait]
    impl RoutingOracle for FixedOracle {
        async fn classify(
            &self,
            _task: &str,
            _flags: CompletionFlags,
        ) -> Result<String, OracleError> {
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn test_unregistered_worker_falls_back_to_supervisor_until_budget() {
        // A driver with no workers at all: the supervisor keeps assigning the
        // researcher, the fallback keeps bouncing back, and the budget ends it.
        let supervisor = Supervisor::new(
            Arc::new(FixedOracle("researcher")),
            OracleFailurePolicy::Terminate,
        );
        let driver = WorkflowDriver::new(supervisor, Vec::new());

        let outcome = driver.submit("task", 5).await;

        assert_eq!(outcome.termination_reason, TerminationReason::BudgetExceeded);
        assert_eq!(outcome.steps_taken, 5);
        assert!(outcome.final_report.is_none());
    }
}
