//! Supervisor node: one oracle consultation per turn.
//!
//! The supervisor owns routing and nothing else. Each turn it consults the
//! oracle, normalizes the answer against ground truth, writes the verdict
//! into `next_node`, and appends exactly one status message. It never
//! touches artifact fields, and an unreachable oracle is recovered through
//! the configured failure policy rather than surfaced.

use std::sync::Arc;

use shared_types::Message;

use crate::config::OracleFailurePolicy;
use crate::oracle::RoutingOracle;
use crate::state::PipelineState;
use crate::verdict::{self, Verdict};

pub struct Supervisor {
    oracle: Arc<dyn RoutingOracle>,
    on_oracle_failure: OracleFailurePolicy,
}

impl Supervisor {
    pub fn new(oracle: Arc<dyn RoutingOracle>, on_oracle_failure: OracleFailurePolicy) -> Self {
        Self {
            oracle,
            on_oracle_failure,
        }
    }

    /// Run one supervisor turn. Side effects: one `next_node` write, one
    /// message append.
    pub async fn run(&self, state: &mut PipelineState) {
        state.adopt_task_from_messages();
        let flags = state.completion_flags();

        let answer = match self.oracle.classify(state.task(), flags).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    policy = ?self.on_oracle_failure,
                    "Routing oracle failed; applying failure policy"
                );
                None
            }
        };

        let verdict = verdict::normalize(answer.as_deref(), flags, self.on_oracle_failure);
        state.set_next_node(verdict.node());
        state.append_message(Message::agent("supervisor", Self::status_line(verdict)));
        tracing::info!(verdict = ?verdict, "Supervisor routed");
    }

    fn status_line(verdict: Verdict) -> String {
        match verdict {
            Verdict::Researcher => {
                "Supervisor: assigning research to the researcher.".to_string()
            }
            Verdict::Analyst => {
                "Supervisor: research is in; assigning analysis to the analyst.".to_string()
            }
            Verdict::Writer => {
                "Supervisor: analysis complete; assigning the report to the writer.".to_string()
            }
            Verdict::Terminate => "Supervisor: all work complete, closing the run.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared_types::{CompletionFlags, NodeId};

    use crate::oracle::OracleError;

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

    struct DownOracle;

    #[async_trait]
    impl RoutingOracle for DownOracle {
        async fn classify(
            &self,
            _task: &str,
            _flags: CompletionFlags,
        ) -> Result<String, OracleError> {
            Err(OracleError::Unavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_turn_writes_verdict_and_one_status_message() {
        let supervisor = Supervisor::new(
            Arc::new(FixedOracle("researcher")),
            OracleFailurePolicy::Terminate,
        );
        let mut state = PipelineState::new("market trends in EVs");

        supervisor.run(&mut state).await;

        assert_eq!(state.next_node(), NodeId::Researcher);
        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.messages()[1].author, "supervisor");
    }

    #[tokio::test]
    async fn test_oracle_failure_terminates_under_default_policy() {
        let supervisor = Supervisor::new(Arc::new(DownOracle), OracleFailurePolicy::Terminate);
        let mut state = PipelineState::new("task");

        supervisor.run(&mut state).await;

        assert_eq!(state.next_node(), NodeId::Terminate);
    }

    #[tokio::test]
    async fn test_oracle_failure_routes_by_state_when_configured() {
        let supervisor = Supervisor::new(Arc::new(DownOracle), OracleFailurePolicy::RouteByState);
        let mut state = PipelineState::new("task");

        supervisor.run(&mut state).await;
        assert_eq!(state.next_node(), NodeId::Researcher);

        state.record_research("facts".to_string());
        supervisor.run(&mut state).await;
        assert_eq!(state.next_node(), NodeId::Analyst);
    }

    #[tokio::test]
    async fn test_supervisor_never_touches_artifacts() {
        let supervisor = Supervisor::new(
            Arc::new(FixedOracle("writer")),
            OracleFailurePolicy::Terminate,
        );
        let mut state = PipelineState::new("task");

        supervisor.run(&mut state).await;

        assert_eq!(state.completion_flags(), CompletionFlags::default());
    }
}
