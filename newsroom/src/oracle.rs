//! Decision oracle adapter.
//!
//! Wraps the routing model behind a narrow trait so the supervisor can be
//! driven by a scripted oracle in tests. The HTTP implementation reuses the
//! chat client; any transport, timeout, or decoding failure is reported as
//! `OracleError::Unavailable` and recovered by the caller, never propagated
//! as a fatal pipeline error.

use async_trait::async_trait;
use shared_types::CompletionFlags;

use crate::llm::{ChatClient, LlmError};

#[derive(Debug, Clone, thiserror::Error)]
pub enum OracleError {
    #[error("routing oracle unavailable: {0}")]
    Unavailable(String),
}

impl From<LlmError> for OracleError {
    fn from(e: LlmError) -> Self {
        OracleError::Unavailable(e.to_string())
    }
}

/// Decision oracle consulted by the supervisor after every step.
///
/// The returned text carries no format guarantee; the caller normalizes it
/// against ground truth before acting on it.
#[async_trait]
pub trait RoutingOracle: Send + Sync {
    async fn classify(&self, task: &str, flags: CompletionFlags) -> Result<String, OracleError>;
}

/// Routing oracle backed by a chat-completion model.
pub struct HttpRoutingOracle {
    client: ChatClient,
}

impl HttpRoutingOracle {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }

    fn system_prompt(flags: CompletionFlags) -> String {
        format!(
            "You are a supervisor managing a team of agents:\n\n\
             1. Researcher - gathers information and data\n\
             2. Analyst - analyzes data and provides insights\n\
             3. Writer - creates reports and summaries\n\n\
             Based on the current state, decide which agent should work next.\n\
             If the task is complete, respond with 'DONE'.\n\n\
             Current state:\n\
             - Has research data: {}\n\
             - Has analysis: {}\n\
             - Has report: {}\n\n\
             Respond with ONLY the agent name (researcher/analyst/writer) or 'DONE'.",
            flags.has_research, flags.has_analysis, flags.has_report
        )
    }
}

#[async_trait]
impl RoutingOracle for HttpRoutingOracle {
    async fn classify(&self, task: &str, flags: CompletionFlags) -> Result<String, OracleError> {
        let task = if task.trim().is_empty() { "No task" } else { task };
        let answer = self
            .client
            .complete(&Self::system_prompt(flags), task)
            .await?;
        tracing::debug!(
            model = %self.client.model_id(),
            answer = %answer.trim(),
            "Routing oracle answered"
        );
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_reports_completion_flags() {
        let prompt = HttpRoutingOracle::system_prompt(CompletionFlags {
            has_research: true,
            has_analysis: false,
            has_report: false,
        });
        assert!(prompt.contains("Has research data: true"));
        assert!(prompt.contains("Has analysis: false"));
        assert!(prompt.contains("Has report: false"));
        assert!(prompt.contains("'DONE'"));
    }
}
