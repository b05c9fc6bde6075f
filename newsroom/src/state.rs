//! Shared pipeline state and its invariants.
//!
//! One `PipelineState` exists per submitted task and is threaded by mutable
//! reference through every node invocation; the driver's loop serializes all
//! access, so no locking is involved. Fields are private and all mutation
//! goes through the methods here, which hold the artifact dependency chain
//! (analysis requires research, report requires analysis) and the
//! append-only message log no matter which node misbehaves.

use shared_types::{CompletionFlags, Message, MessageRole, NodeId};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum StateError {
    #[error("cannot record {artifact}: {requires} has not been recorded")]
    DependencyNotMet {
        artifact: &'static str,
        requires: &'static str,
    },
}

/// Shared mutable record for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineState {
    task: String,
    messages: Vec<Message>,
    research_artifact: Option<String>,
    analysis_artifact: Option<String>,
    report_artifact: Option<String>,
    next_node: NodeId,
    done: bool,
}

impl PipelineState {
    /// Create state for a new submission. A non-empty task also lands in the
    /// message log as the opening human turn.
    pub fn new(task: impl Into<String>) -> Self {
        let task = task.into();
        let mut messages = Vec::new();
        if !task.is_empty() {
            messages.push(Message::human(task.clone()));
        }
        Self {
            task,
            messages,
            research_artifact: None,
            analysis_artifact: None,
            report_artifact: None,
            next_node: NodeId::Supervisor,
            done: false,
        }
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    /// Adopt the most recent human message as the task when none was set at
    /// submission.
    pub fn adopt_task_from_messages(&mut self) {
        if !self.task.is_empty() {
            return;
        }
        if let Some(message) = self
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Human)
        {
            self.task = message.content.clone();
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The only way messages enter the log; there is no truncation or
    /// reordering API.
    pub fn append_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn research_artifact(&self) -> Option<&str> {
        self.research_artifact.as_deref()
    }

    pub fn analysis_artifact(&self) -> Option<&str> {
        self.analysis_artifact.as_deref()
    }

    pub fn report_artifact(&self) -> Option<&str> {
        self.report_artifact.as_deref()
    }

    pub fn next_node(&self) -> NodeId {
        self.next_node
    }

    pub fn set_next_node(&mut self, node: NodeId) {
        self.next_node = node;
    }

    /// True once the report has been recorded; never reset.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn completion_flags(&self) -> CompletionFlags {
        CompletionFlags {
            has_research: self.research_artifact.is_some(),
            has_analysis: self.analysis_artifact.is_some(),
            has_report: self.report_artifact.is_some(),
        }
    }

    pub fn record_research(&mut self, artifact: String) {
        self.research_artifact = Some(artifact);
    }

    pub fn record_analysis(&mut self, artifact: String) -> Result<(), StateError> {
        if self.research_artifact.is_none() {
            return Err(StateError::DependencyNotMet {
                artifact: "analysis",
                requires: "research",
            });
        }
        self.analysis_artifact = Some(artifact);
        Ok(())
    }

    /// Recording the report is what completes the run.
    pub fn record_report(&mut self, artifact: String) -> Result<(), StateError> {
        if self.analysis_artifact.is_none() {
            return Err(StateError::DependencyNotMet {
                artifact: "report",
                requires: "analysis",
            });
        }
        self.report_artifact = Some(artifact);
        self.done = true;
        Ok(())
    }
}
