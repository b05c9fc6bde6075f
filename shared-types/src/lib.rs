//! Boundary types for the newsroom pipeline.
//!
//! Everything here crosses a component boundary: the routing enums consumed
//! by the driver and router, the append-only message log, and the outcome
//! record handed back to the caller. All of it is serializable with serde so
//! a future surface (API, persistence layer) can pick it up unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Core Types
// ============================================================================

/// Unique identifier for a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Message Log
// ============================================================================

/// Who authored a turn in the run log.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    Human,
    Agent,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::Human => "human",
            MessageRole::Agent => "agent",
        }
    }
}

/// One turn in the append-only run log.
///
/// The log is chronological and only ever appended to; it exists for audit
/// and display, never for routing decisions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: MessageRole,
    /// Which participant produced this turn ("user", "supervisor", a worker name)
    pub author: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Human,
            author: "user".to_string(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn agent(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Agent,
            author: author.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// Routing
// ============================================================================

/// Nodes of the routing state machine.
///
/// `Terminate` is the sole terminal state; `Supervisor` is the hub every
/// worker returns to. Deserialization never fails: a wire value naming no
/// known node falls back to `Supervisor`, so corrupt routing data degrades
/// to another supervisor turn instead of a crash.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeId {
    #[default]
    Supervisor,
    Researcher,
    Analyst,
    Writer,
    Terminate,
}

impl NodeId {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeId::Supervisor => "supervisor",
            NodeId::Researcher => "researcher",
            NodeId::Analyst => "analyst",
            NodeId::Writer => "writer",
            NodeId::Terminate => "terminate",
        }
    }

    /// Parse a wire value, defaulting to `Supervisor` for unknown input.
    pub fn from_wire(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "supervisor" => NodeId::Supervisor,
            "researcher" => NodeId::Researcher,
            "analyst" => NodeId::Analyst,
            "writer" => NodeId::Writer,
            "terminate" => NodeId::Terminate,
            _ => NodeId::Supervisor,
        }
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(NodeId::from_wire(&raw))
    }
}

/// Ground-truth artifact completion flags shown to the routing oracle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionFlags {
    pub has_research: bool,
    pub has_analysis: bool,
    pub has_report: bool,
}

// ============================================================================
// Outcome
// ============================================================================

/// Why a run stopped.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The router reached the terminal state.
    Completed,
    /// The configured step budget ran out first.
    BudgetExceeded,
    /// The caller's cancellation signal fired.
    Cancelled,
    /// A worker failed in a way the pipeline cannot recover from.
    Fatal,
}

impl TerminationReason {
    pub fn as_str(self) -> &'static str {
        match self {
            TerminationReason::Completed => "completed",
            TerminationReason::BudgetExceeded => "budget_exceeded",
            TerminationReason::Cancelled => "cancelled",
            TerminationReason::Fatal => "fatal",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a caller receives back from one submission.
///
/// Partial artifacts are always included so a budget-exceeded or failed run
/// still hands over whatever was produced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineOutcome {
    pub run_id: RunId,
    pub final_report: Option<String>,
    pub research: Option<String>,
    pub analysis: Option<String>,
    pub messages: Vec<Message>,
    pub termination_reason: TerminationReason,
    pub steps_taken: usize,
    /// Populated when `termination_reason` is `Fatal`.
    pub error: Option<String>,
}
