//! Decision normalization.
//!
//! The routing oracle's answer is free text and may disagree with what has
//! actually been produced. The precedence table here resolves every such
//! conflict the same way: recorded artifacts outrank the text wherever they
//! disagree about readiness, the text is honored where no conflict exists,
//! and anything uninterpretable terminates the run rather than looping on it.

use shared_types::{CompletionFlags, NodeId};

use crate::config::OracleFailurePolicy;

/// Token that lets the oracle end the run explicitly.
const DONE_TOKEN: &str = "done";
const RESEARCHER_TOKEN: &str = "researcher";
const ANALYST_TOKEN: &str = "analyst";
const WRITER_TOKEN: &str = "writer";

/// The normalizer's resolved routing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Researcher,
    Analyst,
    Writer,
    Terminate,
}

impl Verdict {
    pub fn node(self) -> NodeId {
        match self {
            Verdict::Researcher => NodeId::Researcher,
            Verdict::Analyst => NodeId::Analyst,
            Verdict::Writer => NodeId::Writer,
            Verdict::Terminate => NodeId::Terminate,
        }
    }
}

/// Normalize an oracle answer against ground-truth completion flags.
///
/// `raw` is `None` when the oracle call failed outright; `on_failure` then
/// decides between stopping the run and routing from the flags alone. Token
/// matching is case-insensitive and substring-based.
pub fn normalize(
    raw: Option<&str>,
    flags: CompletionFlags,
    on_failure: OracleFailurePolicy,
) -> Verdict {
    // A recorded report overrides anything the oracle said.
    if flags.has_report {
        return Verdict::Terminate;
    }

    let text = match raw {
        Some(text) => text.to_lowercase(),
        None => {
            return match on_failure {
                OracleFailurePolicy::Terminate => Verdict::Terminate,
                OracleFailurePolicy::RouteByState => route_by_flags(flags),
            };
        }
    };

    if text.contains(DONE_TOKEN) {
        return Verdict::Terminate;
    }
    if text.contains(RESEARCHER_TOKEN) || !flags.has_research {
        return Verdict::Researcher;
    }
    if text.contains(ANALYST_TOKEN) || (flags.has_research && !flags.has_analysis) {
        return Verdict::Analyst;
    }
    if text.contains(WRITER_TOKEN) || (flags.has_analysis && !flags.has_report) {
        return Verdict::Writer;
    }
    // Uninterpretable answer with nothing left to assign.
    Verdict::Terminate
}

/// Flag-only routing: assign the first missing artifact in pipeline order.
fn route_by_flags(flags: CompletionFlags) -> Verdict {
    if !flags.has_research {
        Verdict::Researcher
    } else if !flags.has_analysis {
        Verdict::Analyst
    } else if !flags.has_report {
        Verdict::Writer
    } else {
        Verdict::Terminate
    }
}
