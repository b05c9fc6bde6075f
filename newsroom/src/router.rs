//! Pure routing state machine.
//!
//! `Terminate` is the sole terminal state; `Supervisor` is the hub every
//! worker returns to. A completed run routes to `Terminate` no matter what
//! the last decision wrote into `next_node`. Unknown wire values never reach
//! this function: `NodeId` deserialization already collapses them to
//! `Supervisor`.

use shared_types::NodeId;

use crate::state::PipelineState;

pub fn route(state: &PipelineState) -> NodeId {
    if state.is_done() {
        return NodeId::Terminate;
    }
    state.next_node()
}
