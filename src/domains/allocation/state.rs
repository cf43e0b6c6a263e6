use super::claims::ClaimKind;
use super::protocol::RequestId;
use crate::domains::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where an agent stands in the allocation protocol.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AllocationState {
    /// Nothing committed; the initiator opens a round from here.
    Init,
    /// GetCheapestPath sent, waiting for the peer's cost.
    AwaitingPeerCost { request: RequestId },
    Assigned { target: NodeIndex, kind: ClaimKind },
    /// Every claim is gone.
    Done,
}

impl AllocationState {
    pub fn target(&self) -> Option<NodeIndex> {
        match self {
            AllocationState::Assigned { target, .. } => Some(*target),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AllocationState::Init => "Init",
            AllocationState::AwaitingPeerCost { .. } => "AwaitingPeerCost",
            AllocationState::Assigned { .. } => "Assigned",
            AllocationState::Done => "Done",
        }
    }
}

impl fmt::Display for AllocationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationState::AwaitingPeerCost { request } => write!(f, "AwaitingPeerCost({})", request),
            AllocationState::Assigned { target, kind } => write!(f, "Assigned({} {:?})", target, kind),
            other => f.write_str(other.name()),
        }
    }
}
