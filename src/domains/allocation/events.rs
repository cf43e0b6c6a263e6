use super::claims::ClaimKind;
use super::protocol::{Command, RequestId};
use crate::common::DomainEvent;
use crate::domains::graph::NodeRef;
use crate::domains::level::AgentType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AllocationEvent {
    LevelClassified {
        agent_id: String,
        solo: Vec<NodeRef>,
        cooperative: Vec<NodeRef>,
        unreachable: Vec<NodeRef>,
        timestamp: DateTime<Utc>,
    },
    NegotiationStarted {
        agent_id: String,
        request_id: RequestId,
        timestamp: DateTime<Utc>,
    },
    TargetCommitted {
        agent_id: String,
        target: NodeRef,
        kind: ClaimKind,
        cost: f64,
        timestamp: DateTime<Utc>,
    },
    DiamondConceded {
        agent_id: String,
        diamond: NodeRef,
        own_cost: f64,
        peer_cost: f64,
        timestamp: DateTime<Utc>,
    },
    DiamondRemoved {
        agent_id: String,
        diamond: NodeRef,
        timestamp: DateTime<Utc>,
    },
    DiamondCaught {
        agent_id: String,
        diamond: NodeRef,
        was_target: bool,
        timestamp: DateTime<Utc>,
    },
    PathReplaced {
        agent_id: String,
        goal: NodeRef,
        cost: Option<f64>,
        timestamp: DateTime<Utc>,
    },
    ProtocolDesync {
        agent_id: String,
        expected: Option<RequestId>,
        received: RequestId,
        timestamp: DateTime<Utc>,
    },
    RequestRetried {
        agent_id: String,
        request_id: RequestId,
        timestamp: DateTime<Utc>,
    },
    MotorCommandReceived {
        agent_id: String,
        from: AgentType,
        command: Command,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent for AllocationEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AllocationEvent::LevelClassified { .. } => "LevelClassified",
            AllocationEvent::NegotiationStarted { .. } => "NegotiationStarted",
            AllocationEvent::TargetCommitted { .. } => "TargetCommitted",
            AllocationEvent::DiamondConceded { .. } => "DiamondConceded",
            AllocationEvent::DiamondRemoved { .. } => "DiamondRemoved",
            AllocationEvent::DiamondCaught { .. } => "DiamondCaught",
            AllocationEvent::PathReplaced { .. } => "PathReplaced",
            AllocationEvent::ProtocolDesync { .. } => "ProtocolDesync",
            AllocationEvent::RequestRetried { .. } => "RequestRetried",
            AllocationEvent::MotorCommandReceived { .. } => "MotorCommandReceived",
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            AllocationEvent::LevelClassified { agent_id, .. } => agent_id,
            AllocationEvent::NegotiationStarted { agent_id, .. } => agent_id,
            AllocationEvent::TargetCommitted { agent_id, .. } => agent_id,
            AllocationEvent::DiamondConceded { agent_id, .. } => agent_id,
            AllocationEvent::DiamondRemoved { agent_id, .. } => agent_id,
            AllocationEvent::DiamondCaught { agent_id, .. } => agent_id,
            AllocationEvent::PathReplaced { agent_id, .. } => agent_id,
            AllocationEvent::ProtocolDesync { agent_id, .. } => agent_id,
            AllocationEvent::RequestRetried { agent_id, .. } => agent_id,
            AllocationEvent::MotorCommandReceived { agent_id, .. } => agent_id,
        }
    }

    fn event_version(&self) -> u64 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            AllocationEvent::LevelClassified { timestamp, .. } => *timestamp,
            AllocationEvent::NegotiationStarted { timestamp, .. } => *timestamp,
            AllocationEvent::TargetCommitted { timestamp, .. } => *timestamp,
            AllocationEvent::DiamondConceded { timestamp, .. } => *timestamp,
            AllocationEvent::DiamondRemoved { timestamp, .. } => *timestamp,
            AllocationEvent::DiamondCaught { timestamp, .. } => *timestamp,
            AllocationEvent::PathReplaced { timestamp, .. } => *timestamp,
            AllocationEvent::ProtocolDesync { timestamp, .. } => *timestamp,
            AllocationEvent::RequestRetried { timestamp, .. } => *timestamp,
            AllocationEvent::MotorCommandReceived { timestamp, .. } => *timestamp,
        }
    }
}
