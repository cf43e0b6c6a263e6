use crate::domains::graph::NodeRef;
use crate::domains::level::{AgentType, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Process-unique request identity: the issuing agent plus its own counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId {
    pub origin: AgentType,
    pub sequence: u64,
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.origin, self.sequence)
    }
}

/// Monotonic id source owned by one agent.
#[derive(Debug, Clone)]
pub struct RequestIdGenerator {
    origin: AgentType,
    next: u64,
}

impl RequestIdGenerator {
    pub fn new(origin: AgentType) -> Self {
        Self { origin, next: 1 }
    }

    pub fn next_id(&mut self) -> RequestId {
        let id = RequestId {
            origin: self.origin,
            sequence: self.next,
        };
        self.next += 1;
        id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Ask the peer for its cheapest path over its current candidates.
    GetCheapestPath,
    /// Grant: the peer may go for this diamond.
    CatchDiamond(NodeRef),
    /// The peer must drop this diamond and pick its next target.
    CatchNextDiamond(NodeRef),
    /// The diamond is gone; forget it.
    DeleteDiamond(NodeRef),
    /// Rendezvous below a cooperative diamond, then morph as hinted.
    MoveToPosition { x: f64, morph: MorphHint },
    MorphUp,
    MorphDown,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetCheapestPath => "GetCheapestPath",
            Command::CatchDiamond(_) => "CatchDiamond",
            Command::CatchNextDiamond(_) => "CatchNextDiamond",
            Command::DeleteDiamond(_) => "DeleteDiamond",
            Command::MoveToPosition { .. } => "MoveToPosition",
            Command::MorphUp => "MorphUp",
            Command::MorphDown => "MorphDown",
        }
    }

    pub fn is_motor_command(&self) -> bool {
        matches!(
            self,
            Command::MoveToPosition { .. } | Command::MorphUp | Command::MorphDown
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MorphHint {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub command: Command,
}

impl Request {
    pub fn new(id: RequestId, command: Command) -> Self {
        Self { id, command }
    }

    /// The channel message that carries this request.
    pub fn message(&self) -> AgentMessage {
        AgentMessage {
            text: format!("{} {}", self.command.name(), self.id),
            attachment: Some(Attachment::Request(self.clone())),
        }
    }
}

/// A path as reported to the other agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathReport {
    pub goal: NodeRef,
    pub total_cost: f64,
    pub waypoints: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id_of_request: RequestId,
    pub attachment: Option<PathReport>,
}

impl Answer {
    pub fn message(&self) -> AgentMessage {
        AgentMessage {
            text: format!("Answer to {}", self.id_of_request),
            attachment: Some(Attachment::Answer(self.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Attachment {
    Request(Request),
    Answer(Answer),
}

/// What the transport between the agents carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub text: String,
    pub attachment: Option<Attachment>,
}

impl AgentMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }
}
