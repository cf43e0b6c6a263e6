use super::decision::Decision;
use super::sensors::{Outbox, SensorPort};
use crate::common::DomainResult;
use crate::domains::allocation::AgentMessage;
use crate::domains::level::{AgentType, LevelInfo};

/// What a host needs from an agent that plays one side of the cooperation.
pub trait CooperativeAgent: Send {
    fn agent_type(&self) -> AgentType;

    /// Build everything for a new level. Fails only when the level cannot be
    /// turned into a grid and graph.
    fn setup(&mut self, level: &LevelInfo) -> DomainResult<()>;

    fn sensor_port(&self) -> SensorPort;

    fn outbox(&self) -> Outbox;

    fn decide(&mut self) -> DomainResult<Decision>;

    fn on_peer_messages(&mut self, messages: Vec<AgentMessage>) -> DomainResult<()>;

    fn take_outgoing(&mut self) -> Vec<AgentMessage> {
        self.outbox().drain()
    }

    fn end_game(&mut self, caught: usize, elapsed_seconds: f64);
}
