use crate::common::{ApplicationError, ApplicationResult, DomainError, DomainResult};
use crate::config::Config;
use crate::domains::agent::{CooperativeAgent, Decision, PlannerAgent, SensorPort};
use crate::domains::allocation::AgentMessage;
use crate::domains::level::{AgentType, LevelInfo, SensorUpdate};
use crate::domains::logger::DynLogger;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

const CHANNEL_CAPACITY: usize = 256;

/// What an agent task hands back when it stops.
pub struct AgentOutcome {
    pub agent: PlannerAgent,
    pub decisions: u32,
    pub last_decision: Option<Decision>,
}

/// Two agents ticking on their own tokio tasks, talking over mpsc channels.
pub struct AgentRuntime {
    circle_sensors: SensorPort,
    rectangle_sensors: SensorPort,
    circle: JoinHandle<DomainResult<AgentOutcome>>,
    rectangle: JoinHandle<DomainResult<AgentOutcome>>,
}

impl AgentRuntime {
    /// Set both agents up, then spawn one task each. Every task stops after
    /// `decisions` decide ticks spaced `period` apart.
    pub fn spawn(
        config: &Config,
        level: &LevelInfo,
        logger: DynLogger,
        decisions: u32,
        period: Duration,
    ) -> ApplicationResult<Self> {
        let mut circle = PlannerAgent::new(AgentType::Circle, config, logger.clone());
        let mut rectangle = PlannerAgent::new(AgentType::Rectangle, config, logger);
        circle.setup(level)?;
        rectangle.setup(level)?;

        let circle_sensors = circle.sensor_port();
        let rectangle_sensors = rectangle.sensor_port();

        let (to_rectangle, rectangle_inbox) = mpsc::channel(CHANNEL_CAPACITY);
        let (to_circle, circle_inbox) = mpsc::channel(CHANNEL_CAPACITY);

        info!(decisions, period_ms = period.as_millis() as u64, "Spawning agent tasks");
        Ok(Self {
            circle_sensors,
            rectangle_sensors,
            circle: tokio::spawn(run_agent(circle, circle_inbox, to_rectangle, decisions, period)),
            rectangle: tokio::spawn(run_agent(rectangle, rectangle_inbox, to_circle, decisions, period)),
        })
    }

    pub fn sensors_updated(&self, update: SensorUpdate) {
        self.circle_sensors.sensors_updated(update.clone());
        self.rectangle_sensors.sensors_updated(update);
    }

    pub fn sensor_port(&self, agent: AgentType) -> SensorPort {
        match agent {
            AgentType::Circle => self.circle_sensors.clone(),
            AgentType::Rectangle => self.rectangle_sensors.clone(),
        }
    }

    /// Wait for both tasks. Returns (circle, rectangle).
    pub async fn join(self) -> ApplicationResult<(AgentOutcome, AgentOutcome)> {
        let circle = self.circle.await.map_err(join_error)??;
        let rectangle = self.rectangle.await.map_err(join_error)??;
        Ok((circle, rectangle))
    }
}

fn join_error(error: tokio::task::JoinError) -> ApplicationError {
    ApplicationError::Domain(DomainError::InfrastructureError(format!(
        "agent task failed: {}",
        error
    )))
}

async fn forward(agent: &mut PlannerAgent, outgoing: &mpsc::Sender<AgentMessage>) {
    for message in agent.take_outgoing() {
        if outgoing.send(message).await.is_err() {
            debug!(agent = %agent.agent_type(), "Peer task has stopped, dropping message");
        }
    }
}

async fn run_agent(
    mut agent: PlannerAgent,
    mut inbox: mpsc::Receiver<AgentMessage>,
    outgoing: mpsc::Sender<AgentMessage>,
    decisions: u32,
    period: Duration,
) -> DomainResult<AgentOutcome> {
    let mut interval = tokio::time::interval(period);
    let mut made = 0;
    let mut last_decision = None;

    forward(&mut agent, &outgoing).await;
    while made < decisions {
        tokio::select! {
            _ = interval.tick() => {
                last_decision = Some(agent.decide()?);
                made += 1;
            }
            Some(message) = inbox.recv() => {
                let mut batch = vec![message];
                while let Ok(more) = inbox.try_recv() {
                    batch.push(more);
                }
                agent.on_peer_messages(batch)?;
            }
        }
        forward(&mut agent, &outgoing).await;
    }

    // Answer whatever is still queued so the peer is not left waiting.
    let mut leftovers = Vec::new();
    while let Ok(message) = inbox.try_recv() {
        leftovers.push(message);
    }
    if !leftovers.is_empty() {
        agent.on_peer_messages(leftovers)?;
        forward(&mut agent, &outgoing).await;
    }

    debug!(agent = %agent.agent_type(), made, "Agent task finished");
    Ok(AgentOutcome {
        agent,
        decisions: made,
        last_decision,
    })
}
