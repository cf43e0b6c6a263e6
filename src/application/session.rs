use crate::common::{
    ApplicationError, ApplicationResult, EventEnvelope, EventJournal, EventMetadata, EventSourced,
};
use crate::config::Config;
use crate::domains::agent::{CooperativeAgent, Decision, PlannerAgent};
use crate::domains::level::{AgentType, LevelInfo, Rect, SensorUpdate, ShapeKind};
use crate::domains::logger::DynLogger;
use tracing::{debug, info, warn};
use uuid::Uuid;

const MAX_PUMP_ROUNDS: usize = 64;

/// Final picture of a session, for printing or assertions.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub level: Option<String>,
    pub decide_ticks: u64,
    pub messages_exchanged: u64,
    pub circle: Decision,
    pub rectangle: Decision,
}

/// Both agents in one process, with messages carried between them
/// synchronously after every step. Deterministic for a given input sequence.
pub struct Session {
    circle: PlannerAgent,
    rectangle: PlannerAgent,
    correlation_id: Uuid,
    level_name: Option<String>,
    decision_interval_ticks: u32,
    host_ticks: u64,
    decide_ticks: u64,
    messages_exchanged: u64,
}

impl Session {
    pub fn new(config: &Config, logger: DynLogger) -> Self {
        Self {
            circle: PlannerAgent::new(AgentType::Circle, config, logger.clone()),
            rectangle: PlannerAgent::new(AgentType::Rectangle, config, logger),
            correlation_id: Uuid::new_v4(),
            level_name: None,
            decision_interval_ticks: config.protocol.decision_interval_ticks.max(1),
            host_ticks: 0,
            decide_ticks: 0,
            messages_exchanged: 0,
        }
    }

    /// Set both agents up for `level` and carry their first messages across.
    pub fn start(&mut self, level: &LevelInfo) -> ApplicationResult<()> {
        self.correlation_id = Uuid::new_v4();
        self.level_name = level.name.clone();
        self.host_ticks = 0;
        self.decide_ticks = 0;
        self.messages_exchanged = 0;

        self.circle.setup(level)?;
        self.rectangle.setup(level)?;
        info!(
            level = level.name.as_deref().unwrap_or("<unnamed>"),
            session = %self.correlation_id,
            "Session started"
        );
        self.pump()?;
        Ok(())
    }

    pub fn agent(&self, agent: AgentType) -> &PlannerAgent {
        match agent {
            AgentType::Circle => &self.circle,
            AgentType::Rectangle => &self.rectangle,
        }
    }

    pub fn agent_mut(&mut self, agent: AgentType) -> &mut PlannerAgent {
        match agent {
            AgentType::Circle => &mut self.circle,
            AgentType::Rectangle => &mut self.rectangle,
        }
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    /// Both agents see the same world.
    pub fn sensors_updated(&self, update: SensorUpdate) {
        self.circle.sensor_port().sensors_updated(update.clone());
        self.rectangle.sensor_port().sensors_updated(update);
    }

    pub fn shape_moved(&mut self, kind: ShapeKind, slot: usize, rect: Rect) -> ApplicationResult<()> {
        self.circle.shape_moved(kind, slot, rect)?;
        self.rectangle.shape_moved(kind, slot, rect)?;
        self.pump()?;
        Ok(())
    }

    /// Carry messages back and forth until both outboxes stay empty.
    /// Returns how many messages moved.
    pub fn pump(&mut self) -> ApplicationResult<usize> {
        let mut moved = 0;
        for _ in 0..MAX_PUMP_ROUNDS {
            let to_rectangle = self.circle.take_outgoing();
            let to_circle = self.rectangle.take_outgoing();
            if to_rectangle.is_empty() && to_circle.is_empty() {
                self.messages_exchanged += moved as u64;
                return Ok(moved);
            }
            moved += to_rectangle.len() + to_circle.len();
            for message in to_rectangle.iter().chain(to_circle.iter()) {
                debug!(text = %message.text, "Carrying message");
            }
            self.rectangle.on_peer_messages(to_rectangle)?;
            self.circle.on_peer_messages(to_circle)?;
        }
        warn!(rounds = MAX_PUMP_ROUNDS, "Agents are still talking, leaving the rest for the next tick");
        self.messages_exchanged += moved as u64;
        Ok(moved)
    }

    /// One decision for each agent, circle first, then a message pump.
    pub fn tick(&mut self) -> ApplicationResult<(Decision, Decision)> {
        let circle = self.circle.decide()?;
        self.pump()?;
        let rectangle = self.rectangle.decide()?;
        self.pump()?;
        self.decide_ticks += 1;
        Ok((circle, rectangle))
    }

    /// Host update tick. Decides every `decision_interval_ticks` calls.
    pub fn host_update(&mut self) -> ApplicationResult<Option<(Decision, Decision)>> {
        self.host_ticks += 1;
        if self.host_ticks % u64::from(self.decision_interval_ticks) != 0 {
            return Ok(None);
        }
        self.tick().map(Some)
    }

    /// Neither agent waits for an answer or a negotiation result.
    pub fn is_settled(&self) -> bool {
        !self.circle.has_pending_work() && !self.rectangle.has_pending_work()
    }

    /// Tick until settled (at least once), giving up after `max_ticks`.
    pub fn run_until_settled(&mut self, max_ticks: u64) -> ApplicationResult<SessionReport> {
        let (mut circle, mut rectangle) = self.tick()?;
        while !self.is_settled() && self.decide_ticks < max_ticks {
            (circle, rectangle) = self.tick()?;
        }
        if !self.is_settled() {
            warn!(ticks = self.decide_ticks, "Session did not settle");
        }
        Ok(SessionReport {
            level: self.level_name.clone(),
            decide_ticks: self.decide_ticks,
            messages_exchanged: self.messages_exchanged,
            circle,
            rectangle,
        })
    }

    /// Wrap both agents' new events into envelopes and mark them committed.
    pub fn drain_events(&mut self) -> ApplicationResult<Vec<EventEnvelope>> {
        let mut envelopes = Vec::new();
        for agent in [&mut self.circle, &mut self.rectangle] {
            let metadata = EventMetadata {
                correlation_id: Some(self.correlation_id),
                level: self.level_name.clone(),
                source: agent.agent_type().to_string(),
            };
            for event in agent.uncommitted_events() {
                let envelope = EventEnvelope::new(event, "PlannerAgent", metadata.clone())
                    .map_err(|e| ApplicationError::Domain(e.into()))?;
                envelopes.push(envelope);
            }
            agent.mark_events_as_committed();
        }
        envelopes.sort_by_key(|envelope| envelope.occurred_at);
        Ok(envelopes)
    }

    /// Drain events into `journal` under this session's stream.
    pub async fn flush_events(&mut self, journal: &dyn EventJournal) -> ApplicationResult<usize> {
        let envelopes = self.drain_events()?;
        let count = envelopes.len();
        if count == 0 {
            return Ok(0);
        }
        journal
            .append_events(&self.stream_id(), envelopes)
            .await
            .map_err(ApplicationError::Journal)?;
        debug!(count, "Events journaled");
        Ok(count)
    }

    pub fn stream_id(&self) -> String {
        match &self.level_name {
            Some(name) => format!("{}-{}", name, self.correlation_id),
            None => self.correlation_id.to_string(),
        }
    }

    pub fn end(&mut self, caught: usize, elapsed_seconds: f64) {
        self.circle.end_game(caught, elapsed_seconds);
        self.rectangle.end_game(caught, elapsed_seconds);
        info!(caught, elapsed_seconds, "Session ended");
    }
}
