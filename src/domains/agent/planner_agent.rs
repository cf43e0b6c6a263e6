use super::contract::CooperativeAgent;
use super::decision::{Decision, DecisionMode};
use super::sensors::{Outbox, SensorPort};
use crate::common::{DomainError, DomainResult, EventSourced};
use crate::config::Config;
use crate::domains::allocation::{
    AgentMessage, AllocationEvent, AllocationState, Answer, AnswerLog, AnswerMatch, Attachment,
    ClaimKind, ClaimSets, Command, MorphHint, PathReport, Request, RequestId, RequestIdGenerator,
    RequestQueue,
};
use crate::domains::graph::{Graph, Node, NodeIndex, NodeRef, NodeType};
use crate::domains::grid::{GridModel, LevelShapes};
use crate::domains::level::{AgentType, AgentsState, LevelInfo, Point, Rect, ShapeKind};
use crate::domains::logger::{DynLogger, ScopedLogger};
use crate::domains::movement::{Classification, MovementAnalyser, MovementEnvelope, Reach};
use crate::domains::search::Path;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

const ANSWER_MEMORY: usize = 64;
const SAME_COLLECTIBLE: f64 = 1e-6;

/// Everything an agent knows about the level being played.
struct LevelState {
    name: Option<String>,
    grid: GridModel,
    graph: Graph,
    classification: Classification,
    claims: ClaimSets,
    uncaught: Vec<Point>,
    agents: AgentsState,
    seen_sensor_revision: u64,
}

/// Planner for one side of the circle/rectangle pair.
///
/// Both agents run the same type. The one named as initiator in the protocol
/// configuration opens each negotiation round with `GetCheapestPath` and
/// settles contested diamonds; the other answers and obeys grants.
pub struct PlannerAgent {
    agent_type: AgentType,
    agent_id: String,
    config: Config,
    logger: DynLogger,
    sensors: SensorPort,
    outbox: Outbox,
    level: Option<LevelState>,
    state: AllocationState,
    requests: RequestQueue,
    answers: AnswerLog,
    ids: RequestIdGenerator,
    removed: BTreeSet<NodeIndex>,
    rendezvous_sent: BTreeSet<NodeIndex>,
    motor_commands: VecDeque<Command>,
    renegotiate: bool,
    version: u64,
    uncommitted_events: Vec<AllocationEvent>,
}

impl PlannerAgent {
    pub fn new(agent_type: AgentType, config: &Config, logger: DynLogger) -> Self {
        Self {
            agent_type,
            agent_id: agent_type.to_string(),
            config: config.clone(),
            logger: ScopedLogger::shared(agent_type.to_string(), logger),
            sensors: SensorPort::new(),
            outbox: Outbox::new(),
            level: None,
            state: AllocationState::Init,
            requests: RequestQueue::new(),
            answers: AnswerLog::new(ANSWER_MEMORY),
            ids: RequestIdGenerator::new(agent_type),
            removed: BTreeSet::new(),
            rendezvous_sent: BTreeSet::new(),
            motor_commands: VecDeque::new(),
            renegotiate: false,
            version: 0,
            uncommitted_events: Vec::new(),
        }
    }

    pub fn is_initiator(&self) -> bool {
        self.config.protocol.initiator == self.agent_type
    }

    pub fn state(&self) -> AllocationState {
        self.state
    }

    pub fn level_name(&self) -> Option<&str> {
        self.level.as_ref().and_then(|level| level.name.as_deref())
    }

    pub fn graph(&self) -> Option<&Graph> {
        self.level.as_ref().map(|level| &level.graph)
    }

    pub fn grid(&self) -> Option<&GridModel> {
        self.level.as_ref().map(|level| &level.grid)
    }

    pub fn claims(&self) -> Option<&ClaimSets> {
        self.level.as_ref().map(|level| &level.claims)
    }

    pub fn classification(&self) -> Option<&Classification> {
        self.level.as_ref().map(|level| &level.classification)
    }

    pub fn removed_diamonds(&self) -> &BTreeSet<NodeIndex> {
        &self.removed
    }

    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    pub fn oldest_request(&self) -> Option<&Request> {
        self.requests.peek()
    }

    /// True while a request is unanswered or a negotiation is due or running.
    pub fn has_pending_work(&self) -> bool {
        !self.requests.is_empty()
            || self.renegotiate
            || matches!(
                self.state,
                AllocationState::Init | AllocationState::AwaitingPeerCost { .. }
            )
    }

    /// Committed target as a location-based reference.
    pub fn target(&self) -> Option<NodeRef> {
        let target = self.state.target()?;
        self.graph()?.get_node(target).map(Node::to_ref)
    }

    /// Ask the peer to stretch up or squash down. Used by the motor layer
    /// while launching the circle off the rectangle.
    pub fn request_morph(&mut self, up: bool) -> RequestId {
        let command = if up { Command::MorphUp } else { Command::MorphDown };
        self.send_request(command)
    }

    /// A moving platform or obstacle reported a new rectangle. Rebuilds the
    /// grid and graph around it, repairs cached paths and reclassifies.
    pub fn shape_moved(&mut self, kind: ShapeKind, slot: usize, rect: Rect) -> DomainResult<()> {
        let agent = self.agent_type;
        let level = self.level.as_mut().ok_or_else(|| DomainError::NotSetUp {
            agent: agent.to_string(),
        })?;
        level.grid.move_shape(kind, slot, rect)?;
        let relocation = level.graph.move_shape(kind, slot, &level.grid)?;

        self.removed = self
            .removed
            .iter()
            .filter_map(|node| relocation.diamond(*node))
            .collect();
        self.rendezvous_sent = self
            .rendezvous_sent
            .iter()
            .filter_map(|node| relocation.diamond(*node))
            .collect();
        if let AllocationState::Assigned { target, kind } = self.state {
            self.state = match relocation.diamond(target) {
                Some(target) => AllocationState::Assigned { target, kind },
                None => AllocationState::Init,
            };
        }

        let classification =
            MovementAnalyser::new(&level.graph, &level.grid, &self.config.movement).classify();
        let mut claims = ClaimSets::from_classification(&classification, agent);
        for node in &self.removed {
            claims.remove(*node);
        }
        let classified = classified_event(&self.agent_id, &level.graph, &classification);
        let replaced: Vec<AllocationEvent> = relocation
            .changed
            .iter()
            .filter_map(|goal| {
                let diamond = level.graph.get_node(*goal)?.to_ref();
                Some(AllocationEvent::PathReplaced {
                    agent_id: self.agent_id.clone(),
                    goal: diamond,
                    cost: level.graph.known_path(*goal).map(Path::total_cost),
                    timestamp: Utc::now(),
                })
            })
            .collect();
        level.claims = claims;
        level.classification = classification;
        let target_lost = self.state.target().is_some_and(|target| {
            !level.claims.contains(target) || level.graph.known_path(target).is_none()
        });
        let reclassified = match self.state {
            AllocationState::Assigned { target, kind } => level
                .claims
                .kind_of(target)
                .filter(|current| *current != kind)
                .map(|_| target),
            _ => None,
        };

        self.logger.info(&format!(
            "{:?} {} moved to ({}, {}); {} cached paths changed",
            kind,
            slot,
            rect.x,
            rect.y,
            replaced.len()
        ));
        for event in replaced {
            self.add_event(event);
        }
        self.add_event(classified);
        if target_lost {
            self.logger.warn("Current target is no longer reachable, choosing again");
            self.retarget();
        } else if let Some(target) = reclassified {
            if !self.commit_to(target) {
                self.retarget();
            }
        }
        Ok(())
    }

    fn not_set_up(&self) -> DomainError {
        DomainError::NotSetUp {
            agent: self.agent_id.clone(),
        }
    }

    fn reset_protocol(&mut self) {
        self.state = AllocationState::Init;
        self.requests.clear();
        self.answers.clear();
        self.removed.clear();
        self.rendezvous_sent.clear();
        self.motor_commands.clear();
        self.renegotiate = false;
        self.outbox.drain();
    }

    fn send_request(&mut self, command: Command) -> RequestId {
        let request = Request::new(self.ids.next_id(), command);
        self.logger
            .info(&format!("Sending {} {}", request.command.name(), request.id));
        self.outbox.push(request.message());
        let id = request.id;
        self.requests.push(request);
        id
    }

    fn resolve(&self, diamond: &NodeRef) -> Option<NodeIndex> {
        self.graph()?.diamond_at(&diamond.location)
    }

    fn node_ref(&self, node: NodeIndex) -> Option<NodeRef> {
        self.graph()?.get_node(node).map(Node::to_ref)
    }

    /// Cheapest path over the solo claims, falling back to the cooperative ones.
    fn cheapest_candidate(&self) -> Option<Path> {
        let level = self.level.as_ref()?;
        level
            .graph
            .get_cheapest_path(level.claims.solo())
            .or_else(|| {
                level
                    .graph
                    .get_cheapest_path_as(level.claims.cooperative(), Reach::Lifted)
            })
    }

    fn report(&self, path: &Path) -> Option<PathReport> {
        let graph = self.graph()?;
        Some(PathReport {
            goal: graph.get_node(path.goal())?.to_ref(),
            total_cost: path.total_cost(),
            waypoints: graph.path_locations(path),
        })
    }

    fn start_round(&mut self) {
        self.renegotiate = false;
        let Some(level) = self.level.as_ref() else {
            return;
        };
        if level.claims.solo().is_empty() {
            self.update_next_diamond(None);
            return;
        }
        let request = self.send_request(Command::GetCheapestPath);
        self.state = AllocationState::AwaitingPeerCost { request };
        self.add_event(AllocationEvent::NegotiationStarted {
            agent_id: self.agent_id.clone(),
            request_id: request,
            timestamp: Utc::now(),
        });
    }

    fn commit(&mut self, path: Path) {
        let Some(level) = self.level.as_mut() else {
            return;
        };
        let target = path.goal();
        let Some(kind) = level.claims.kind_of(target) else {
            self.logger
                .warn(&format!("Refusing to commit to unclaimed node {}", target));
            return;
        };
        let Some(diamond) = level.graph.get_node(target).map(Node::to_ref) else {
            return;
        };
        let cost = path.total_cost();
        level.graph.set_known_path(path, kind.reach());
        self.state = AllocationState::Assigned { target, kind };
        self.logger.info(&format!(
            "Going for {} ({:?}, cost {:.1})",
            diamond, kind, cost
        ));
        self.add_event(AllocationEvent::TargetCommitted {
            agent_id: self.agent_id.clone(),
            target: diamond,
            kind,
            cost,
            timestamp: Utc::now(),
        });
    }

    /// Optionally drop `removed`, then commit to the cheapest remaining claim.
    fn update_next_diamond(&mut self, removed: Option<NodeIndex>) {
        if let Some(node) = removed {
            self.delete_diamond(node);
        }
        match self.cheapest_candidate() {
            Some(path) => self.commit(path),
            None => {
                let nothing_left = self.claims().map_or(true, ClaimSets::is_empty);
                self.state = if nothing_left {
                    AllocationState::Done
                } else {
                    AllocationState::Init
                };
                if nothing_left {
                    self.logger.info("No diamonds left to go for");
                }
            }
        }
    }

    /// Remove a diamond from both claim sets and the path cache. Returns false
    /// when it had already been removed.
    fn delete_diamond(&mut self, node: NodeIndex) -> bool {
        let Some(level) = self.level.as_mut() else {
            return false;
        };
        level.claims.remove(node);
        level.graph.remove_from_known_paths(node);
        if !self.removed.insert(node) {
            return false;
        }
        let Some(diamond) = level.graph.get_node(node).map(Node::to_ref) else {
            return true;
        };
        self.logger.info(&format!("Forgetting {}", diamond));
        self.add_event(AllocationEvent::DiamondRemoved {
            agent_id: self.agent_id.clone(),
            diamond,
            timestamp: Utc::now(),
        });
        true
    }

    /// The initiator opens a new round on its next tick; a responder simply
    /// takes its next cheapest claim.
    fn retarget(&mut self) {
        if self.is_initiator() {
            self.state = AllocationState::Init;
        } else {
            self.update_next_diamond(None);
        }
    }

    /// The peer says a diamond is gone or taken.
    fn forget_diamond(&mut self, node: NodeIndex) {
        let was_target = self.state.target() == Some(node);
        self.delete_diamond(node);
        if was_target || self.state == AllocationState::Init {
            self.retarget();
        }
    }

    fn accept_grant(&mut self, diamond: &NodeRef) {
        let Some(node) = self.resolve(diamond) else {
            self.logger
                .warn(&format!("Granted {} which is not in this level", diamond));
            return;
        };
        if self.state.target() == Some(node) {
            return;
        }
        let Some(level) = self.level.as_ref() else {
            return;
        };
        if !level.claims.contains(node) {
            self.logger
                .warn(&format!("Granted {} which is no longer claimed", diamond));
            return;
        }
        if !self.commit_to(node) {
            self.logger
                .warn(&format!("Granted {} but no path reaches it", diamond));
        }
    }

    /// Search a fresh path to a claimed diamond, the way its claim says the
    /// agent gets there, and commit to it.
    fn commit_to(&mut self, node: NodeIndex) -> bool {
        let path = self.level.as_ref().and_then(|level| {
            let reach = level.claims.kind_of(node)?.reach();
            let start = level.graph.own_node()?;
            level.graph.find_path_as(start, node, reach)
        });
        match path {
            Some(path) => {
                self.commit(path);
                true
            }
            None => false,
        }
    }

    /// Settle one negotiation round against the peer's cheapest path.
    fn decide_paths(&mut self, peer: PathReport) {
        let own = self
            .level
            .as_ref()
            .and_then(|level| level.graph.get_cheapest_path(level.claims.solo()));
        let Some(own) = own else {
            self.send_request(Command::CatchDiamond(peer.goal));
            self.update_next_diamond(None);
            return;
        };

        if self.resolve(&peer.goal) != Some(own.goal()) {
            self.send_request(Command::CatchDiamond(peer.goal));
            self.commit(own);
            return;
        }

        let diamond = peer.goal;
        if own.total_cost() <= peer.total_cost {
            self.logger.info(&format!(
                "Keeping {} ({:.1} against {:.1})",
                diamond,
                own.total_cost(),
                peer.total_cost
            ));
            self.send_request(Command::CatchNextDiamond(diamond));
            self.commit(own);
        } else {
            self.logger.info(&format!(
                "Conceding {} ({:.1} against {:.1})",
                diamond,
                own.total_cost(),
                peer.total_cost
            ));
            self.add_event(AllocationEvent::DiamondConceded {
                agent_id: self.agent_id.clone(),
                diamond,
                own_cost: own.total_cost(),
                peer_cost: peer.total_cost,
                timestamp: Utc::now(),
            });
            self.send_request(Command::CatchDiamond(diamond));
            self.update_next_diamond(Some(own.goal()));
        }
    }

    fn handle_request(&mut self, request: Request) {
        if let Some(answer) = self.answers.get(request.id).cloned() {
            self.logger
                .info(&format!("Answering {} again from memory", request.id));
            self.outbox.push(answer.message());
            return;
        }

        let attachment = match &request.command {
            Command::GetCheapestPath => self
                .cheapest_candidate()
                .and_then(|path| self.report(&path)),
            Command::CatchDiamond(diamond) => {
                self.accept_grant(diamond);
                None
            }
            Command::CatchNextDiamond(diamond) | Command::DeleteDiamond(diamond) => {
                // The peer lost its own target and has picked a new one alone.
                if matches!(request.command, Command::DeleteDiamond(_)) && self.is_initiator() {
                    self.renegotiate = true;
                }
                match self.resolve(diamond) {
                    Some(node) => self.forget_diamond(node),
                    None => self
                        .logger
                        .warn(&format!("Asked to drop unknown {}", diamond)),
                }
                None
            }
            motor => {
                self.motor_commands.push_back(motor.clone());
                self.add_event(AllocationEvent::MotorCommandReceived {
                    agent_id: self.agent_id.clone(),
                    from: request.id.origin,
                    command: motor.clone(),
                    timestamp: Utc::now(),
                });
                None
            }
        };

        let answer = Answer {
            id_of_request: request.id,
            attachment,
        };
        self.outbox.push(answer.message());
        self.answers.remember(answer);
    }

    fn handle_answer(&mut self, answer: Answer) {
        match self.requests.match_answer(&answer) {
            AnswerMatch::Fulfilled(request) => {
                let awaited = self.state
                    == AllocationState::AwaitingPeerCost {
                        request: request.id,
                    };
                if request.command != Command::GetCheapestPath || !awaited {
                    return;
                }
                match answer.attachment {
                    Some(report) => self.decide_paths(report),
                    None => {
                        self.logger.info("Peer has nothing to go for");
                        self.update_next_diamond(None);
                    }
                }
            }
            AnswerMatch::Duplicate => self.logger.info(&format!(
                "Ignoring repeated answer to {}",
                answer.id_of_request
            )),
            AnswerMatch::Mismatch { oldest } => {
                self.logger.warn(&format!(
                    "Missing an answer: got {}, expected {}",
                    answer.id_of_request, oldest.id
                ));
                self.outbox.push(oldest.message());
                self.add_event(AllocationEvent::ProtocolDesync {
                    agent_id: self.agent_id.clone(),
                    expected: Some(oldest.id),
                    received: answer.id_of_request,
                    timestamp: Utc::now(),
                });
            }
            AnswerMatch::NothingOutstanding => {
                self.logger.warn(&format!(
                    "Answer to {} while nothing is outstanding",
                    answer.id_of_request
                ));
                self.add_event(AllocationEvent::ProtocolDesync {
                    agent_id: self.agent_id.clone(),
                    expected: None,
                    received: answer.id_of_request,
                    timestamp: Utc::now(),
                });
            }
        }
    }

    /// A collectible vanished from the sensors.
    fn handle_catch(&mut self, location: Point) {
        let Some(node) = self.graph().and_then(|graph| graph.diamond_at(&location)) else {
            return;
        };
        if self.removed.contains(&node) {
            return;
        }
        let Some(diamond) = self.node_ref(node) else {
            return;
        };
        let was_target = self.state.target() == Some(node);
        self.add_event(AllocationEvent::DiamondCaught {
            agent_id: self.agent_id.clone(),
            diamond,
            was_target,
            timestamp: Utc::now(),
        });

        if was_target {
            self.logger.info(&format!("Caught target {}", diamond));
            self.send_request(Command::DeleteDiamond(diamond));
            self.delete_diamond(node);
            self.retarget();
        } else {
            self.logger.info(&format!("{} was caught by the other agent", diamond));
            self.send_request(Command::CatchNextDiamond(diamond));
            self.delete_diamond(node);
            if self.is_initiator() {
                self.renegotiate = true;
            }
        }
    }

    fn apply_sensors(&mut self) {
        let epsilon = self.config.protocol.position_epsilon;
        let Some(level) = self.level.as_mut() else {
            return;
        };
        let Some((revision, update)) = self.sensors.newer_than(level.seen_sensor_revision) else {
            return;
        };
        level.seen_sensor_revision = revision;

        let agents = update.agents();
        let moved = [AgentType::Circle, AgentType::Rectangle].iter().any(|agent| {
            level.agents.position_of(*agent).distance_to(&agents.position_of(*agent)) > epsilon
        });
        level.grid.update(agents);

        let mut replaced = Vec::new();
        if moved {
            level.agents = agents;
            let before: BTreeMap<NodeIndex, Vec<NodeIndex>> = level
                .graph
                .known_paths()
                .map(|path| (path.goal(), path.steps()[1..].to_vec()))
                .collect();
            level.graph.update_graph(&agents, &level.grid);
            for goal in level.graph.revalidate_known_paths() {
                let after = level.graph.known_path(goal);
                let unchanged = match (before.get(&goal), after) {
                    (Some(old), Some(new)) => old.as_slice() == &new.steps()[1..],
                    _ => false,
                };
                if unchanged {
                    continue;
                }
                if let Some(node) = level.graph.get_node(goal) {
                    replaced.push(AllocationEvent::PathReplaced {
                        agent_id: self.agent_id.clone(),
                        goal: node.to_ref(),
                        cost: after.map(Path::total_cost),
                        timestamp: Utc::now(),
                    });
                }
            }
        }

        let caught: Vec<Point> = level
            .uncaught
            .iter()
            .filter(|known| {
                !update
                    .collectibles
                    .iter()
                    .any(|seen| seen.position().distance_to(known) < SAME_COLLECTIBLE)
            })
            .copied()
            .collect();
        level
            .uncaught
            .retain(|known| !caught.iter().any(|gone| gone.distance_to(known) < SAME_COLLECTIBLE));

        let target_lost = self
            .state
            .target()
            .is_some_and(|target| level.graph.known_path(target).is_none());

        for event in replaced {
            self.add_event(event);
        }
        for location in caught {
            self.handle_catch(location);
        }
        if target_lost && self.state.target().is_some() {
            self.logger.warn("Lost the path to the current target, choosing again");
            self.retarget();
        }
    }

    fn request_rendezvous(&mut self) {
        if self.agent_type != AgentType::Circle {
            return;
        }
        let AllocationState::Assigned {
            target,
            kind: ClaimKind::Cooperative,
        } = self.state
        else {
            return;
        };
        if self.rendezvous_sent.contains(&target) {
            return;
        }
        let Some(level) = self.level.as_ref() else {
            return;
        };
        let Some(diamond) = level.graph.get_node(target) else {
            return;
        };
        let peer = level.agents.position_of(self.agent_type.peer());
        if (peer.x - diamond.location.x).abs() <= self.config.movement.coop_proximity {
            return;
        }
        if level.grid.circle_rides_rectangle() {
            return;
        }
        let x = diamond.location.x;
        self.rendezvous_sent.insert(target);
        self.send_request(Command::MoveToPosition {
            x,
            morph: MorphHint::Down,
        });
    }

    fn current_decision(&mut self) -> Decision {
        let motor_command = self.motor_commands.pop_front();
        let AllocationState::Assigned { target, kind } = self.state else {
            return Decision::idle(self.state, motor_command);
        };
        let Some(level) = self.level.as_ref() else {
            return Decision::idle(self.state, motor_command);
        };
        let graph = &level.graph;
        let Some(path) = graph.known_path(target) else {
            return Decision::idle(self.state, motor_command);
        };

        let own = level.agents.position_of(self.agent_type);
        let platform_hint = path
            .steps()
            .iter()
            .filter_map(|index| graph.get_node(*index))
            .filter(|node| node.kind == NodeType::RectanglePlatform)
            .min_by(|a, b| {
                a.location
                    .distance_to(&own)
                    .total_cmp(&b.location.distance_to(&own))
            })
            .map(|node| node.location);

        Decision {
            mode: match kind {
                ClaimKind::Solo => DecisionMode::Solo,
                ClaimKind::Cooperative => DecisionMode::Cooperative,
            },
            state: self.state,
            target: graph.get_node(target).map(Node::to_ref),
            path: graph.path_locations(path),
            path_cost: Some(path.total_cost()),
            next_waypoint: path
                .next_step()
                .and_then(|index| graph.get_node(index))
                .map(|node| node.location),
            platform_hint,
            motor_command,
        }
    }
}

fn classified_event(agent_id: &str, graph: &Graph, classification: &Classification) -> AllocationEvent {
    let refs = |nodes: &[NodeIndex]| -> Vec<NodeRef> {
        nodes
            .iter()
            .filter_map(|node| graph.get_node(*node).map(Node::to_ref))
            .collect()
    };
    let agent = graph.agent_type();
    AllocationEvent::LevelClassified {
        agent_id: agent_id.to_string(),
        solo: refs(classification.solo_for(agent)),
        cooperative: refs(&classification.cooperative),
        unreachable: refs(&classification.unreachable),
        timestamp: Utc::now(),
    }
}

impl CooperativeAgent for PlannerAgent {
    fn agent_type(&self) -> AgentType {
        self.agent_type
    }

    fn setup(&mut self, level: &LevelInfo) -> DomainResult<()> {
        self.reset_protocol();
        self.level = None;

        let shapes = LevelShapes {
            obstacles: level.obstacles.clone(),
            rectangle_platforms: level.rectangle_platforms.clone(),
            circle_platforms: level.circle_platforms.clone(),
        };
        let grid = GridModel::build(
            &self.config.grid,
            level.area,
            shapes,
            level.agents(),
            &self.config.movement,
        )?;

        let envelope = MovementEnvelope::for_agent(self.agent_type, &self.config.movement);
        let mut graph = Graph::new(self.agent_type).with_envelope(envelope);
        graph.generate_nodes(level, &grid)?;
        graph.generate_adjacency_matrix(&grid);
        for node in graph.run_initial_searches() {
            if let Some(node) = graph.get_node(node) {
                self.logger.info(&format!("No path to {}", node));
            }
        }

        let classification = MovementAnalyser::new(&graph, &grid, &self.config.movement).classify();
        for node in &classification.unreachable {
            if let Some(node) = graph.get_node(*node) {
                self.logger
                    .warn(&format!("{} cannot be caught, not even together", node));
            }
        }
        let claims = ClaimSets::from_classification(&classification, self.agent_type);
        self.logger.info(&format!(
            "Level {} ready: {} nodes, {} solo, {} cooperative, {} uncatchable",
            level.name.as_deref().unwrap_or("<unnamed>"),
            graph.nodes().len(),
            claims.solo().len(),
            claims.cooperative().len(),
            classification.unreachable.len()
        ));

        let classified = classified_event(&self.agent_id, &graph, &classification);
        self.level = Some(LevelState {
            name: level.name.clone(),
            grid,
            graph,
            classification,
            claims,
            uncaught: level.collectibles.iter().map(|c| c.position()).collect(),
            agents: level.agents(),
            seen_sensor_revision: self.sensors.revision(),
        });
        self.add_event(classified);

        if self.is_initiator() {
            self.start_round();
        } else {
            self.update_next_diamond(None);
        }
        Ok(())
    }

    fn sensor_port(&self) -> SensorPort {
        self.sensors.clone()
    }

    fn outbox(&self) -> Outbox {
        self.outbox.clone()
    }

    fn decide(&mut self) -> DomainResult<Decision> {
        if self.level.is_none() {
            return Err(self.not_set_up());
        }
        self.apply_sensors();

        if let Some(request) = self.requests.tick(self.config.protocol.retry_after_ticks) {
            self.logger
                .warn(&format!("No answer to {} yet, sending it again", request.id));
            self.outbox.push(request.message());
            self.add_event(AllocationEvent::RequestRetried {
                agent_id: self.agent_id.clone(),
                request_id: request.id,
                timestamp: Utc::now(),
            });
        }

        let awaiting = matches!(self.state, AllocationState::AwaitingPeerCost { .. });
        if self.state == AllocationState::Init {
            if self.is_initiator() {
                self.start_round();
            } else {
                self.update_next_diamond(None);
            }
        } else if self.renegotiate && !awaiting {
            self.start_round();
        }
        self.request_rendezvous();
        Ok(self.current_decision())
    }

    fn on_peer_messages(&mut self, messages: Vec<AgentMessage>) -> DomainResult<()> {
        if self.level.is_none() {
            return Err(self.not_set_up());
        }
        for message in messages {
            match message.attachment {
                Some(Attachment::Request(request)) => self.handle_request(request),
                Some(Attachment::Answer(answer)) => self.handle_answer(answer),
                None => self.logger.info(&format!("Peer says: {}", message.text)),
            }
        }
        Ok(())
    }

    fn end_game(&mut self, caught: usize, elapsed_seconds: f64) {
        self.logger.info(&format!(
            "Level over: {} diamonds caught in {:.1}s",
            caught, elapsed_seconds
        ));
        self.reset_protocol();
        self.level = None;
        self.sensors.clear();
    }
}

impl EventSourced for PlannerAgent {
    type Event = AllocationEvent;

    fn aggregate_id(&self) -> &str {
        &self.agent_id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn mark_events_as_committed(&mut self) {
        self.uncommitted_events.clear();
    }

    fn add_event(&mut self, event: Self::Event) {
        self.uncommitted_events.push(event);
        self.version += 1;
    }
}
