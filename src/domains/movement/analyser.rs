use super::envelope::{cooperative_launch_reach, MovementEnvelope};
use crate::config::MovementConfig;
use crate::domains::graph::{Graph, NodeIndex, NodeType};
use crate::domains::grid::GridModel;
use crate::domains::level::AgentType;
use crate::domains::search::Path;
use serde::{Deserialize, Serialize};

/// Outcome of classifying every diamond of a level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub circle_solo: Vec<NodeIndex>,
    pub rectangle_solo: Vec<NodeIndex>,
    pub cooperative: Vec<NodeIndex>,
    pub unreachable: Vec<NodeIndex>,
}

impl Classification {
    pub fn solo_for(&self, agent: AgentType) -> &[NodeIndex] {
        match agent {
            AgentType::Circle => &self.circle_solo,
            AgentType::Rectangle => &self.rectangle_solo,
        }
    }
}

/// Decides who can reach which diamond, alone or together.
///
/// Holds one view of the waypoint graph per agent type; both views share node
/// indices, so answers can be compared directly.
pub struct MovementAnalyser {
    config: MovementConfig,
    circle_view: Graph,
    rectangle_view: Graph,
}

impl MovementAnalyser {
    pub fn new(graph: &Graph, grid: &GridModel, config: &MovementConfig) -> Self {
        let view = |agent: AgentType| {
            let view = if graph.agent_type() == agent {
                graph.clone()
            } else {
                graph.view_as(agent, grid)
            };
            view.with_envelope(MovementEnvelope::for_agent(agent, config))
        };
        Self {
            config: config.clone(),
            circle_view: view(AgentType::Circle),
            rectangle_view: view(AgentType::Rectangle),
        }
    }

    pub fn envelope(&self, agent: AgentType) -> MovementEnvelope {
        MovementEnvelope::for_agent(agent, &self.config)
    }

    fn view(&self, agent: AgentType) -> &Graph {
        match agent {
            AgentType::Circle => &self.circle_view,
            AgentType::Rectangle => &self.rectangle_view,
        }
    }

    /// Shortest walk for `agent` that keeps every edge inside its envelope.
    /// The same search an agent's own enveloped graph runs.
    pub fn constrained_path(&self, agent: AgentType, start: NodeIndex, goal: NodeIndex) -> Option<Path> {
        self.view(agent).find_path(start, goal)
    }

    pub fn can_agent_get_alone(&self, agent_node: NodeIndex, diamond_node: NodeIndex) -> bool {
        let agent = match self.circle_view.get_node(agent_node).map(|node| node.kind) {
            Some(NodeType::Circle) => AgentType::Circle,
            Some(NodeType::Rectangle) => AgentType::Rectangle,
            _ => return false,
        };
        self.constrained_path(agent, agent_node, diamond_node).is_some()
    }

    fn reaches(&self, agent: AgentType, target: NodeIndex) -> bool {
        match self.view(agent).agent_node(agent) {
            Some(start) if start == target => true,
            Some(start) => self.constrained_path(agent, start, target).is_some(),
            None => false,
        }
    }

    /// True when the rectangle can carry the circle to a support point close
    /// enough under the diamond for a launch to reach it.
    pub fn can_both_get_cooperatively(&self, diamond_node: NodeIndex) -> bool {
        let Some(diamond) = self.circle_view.get_node(diamond_node) else {
            return false;
        };
        let reach = cooperative_launch_reach(&self.config);

        self.circle_view.nodes().iter().any(|support| {
            if support.kind == NodeType::Diamond {
                return false;
            }
            let close_enough = (support.location.x - diamond.location.x).abs() <= self.config.coop_proximity;
            let rise = support.location.rise_to(&diamond.location);
            close_enough
                && rise <= reach
                && self.circle_view.is_adjacent(support.index, diamond_node)
                && self.reaches(AgentType::Rectangle, support.index)
                && self.reaches(AgentType::Circle, support.index)
        })
    }

    /// Solo-reachable diamonds go to the agents that reach them and never to
    /// the cooperative set; the rest are cooperative or unreachable.
    pub fn classify(&self) -> Classification {
        let mut classification = Classification::default();
        let circle_node = self.circle_view.agent_node(AgentType::Circle);
        let rectangle_node = self.rectangle_view.agent_node(AgentType::Rectangle);

        for diamond in self.circle_view.diamond_nodes().iter().copied() {
            let circle_alone = circle_node.is_some_and(|node| self.can_agent_get_alone(node, diamond));
            let rectangle_alone = rectangle_node.is_some_and(|node| self.can_agent_get_alone(node, diamond));

            if circle_alone {
                classification.circle_solo.push(diamond);
            }
            if rectangle_alone {
                classification.rectangle_solo.push(diamond);
            }
            if !circle_alone && !rectangle_alone {
                if self.can_both_get_cooperatively(diamond) {
                    classification.cooperative.push(diamond);
                } else {
                    classification.unreachable.push(diamond);
                }
            }
        }
        classification
    }
}
