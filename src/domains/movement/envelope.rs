use crate::config::MovementConfig;
use crate::domains::graph::{Node, NodeType};
use crate::domains::level::AgentType;
use serde::{Deserialize, Serialize};

/// How an agent gets onto the diamond at the end of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reach {
    /// Under its own power.
    Alone,
    /// Launched off the fully morphed rectangle.
    Lifted,
}

/// Per-edge traversal limits of one agent.
///
/// The circle rolls and jumps: any edge may rise up to its jump height. The
/// rectangle cannot jump: it slides onto ledges no higher than a step and can
/// only stretch upwards (morph) on the final edge towards a diamond. Both may
/// drop any distance. A diamond is only ever the last node of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementEnvelope {
    pub agent: AgentType,
    pub max_rise: f64,
    pub max_rise_to_diamond: f64,
    pub max_lifted_rise_to_diamond: f64,
}

impl MovementEnvelope {
    pub fn for_agent(agent: AgentType, config: &MovementConfig) -> Self {
        let (max_rise, max_rise_to_diamond) = match agent {
            AgentType::Circle => (
                config.circle_jump_height,
                config.circle_jump_height + config.circle_radius,
            ),
            AgentType::Rectangle => (config.rectangle_step_height, config.rectangle_max_height),
        };
        Self {
            agent,
            max_rise,
            max_rise_to_diamond,
            max_lifted_rise_to_diamond: cooperative_launch_reach(config).max(max_rise_to_diamond),
        }
    }

    pub fn allows(&self, from: &Node, to: &Node) -> bool {
        self.allows_as(from, to, Reach::Alone)
    }

    pub fn allows_as(&self, from: &Node, to: &Node, reach: Reach) -> bool {
        if from.kind == NodeType::Diamond {
            return false;
        }
        let rise = from.location.rise_to(&to.location);
        let limit = match (to.kind == NodeType::Diamond, reach) {
            (false, _) => self.max_rise,
            (true, Reach::Alone) => self.max_rise_to_diamond,
            (true, Reach::Lifted) => self.max_lifted_rise_to_diamond,
        };
        rise <= limit
    }
}

/// Reach of the circle when it is launched from the fully morphed rectangle.
pub fn cooperative_launch_reach(config: &MovementConfig) -> f64 {
    config.circle_jump_height + config.rectangle_max_height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::graph::NodeIndex;
    use crate::domains::level::Point;

    fn node(index: usize, x: f64, y: f64, kind: NodeType) -> Node {
        Node::new(NodeIndex(index), Point::new(x, y), kind)
    }

    #[test]
    fn rectangle_only_morphs_on_the_last_edge() {
        let envelope = MovementEnvelope::for_agent(AgentType::Rectangle, &MovementConfig::default());
        let ground = node(0, 100.0, 700.0, NodeType::Rectangle);
        let ledge = node(1, 200.0, 600.0, NodeType::Obstacle);
        let diamond = node(2, 100.0, 550.0, NodeType::Diamond);

        assert!(!envelope.allows(&ground, &ledge));
        assert!(envelope.allows(&ground, &diamond));
        assert!(envelope.allows(&ledge, &ground));
    }

    #[test]
    fn nothing_leaves_a_diamond() {
        let envelope = MovementEnvelope::for_agent(AgentType::Circle, &MovementConfig::default());
        let diamond = node(0, 0.0, 100.0, NodeType::Diamond);
        let below = node(1, 0.0, 300.0, NodeType::Obstacle);
        assert!(!envelope.allows(&diamond, &below));
        assert!(!envelope.allows_as(&diamond, &below, Reach::Lifted));
    }

    #[test]
    fn a_lift_only_helps_on_the_final_edge() {
        let envelope = MovementEnvelope::for_agent(AgentType::Circle, &MovementConfig::default());
        let floor = node(0, 100.0, 560.0, NodeType::Circle);
        let high = node(1, 100.0, 160.0, NodeType::Diamond);
        let ledge = node(2, 100.0, 160.0, NodeType::Obstacle);

        assert!(!envelope.allows(&floor, &high));
        assert!(envelope.allows_as(&floor, &high, Reach::Lifted));
        assert!(!envelope.allows_as(&floor, &ledge, Reach::Lifted));
    }
}
