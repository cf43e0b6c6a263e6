use crate::domains::allocation::{AllocationState, Command};
use crate::domains::graph::NodeRef;
use crate::domains::level::Point;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionMode {
    Solo,
    Cooperative,
    Idle,
}

/// What the motor layer gets from one decide tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub mode: DecisionMode,
    pub state: AllocationState,
    pub target: Option<NodeRef>,
    pub path: Vec<Point>,
    pub path_cost: Option<f64>,
    /// First waypoint after the agent's own position.
    pub next_waypoint: Option<Point>,
    /// Rectangle-platform corner on the current path closest to the agent.
    pub platform_hint: Option<Point>,
    /// Motor command received from the peer, handed over once.
    pub motor_command: Option<Command>,
}

impl Decision {
    pub fn idle(state: AllocationState, motor_command: Option<Command>) -> Self {
        Self {
            mode: DecisionMode::Idle,
            state,
            target: None,
            path: Vec::new(),
            path_cost: None,
            next_waypoint: None,
            platform_hint: None,
            motor_command,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.mode == DecisionMode::Idle
    }
}
