use crate::domains::level::AgentType;
use serde::{Deserialize, Serialize};

/// One square of the discretized level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub column: usize,
    pub row: usize,
    pub blocked_for_circle: bool,
    pub blocked_for_rectangle: bool,
}

impl Cell {
    pub fn new(column: usize, row: usize) -> Self {
        Self {
            column,
            row,
            blocked_for_circle: false,
            blocked_for_rectangle: false,
        }
    }

    pub fn is_blocked_for(&self, agent: AgentType) -> bool {
        match agent {
            AgentType::Circle => self.blocked_for_circle,
            AgentType::Rectangle => self.blocked_for_rectangle,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.blocked_for_circle = false;
        self.blocked_for_rectangle = false;
    }
}
