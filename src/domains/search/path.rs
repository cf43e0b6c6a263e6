use crate::domains::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Ordered walk from a start node to a goal node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    steps: Vec<NodeIndex>,
    total_cost: f64,
}

impl Path {
    /// `steps` must hold at least the start node.
    pub fn new(steps: Vec<NodeIndex>, total_cost: f64) -> Option<Self> {
        if steps.is_empty() {
            return None;
        }
        Some(Self { steps, total_cost })
    }

    pub fn start(&self) -> NodeIndex {
        self.steps[0]
    }

    pub fn goal(&self) -> NodeIndex {
        self.steps[self.steps.len() - 1]
    }

    pub fn steps(&self) -> &[NodeIndex] {
        &self.steps
    }

    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Consecutive (from, to) pairs along the path.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex)> + '_ {
        self.steps.windows(2).map(|pair| (pair[0], pair[1]))
    }

    /// Node following the start, if the path has one.
    pub fn next_step(&self) -> Option<NodeIndex> {
        self.steps.get(1).copied()
    }
}
