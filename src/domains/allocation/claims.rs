use crate::domains::graph::NodeIndex;
use crate::domains::level::AgentType;
use crate::domains::movement::{Classification, Reach};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimKind {
    Solo,
    Cooperative,
}

impl ClaimKind {
    /// How the agent finishes a walk to a diamond of this kind.
    pub fn reach(&self) -> Reach {
        match self {
            ClaimKind::Solo => Reach::Alone,
            ClaimKind::Cooperative => Reach::Lifted,
        }
    }
}

/// Diamonds one agent may still go for. A node sits in at most one set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimSets {
    solo: Vec<NodeIndex>,
    cooperative: Vec<NodeIndex>,
}

impl ClaimSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_classification(classification: &Classification, agent: AgentType) -> Self {
        let mut claims = Self::new();
        for node in classification.solo_for(agent) {
            claims.insert(*node, ClaimKind::Solo);
        }
        for node in &classification.cooperative {
            claims.insert(*node, ClaimKind::Cooperative);
        }
        claims
    }

    /// Solo wins over cooperative; inserting an already solo node as
    /// cooperative is a no-op.
    pub fn insert(&mut self, node: NodeIndex, kind: ClaimKind) {
        match (kind, self.kind_of(node)) {
            (_, Some(ClaimKind::Solo)) => {}
            (ClaimKind::Cooperative, Some(ClaimKind::Cooperative)) => {}
            (ClaimKind::Solo, Some(ClaimKind::Cooperative)) => {
                self.cooperative.retain(|other| *other != node);
                self.solo.push(node);
            }
            (ClaimKind::Solo, None) => self.solo.push(node),
            (ClaimKind::Cooperative, None) => self.cooperative.push(node),
        }
    }

    /// Drop `node` from both sets. True when it was claimed.
    pub fn remove(&mut self, node: NodeIndex) -> bool {
        let before = self.solo.len() + self.cooperative.len();
        self.solo.retain(|other| *other != node);
        self.cooperative.retain(|other| *other != node);
        before != self.solo.len() + self.cooperative.len()
    }

    pub fn kind_of(&self, node: NodeIndex) -> Option<ClaimKind> {
        if self.solo.contains(&node) {
            Some(ClaimKind::Solo)
        } else if self.cooperative.contains(&node) {
            Some(ClaimKind::Cooperative)
        } else {
            None
        }
    }

    pub fn contains(&self, node: NodeIndex) -> bool {
        self.kind_of(node).is_some()
    }

    pub fn solo(&self) -> &[NodeIndex] {
        &self.solo
    }

    pub fn cooperative(&self) -> &[NodeIndex] {
        &self.cooperative
    }

    pub fn is_empty(&self) -> bool {
        self.solo.is_empty() && self.cooperative.is_empty()
    }

    pub fn len(&self) -> usize {
        self.solo.len() + self.cooperative.len()
    }

    pub fn clear(&mut self) {
        self.solo.clear();
        self.cooperative.clear();
    }
}
