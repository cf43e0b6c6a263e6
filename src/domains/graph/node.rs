use crate::domains::level::{Point, ShapeKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a node inside its graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Circle,
    Rectangle,
    Obstacle,
    CirclePlatform,
    RectanglePlatform,
    Diamond,
}

impl NodeType {
    pub fn is_surface(&self) -> bool {
        matches!(
            self,
            NodeType::Obstacle | NodeType::CirclePlatform | NodeType::RectanglePlatform
        )
    }
}

impl From<ShapeKind> for NodeType {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Obstacle => NodeType::Obstacle,
            ShapeKind::CirclePlatform => NodeType::CirclePlatform,
            ShapeKind::RectanglePlatform => NodeType::RectanglePlatform,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub index: NodeIndex,
    pub location: Point,
    pub kind: NodeType,
}

impl Node {
    pub fn new(index: NodeIndex, location: Point, kind: NodeType) -> Self {
        Self {
            index,
            location,
            kind,
        }
    }

    pub fn to_ref(&self) -> NodeRef {
        NodeRef {
            kind: self.kind,
            location: self.location,
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{} at {}", self.kind, self.index, self.location)
    }
}

/// A node as seen from the other agent. Arenas are per agent, so nodes cross
/// the message channel by kind and location and are resolved on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeRef {
    pub kind: NodeType,
    pub location: Point,
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at {}", self.kind, self.location)
    }
}
