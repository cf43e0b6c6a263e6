use super::geometry::{ArenaBounds, Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentType {
    Circle,
    Rectangle,
}

impl AgentType {
    pub fn peer(&self) -> AgentType {
        match self {
            AgentType::Circle => AgentType::Rectangle,
            AgentType::Rectangle => AgentType::Circle,
        }
    }
}

impl fmt::Display for AgentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentType::Circle => write!(f, "circle"),
            AgentType::Rectangle => write!(f, "rectangle"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleState {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub velocity_x: f64,
    #[serde(default)]
    pub velocity_y: f64,
    pub radius: f64,
}

impl CircleState {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectangleState {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub velocity_x: f64,
    #[serde(default)]
    pub velocity_y: f64,
    pub height: f64,
}

impl RectangleState {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Current silhouette for a rectangle whose area stays `area` while it
    /// morphs. The sensed height is clamped to what the rectangle can morph to.
    pub fn silhouette(&self, area: f64, min_height: f64, max_height: f64) -> Rect {
        let height = self.height.max(min_height).min(max_height);
        let width = if height > 0.0 { area / height } else { 0.0 };
        Rect::new(self.x, self.y, width, height)
    }
}

/// Latest known state of both agents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentsState {
    pub circle: CircleState,
    pub rectangle: RectangleState,
}

impl AgentsState {
    pub fn position_of(&self, agent: AgentType) -> Point {
        match agent {
            AgentType::Circle => self.circle.position(),
            AgentType::Rectangle => self.rectangle.position(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub x: f64,
    pub y: f64,
}

impl Collectible {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CountInformation {
    pub obstacles: usize,
    pub rectangle_platforms: usize,
    pub circle_platforms: usize,
    pub collectibles: usize,
}

/// Everything the host hands over once when a level starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub counts: CountInformation,
    pub rectangle: RectangleState,
    pub circle: CircleState,
    #[serde(default)]
    pub obstacles: Vec<Rect>,
    #[serde(default)]
    pub rectangle_platforms: Vec<Rect>,
    #[serde(default)]
    pub circle_platforms: Vec<Rect>,
    #[serde(default)]
    pub collectibles: Vec<Collectible>,
    pub area: ArenaBounds,
    #[serde(default)]
    pub time_limit: f64,
}

impl LevelInfo {
    pub fn agents(&self) -> AgentsState {
        AgentsState {
            circle: self.circle,
            rectangle: self.rectangle,
        }
    }
}

/// Periodic sensor reading; arrives independently of the decision tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorUpdate {
    pub remaining_count: usize,
    pub rectangle: RectangleState,
    pub circle: CircleState,
    pub collectibles: Vec<Collectible>,
}

impl SensorUpdate {
    pub fn agents(&self) -> AgentsState {
        AgentsState {
            circle: self.circle,
            rectangle: self.rectangle,
        }
    }
}
