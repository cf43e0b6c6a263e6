#![allow(dead_code)]

use geofriends_planner::adapters::outbound::init_noop_logger;
use geofriends_planner::domains::allocation::{AgentMessage, Attachment, Command, Request};
use geofriends_planner::domains::level::{
    ArenaBounds, CircleState, Collectible, CountInformation, LevelInfo, Rect, RectangleState, SensorUpdate,
};
use geofriends_planner::domains::logger::{DomainLogger, DynLogger};
use std::sync::{Arc, Mutex};

pub struct CaptureLogger {
    pub messages: Arc<Mutex<Vec<String>>>,
}

impl CaptureLogger {
    pub fn new() -> Self {
        Self { messages: Arc::new(Mutex::new(Vec::new())) }
    }

    pub fn lines(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl DomainLogger for CaptureLogger {
    fn info(&self, msg: &str) { self.messages.lock().unwrap().push(format!("INFO:{}", msg)); }
    fn warn(&self, msg: &str) { self.messages.lock().unwrap().push(format!("WARN:{}", msg)); }
    fn error(&self, msg: &str) { self.messages.lock().unwrap().push(format!("ERR:{}", msg)); }
}

pub fn quiet() -> DynLogger {
    init_noop_logger()
}

pub struct LevelBuilder {
    level: LevelInfo,
}

impl LevelBuilder {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            level: LevelInfo {
                name: Some("test".to_string()),
                counts: CountInformation::default(),
                rectangle: RectangleState { x: 0.0, y: 0.0, velocity_x: 0.0, velocity_y: 0.0, height: 100.0 },
                circle: CircleState { x: 0.0, y: 0.0, velocity_x: 0.0, velocity_y: 0.0, radius: 40.0 },
                obstacles: vec![],
                rectangle_platforms: vec![],
                circle_platforms: vec![],
                collectibles: vec![],
                area: ArenaBounds::new(0.0, 0.0, width, height),
                time_limit: 120.0,
            },
        }
    }

    pub fn circle(mut self, x: f64, y: f64) -> Self {
        self.level.circle.x = x;
        self.level.circle.y = y;
        self
    }

    pub fn rectangle(mut self, x: f64, y: f64) -> Self {
        self.level.rectangle.x = x;
        self.level.rectangle.y = y;
        self
    }

    pub fn obstacle(mut self, rect: Rect) -> Self {
        self.level.obstacles.push(rect);
        self
    }

    pub fn rectangle_platform(mut self, rect: Rect) -> Self {
        self.level.rectangle_platforms.push(rect);
        self
    }

    pub fn circle_platform(mut self, rect: Rect) -> Self {
        self.level.circle_platforms.push(rect);
        self
    }

    pub fn diamond(mut self, x: f64, y: f64) -> Self {
        self.level.collectibles.push(Collectible { x, y });
        self
    }

    pub fn build(mut self) -> LevelInfo {
        self.level.counts = CountInformation {
            obstacles: self.level.obstacles.len(),
            rectangle_platforms: self.level.rectangle_platforms.len(),
            circle_platforms: self.level.circle_platforms.len(),
            collectibles: self.level.collectibles.len(),
        };
        self.level
    }
}

/// Two agents on an open floor, each closest to one of two diamonds.
pub fn open_floor() -> LevelInfo {
    LevelBuilder::new(800.0, 600.0)
        .circle(100.0, 560.0)
        .rectangle(700.0, 550.0)
        .diamond(200.0, 560.0)
        .diamond(600.0, 560.0)
        .build()
}

/// Both agents want the diamond at (180, 560); the rectangle is closer.
pub fn contested_floor() -> LevelInfo {
    LevelBuilder::new(800.0, 600.0)
        .circle(100.0, 560.0)
        .rectangle(250.0, 550.0)
        .diamond(180.0, 560.0)
        .diamond(700.0, 560.0)
        .build()
}

/// Sensor reading with the agents where the level put them.
pub fn sensors_for(level: &LevelInfo, collectibles: Vec<Collectible>) -> SensorUpdate {
    SensorUpdate {
        remaining_count: collectibles.len(),
        rectangle: level.rectangle,
        circle: level.circle,
        collectibles,
    }
}

pub fn requests(messages: &[AgentMessage]) -> Vec<Request> {
    messages
        .iter()
        .filter_map(|message| match &message.attachment {
            Some(Attachment::Request(request)) => Some(request.clone()),
            _ => None,
        })
        .collect()
}

pub fn commands(messages: &[AgentMessage]) -> Vec<Command> {
    requests(messages).into_iter().map(|request| request.command).collect()
}
