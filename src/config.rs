use crate::domains::level::AgentType;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub grid: GridConfig,
    pub movement: MovementConfig,
    pub protocol: ProtocolConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Side of a square cell, in level units.
    pub cell_size: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovementConfig {
    pub circle_radius: f64,
    /// Highest rise the circle manages in a single jump.
    pub circle_jump_height: f64,
    pub rectangle_min_height: f64,
    pub rectangle_max_height: f64,
    /// Width * height is constant while the rectangle morphs.
    pub rectangle_area: f64,
    /// Highest ledge the rectangle can slide onto without help.
    pub rectangle_step_height: f64,
    /// Horizontal distance under which one agent counts as "delivered" next to a diamond.
    pub coop_proximity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Agent that issues GetCheapestPath and arbitrates contested diamonds.
    pub initiator: AgentType,
    /// Decide ticks an outstanding request may wait before its message is re-sent.
    pub retry_after_ticks: u32,
    /// Host update ticks between two decisions.
    pub decision_interval_ticks: u32,
    /// Agent displacement below which sensor updates do not touch the graph.
    pub position_epsilon: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    pub file: Option<String>,
    pub journal_dir: Option<String>,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Layer defaults, an optional TOML file and `GEOFRIENDS__SECTION__KEY` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Config::default())?);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        let layered = builder
            .add_source(
                config::Environment::with_prefix("GEOFRIENDS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(layered.try_deserialize()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig { cell_size: 8.0 },
            movement: MovementConfig::default(),
            protocol: ProtocolConfig {
                initiator: AgentType::Circle,
                retry_after_ticks: 8,
                decision_interval_ticks: 4,
                position_epsilon: 1.0,
            },
            logging: LoggingConfig {
                filter: "info".to_string(),
                file: None,
                journal_dir: None,
            },
        }
    }
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            circle_radius: 40.0,
            circle_jump_height: 250.0,
            rectangle_min_height: 50.0,
            rectangle_max_height: 200.0,
            rectangle_area: 10000.0,
            rectangle_step_height: 12.0,
            coop_proximity: 50.0,
        }
    }
}
