pub mod agent;
pub mod allocation;
pub mod graph;
pub mod grid;
pub mod level;
pub mod logger;
pub mod movement;
pub mod ports;
pub mod search;

pub use agent::*;
pub use allocation::*;
pub use graph::*;
pub use grid::*;
pub use level::*;
pub use logger::*;
pub use movement::*;
pub use ports::*;
pub use search::*;
