pub mod contract;
pub mod decision;
pub mod planner_agent;
pub mod sensors;

pub use contract::*;
pub use decision::*;
pub use planner_agent::*;
pub use sensors::*;
