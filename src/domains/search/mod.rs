pub mod astar;
pub mod path;

pub use astar::*;
pub use path::*;
