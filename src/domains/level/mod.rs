pub mod geometry;
pub mod representation;

pub use geometry::*;
pub use representation::*;
