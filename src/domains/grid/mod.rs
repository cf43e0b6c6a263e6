pub mod cell;
pub mod grid_model;

pub use cell::*;
pub use grid_model::*;
