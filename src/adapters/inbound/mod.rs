pub mod level_file;

pub use level_file::*;
