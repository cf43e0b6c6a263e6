pub mod analyser;
pub mod envelope;

pub use analyser::*;
pub use envelope::*;
