pub mod runtime;
pub mod session;

pub use runtime::*;
pub use session::*;
