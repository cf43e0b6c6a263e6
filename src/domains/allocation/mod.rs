pub mod claims;
pub mod events;
pub mod protocol;
pub mod request_queue;
pub mod state;

pub use claims::*;
pub use events::*;
pub use protocol::*;
pub use request_queue::*;
pub use state::*;
