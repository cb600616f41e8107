mod client;
mod endpoint;
mod frame;
mod heartbeat;

pub use client::*;
pub use endpoint::*;
pub use frame::*;
pub use heartbeat::*;
