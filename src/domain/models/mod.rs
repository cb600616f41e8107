mod action;
mod assignment;
mod channel;
mod clock;
mod command;
mod confirm;
mod control_action;
mod control_message;
mod errors;
mod event;
mod handler;
mod notice;
mod output_region;
mod snapshot;
mod textarea;
mod topic;

pub use action::*;
pub use assignment::*;
pub use channel::*;
pub use clock::*;
pub use command::*;
pub use confirm::*;
pub use control_action::*;
pub use control_message::*;
pub use errors::*;
pub use event::*;
pub use handler::*;
pub use notice::*;
pub use output_region::*;
pub use snapshot::*;
pub use textarea::*;
pub use topic::*;
