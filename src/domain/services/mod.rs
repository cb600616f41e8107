pub mod actions;
mod app_state;
pub mod events;
mod feedback_display;
mod outbox;
mod scheduler;
mod session_sync;
mod snapshots;
mod subscriptions;
mod workspace;

#[cfg(test)]
pub mod fakes;

pub use app_state::*;
pub use feedback_display::*;
pub use outbox::*;
pub use scheduler::*;
pub use session_sync::*;
pub use snapshots::*;
pub use subscriptions::*;
pub use workspace::*;
