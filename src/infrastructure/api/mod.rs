mod control_api;

pub use control_api::*;
