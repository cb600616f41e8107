pub mod api;
pub mod confirm;
pub mod stomp;
