//! WebSocket support for the admin dashboard.
//!
//! Admins connect via WebSocket and receive a push notification whenever a
//! reservation is created or changes status, instead of polling the list.

mod manager;
mod protocol;

pub use manager::ConnectionManager;
pub use protocol::*;
