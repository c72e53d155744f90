//! Port traits for external collaborators.

pub mod config_port;
pub mod data_port;
pub mod notify_port;
pub mod portfolio_port;
pub mod universe_port;
