//! Concrete adapter implementations for ports.

pub mod console_notifier;
pub mod csv_data;
pub mod file_config_adapter;
pub mod memory_portfolio;
