//! Core domain types and logic.

pub mod ohlcv;
pub mod error;
pub mod indicator;
pub mod signal;
pub mod monitor;
pub mod backtest;
pub mod scan;
pub mod universe;
