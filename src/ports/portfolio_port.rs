//! Holdings store port.

use crate::domain::error::TrendscoreError;

/// Symbol -> cost basis mapping owned by an external store.
///
/// The core only reads holdings; mutation passes through here so invalid
/// input (empty symbol, non-positive cost basis) is rejected before it can
/// reach the engine, never silently coerced.
pub trait PortfolioStore {
    fn get(&self, code: &str) -> Option<f64>;

    fn set(&mut self, code: &str, cost_basis: f64) -> Result<(), TrendscoreError>;

    fn remove(&mut self, code: &str) -> Option<f64>;

    /// All holdings as (code, cost_basis) pairs, sorted by code.
    fn list(&self) -> Vec<(String, f64)>;
}
