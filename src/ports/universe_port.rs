//! Symbol universe listing port.

use crate::domain::error::TrendscoreError;

/// Ordered symbol listing from an external universe source.
///
/// Callers fall back to [`crate::domain::universe::DEFAULT_SYMBOLS`] when
/// listing fails or comes back empty; freshness caching is the provider's
/// concern, not the core's.
pub trait UniverseProvider {
    fn list_symbols(&self) -> Result<Vec<String>, TrendscoreError>;
}
