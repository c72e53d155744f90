//! Market data access port.

use crate::domain::error::TrendscoreError;
use crate::domain::ohlcv::OhlcvBar;

/// Daily bar retrieval for one symbol.
///
/// Implementations return bars ascending by date. Missing symbols map to
/// `NoData`, short history to `InsufficientData`, transport or parse
/// failures to `Provider` — all recoverable per symbol within a batch.
pub trait MarketDataProvider {
    fn fetch_daily(&self, code: &str, lookback_days: u32)
        -> Result<Vec<OhlcvBar>, TrendscoreError>;
}
