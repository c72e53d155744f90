//! Daily OHLCV bar representation.

use chrono::NaiveDate;

/// Shares per board lot; exchange volume thresholds are quoted in lots.
pub const SHARES_PER_LOT: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub code: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// Volume expressed in board lots of 1000 shares.
    pub fn volume_lots(&self) -> f64 {
        self.volume as f64 / SHARES_PER_LOT
    }

    /// Close-to-close return against the previous close, as a fraction.
    pub fn daily_return(&self, prev_close: f64) -> f64 {
        if prev_close == 0.0 {
            return 0.0;
        }
        (self.close - prev_close) / prev_close
    }
}

/// True when the series is strictly ascending by date.
pub fn is_sorted_by_date(bars: &[OhlcvBar]) -> bool {
    bars.windows(2).all(|w| w[0].date < w[1].date)
}
