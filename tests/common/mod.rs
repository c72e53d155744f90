#![allow(dead_code)]

use chrono::NaiveDate;
use std::collections::HashMap;

use trendscore::domain::error::TrendscoreError;
pub use trendscore::domain::ohlcv::OhlcvBar;
use trendscore::ports::data_port::MarketDataProvider;
use trendscore::ports::universe_port::UniverseProvider;

pub struct MockProvider {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub universe_fails: bool,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            universe_fails: false,
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }

    pub fn with_failing_universe(mut self) -> Self {
        self.universe_fails = true;
        self
    }
}

impl MarketDataProvider for MockProvider {
    fn fetch_daily(
        &self,
        code: &str,
        _lookback_days: u32,
    ) -> Result<Vec<OhlcvBar>, TrendscoreError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(TrendscoreError::Provider {
                code: code.to_string(),
                reason: reason.clone(),
            });
        }
        match self.data.get(code) {
            Some(bars) => Ok(bars.clone()),
            None => Err(TrendscoreError::NoData {
                code: code.to_string(),
            }),
        }
    }
}

impl UniverseProvider for MockProvider {
    fn list_symbols(&self) -> Result<Vec<String>, TrendscoreError> {
        if self.universe_fails {
            return Err(TrendscoreError::Provider {
                code: "universe".into(),
                reason: "listing unavailable".into(),
            });
        }
        let mut codes: Vec<String> = self.data.keys().cloned().collect();
        codes.sort();
        Ok(codes)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(code: &str, day_offset: i64, close: f64, volume: i64) -> OhlcvBar {
    OhlcvBar {
        code: code.to_string(),
        date: date(2024, 1, 1) + chrono::Duration::days(day_offset),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume,
    }
}

/// Flat series: every close identical.
pub fn flat_bars(code: &str, count: usize, close: f64) -> Vec<OhlcvBar> {
    (0..count)
        .map(|i| make_bar(code, i as i64, close, 1_000_000))
        .collect()
}

/// Gentle climb that keeps ma20 above ma60 with a small positive bias, so
/// the pullback entry rule fires once warmed up.
pub fn climbing_bars(code: &str, count: usize) -> Vec<OhlcvBar> {
    (0..count)
        .map(|i| make_bar(code, i as i64, 100.0 + i as f64 * 0.3, 2_000_000))
        .collect()
}
