//! Indicator engine: trailing-window derivations over a daily price series.
//!
//! All moving averages are simple (unweighted) trailing windows. Values are
//! undefined until (window - 1) bars have elapsed; short series are rejected
//! with `InsufficientData`, never padded.

use chrono::NaiveDate;

use crate::domain::error::TrendscoreError;
use crate::domain::ohlcv::OhlcvBar;

pub const SHORT_MA: usize = 20;
pub const LONG_MA: usize = 60;
pub const VOLUME_MA: usize = 5;
/// Bars between the two long-average readings used for the trend check.
pub const TREND_LOOKBACK: usize = 5;

/// Minimum bars for full scoring (long average must be defined).
pub const FULL_WINDOW: usize = 60;
/// Minimum bars for the lightweight variant (short average and volume only).
pub const LIGHT_WINDOW: usize = 40;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Latest-bar indicator state for one symbol.
#[derive(Debug, Clone)]
pub struct IndicatorSnapshot {
    pub date: NaiveDate,
    pub close: f64,
    pub ma20: f64,
    /// `None` when fewer than 60 bars are available (lightweight variant).
    pub ma60: Option<f64>,
    pub bias_pct: f64,
    /// ma60 today above ma60 five bars ago. False when either reading is
    /// undefined.
    pub trend_rising: bool,
    pub volatility_pct: f64,
    pub risk_level: u8,
    pub volume_lots: f64,
    pub prev_volume_lots: f64,
    pub volume_ma5_lots: f64,
    pub volume_rising: bool,
}

/// Per-bar indicator series, aligned with the input bars. `None` during
/// warmup.
#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub ma20: Vec<Option<f64>>,
    pub ma60: Vec<Option<f64>>,
    pub bias_pct: Vec<Option<f64>>,
    pub volume_ma5: Vec<Option<f64>>,
}

/// Trailing simple moving average. First (period - 1) entries are `None`.
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut running = 0.0_f64;
    for (i, &v) in values.iter().enumerate() {
        running += v;
        if i + 1 > period {
            running -= values[i - period];
        }
        if i + 1 >= period && period > 0 {
            out.push(Some(running / period as f64));
        } else {
            out.push(None);
        }
    }
    out
}

/// Annualized volatility of close-to-close returns, in percent.
///
/// Sample standard deviation of daily returns scaled by sqrt(252) x 100,
/// computed over the whole slice. Zero when fewer than three closes.
pub fn annualized_volatility(closes: &[f64]) -> f64 {
    if closes.len() < 3 {
        return 0.0;
    }
    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    let variance = returns
        .iter()
        .map(|r| {
            let d = r - mean;
            d * d
        })
        .sum::<f64>()
        / (returns.len() - 1) as f64;
    variance.sqrt() * TRADING_DAYS_PER_YEAR.sqrt() * 100.0
}

/// Map annualized volatility (percent) onto the 1..=5 risk scale.
pub fn risk_level_for(volatility_pct: f64) -> u8 {
    match volatility_pct {
        v if v < 15.0 => 1,
        v if v < 25.0 => 2,
        v if v < 35.0 => 3,
        v if v < 45.0 => 4,
        _ => 5,
    }
}

/// Compute the latest-bar snapshot for `code`.
///
/// `min_bars` is the caller's window requirement ([`FULL_WINDOW`] or
/// [`LIGHT_WINDOW`]); shorter series fail with `InsufficientData`.
pub fn compute_snapshot(
    code: &str,
    bars: &[OhlcvBar],
    min_bars: usize,
) -> Result<IndicatorSnapshot, TrendscoreError> {
    if bars.is_empty() {
        return Err(TrendscoreError::NoData {
            code: code.to_string(),
        });
    }
    if bars.len() < min_bars.max(SHORT_MA) {
        return Err(TrendscoreError::InsufficientData {
            code: code.to_string(),
            bars: bars.len(),
            minimum: min_bars.max(SHORT_MA),
        });
    }

    let n = bars.len();
    let last = &bars[n - 1];
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let ma20 = trailing_mean(&closes, SHORT_MA);
    let ma60 = (n >= LONG_MA).then(|| trailing_mean(&closes, LONG_MA));
    let bias_pct = if ma20 != 0.0 {
        (last.close - ma20) / ma20 * 100.0
    } else {
        0.0
    };

    // ma60 read five bars back; both readings must exist.
    let trend_rising = match ma60 {
        Some(current) if n >= LONG_MA + TREND_LOOKBACK => {
            let prev = trailing_mean(&closes[..n - TREND_LOOKBACK], LONG_MA);
            current > prev
        }
        _ => false,
    };

    let volatility_pct = annualized_volatility(&closes);

    let volume_lots = last.volume_lots();
    let prev_volume_lots = bars[n - 2].volume_lots();
    let lots: Vec<f64> = bars.iter().map(|b| b.volume_lots()).collect();
    let volume_ma5_lots = trailing_mean(&lots, VOLUME_MA);
    let volume_rising = volume_lots > volume_ma5_lots;

    Ok(IndicatorSnapshot {
        date: last.date,
        close: last.close,
        ma20,
        ma60,
        bias_pct,
        trend_rising,
        volatility_pct,
        risk_level: risk_level_for(volatility_pct),
        volume_lots,
        prev_volume_lots,
        volume_ma5_lots,
        volume_rising,
    })
}

/// Compute the full per-bar series used by the backtest simulator.
pub fn compute_series(bars: &[OhlcvBar]) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let lots: Vec<f64> = bars.iter().map(|b| b.volume_lots()).collect();

    let ma20 = sma(&closes, SHORT_MA);
    let ma60 = sma(&closes, LONG_MA);
    let bias_pct = closes
        .iter()
        .zip(&ma20)
        .map(|(&close, ma)| match ma {
            Some(ma) if *ma != 0.0 => Some((close - ma) / ma * 100.0),
            _ => None,
        })
        .collect();
    let volume_ma5 = sma(&lots, VOLUME_MA);

    IndicatorSeries {
        ma20,
        ma60,
        bias_pct,
        volume_ma5,
    }
}

/// Mean of the trailing `period` entries (whole slice when shorter).
fn trailing_mean(values: &[f64], period: usize) -> f64 {
    let start = values.len().saturating_sub(period);
    let window = &values[start..];
    if window.is_empty() {
        return 0.0;
    }
    window.iter().sum::<f64>() / window.len() as f64
}
