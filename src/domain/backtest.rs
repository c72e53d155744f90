//! Historical trade simulation for the pullback entry rule.
//!
//! Every bar where the entry rule fires opens an independent trade held for a
//! fixed horizon, with a stop-loss override scanned against intervening lows.
//! Trades may overlap; no capital or position sizing is modeled. The
//! simulator measures signal quality, not a tradable portfolio.

use chrono::NaiveDate;

use crate::domain::error::TrendscoreError;
use crate::domain::indicator::{self, LONG_MA};
use crate::domain::ohlcv::OhlcvBar;

/// Bars recommended for a meaningful run; the hard floor is the long average.
pub const RECOMMENDED_BARS: usize = 100;

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    /// Holding horizon in bars.
    pub holding_period: usize,
    /// Stop-loss distance from entry, percent (positive).
    pub stop_loss_pct: f64,
    /// Upper bias bound of the entry band, percent.
    pub entry_max_bias: f64,
    /// Stricter variant: also require volume above its 5-day average at entry.
    pub require_volume_rising: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            holding_period: 10,
            stop_loss_pct: 5.0,
            entry_max_bias: 3.5,
            require_volume_rising: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Horizon,
    StopLoss,
}

/// One simulated trade; immutable once recorded.
#[derive(Debug, Clone)]
pub struct TradeRecord {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub return_pct: f64,
    pub exit_reason: ExitReason,
}

/// Run outcome. `NoSignal` is deliberately distinct from a 0% win rate.
#[derive(Debug, Clone)]
pub enum BacktestReport {
    /// No bar satisfied the entry rule within the simulatable range.
    NoSignal,
    Completed {
        trades: Vec<TradeRecord>,
        /// Percent of trades with a positive return.
        win_rate: f64,
        /// Mean return across all trades, percent.
        avg_return: f64,
    },
}

/// Simulate the entry rule over `bars`.
///
/// Entry at bar t: `ma20[t] > ma60[t]` and `0 < bias[t] <= entry_max_bias`
/// (optionally volume above its 5-day mean), with `t + holding_period` in
/// range. A low breaching `entry * (1 - stop)` during the hold records
/// exactly `-stop_loss_pct` — a fixed-loss approximation, independent of the
/// breach depth.
pub fn simulate(bars: &[OhlcvBar], cfg: &BacktestConfig) -> Result<BacktestReport, TrendscoreError> {
    if cfg.holding_period == 0 {
        return Err(TrendscoreError::InvalidInput {
            reason: "holding period must be at least one bar".into(),
        });
    }
    if cfg.stop_loss_pct <= 0.0 {
        return Err(TrendscoreError::InvalidInput {
            reason: "stop loss percent must be positive".into(),
        });
    }
    let code = bars.first().map(|b| b.code.as_str()).unwrap_or_default();
    if bars.len() < LONG_MA {
        return Err(TrendscoreError::InsufficientData {
            code: code.to_string(),
            bars: bars.len(),
            minimum: LONG_MA,
        });
    }

    let series = indicator::compute_series(bars);
    let mut trades = Vec::new();

    for t in 0..bars.len() {
        if t + cfg.holding_period >= bars.len() {
            break;
        }
        let (Some(ma20), Some(ma60), Some(bias)) =
            (series.ma20[t], series.ma60[t], series.bias_pct[t])
        else {
            continue;
        };
        if ma20 <= ma60 || bias <= 0.0 || bias > cfg.entry_max_bias {
            continue;
        }
        if cfg.require_volume_rising {
            let Some(volume_ma5) = series.volume_ma5[t] else {
                continue;
            };
            if bars[t].volume_lots() <= volume_ma5 {
                continue;
            }
        }

        trades.push(simulate_trade(bars, t, cfg));
    }

    if trades.is_empty() {
        return Ok(BacktestReport::NoSignal);
    }

    let wins = trades.iter().filter(|t| t.return_pct > 0.0).count();
    let win_rate = wins as f64 / trades.len() as f64 * 100.0;
    let avg_return = trades.iter().map(|t| t.return_pct).sum::<f64>() / trades.len() as f64;

    Ok(BacktestReport::Completed {
        trades,
        win_rate,
        avg_return,
    })
}

fn simulate_trade(bars: &[OhlcvBar], entry: usize, cfg: &BacktestConfig) -> TradeRecord {
    let entry_price = bars[entry].close;
    let stop_price = entry_price * (1.0 - cfg.stop_loss_pct / 100.0);

    // Lows from the bar after entry through the horizon bar.
    for bar in &bars[entry + 1..=entry + cfg.holding_period] {
        if bar.low <= stop_price {
            return TradeRecord {
                entry_date: bars[entry].date,
                entry_price,
                exit_date: bar.date,
                exit_price: stop_price,
                return_pct: -cfg.stop_loss_pct,
                exit_reason: ExitReason::StopLoss,
            };
        }
    }

    let exit_bar = &bars[entry + cfg.holding_period];
    TradeRecord {
        entry_date: bars[entry].date,
        entry_price,
        exit_date: exit_bar.date,
        exit_price: exit_bar.close,
        return_pct: (exit_bar.close - entry_price) / entry_price * 100.0,
        exit_reason: ExitReason::Horizon,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_bars(closes: &[f64]) -> Vec<OhlcvBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                code: "TEST".into(),
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 2_000_000,
            })
            .collect()
    }

    /// Slow climb: ma20 stays above ma60 with a small positive bias, so the
    /// entry rule fires on most bars once the warmup has elapsed.
    fn climbing_bars(count: usize) -> Vec<OhlcvBar> {
        let closes: Vec<f64> = (0..count).map(|i| 100.0 + i as f64 * 0.3).collect();
        make_bars(&closes)
    }

    #[test]
    fn rejects_short_series() {
        let bars = climbing_bars(50);
        let err = simulate(&bars, &BacktestConfig::default()).unwrap_err();
        assert!(matches!(err, TrendscoreError::InsufficientData { .. }));
    }

    #[test]
    fn rejects_zero_holding_period() {
        let cfg = BacktestConfig {
            holding_period: 0,
            ..BacktestConfig::default()
        };
        let err = simulate(&climbing_bars(120), &cfg).unwrap_err();
        assert!(matches!(err, TrendscoreError::InvalidInput { .. }));
    }

    #[test]
    fn flat_series_reports_no_signal() {
        // Zero bias everywhere: the strictly-positive band never opens.
        let bars = make_bars(&[100.0; 120]);
        let report = simulate(&bars, &BacktestConfig::default()).unwrap();
        assert!(matches!(report, BacktestReport::NoSignal));
    }

    #[test]
    fn climbing_series_produces_horizon_wins() {
        let report = simulate(&climbing_bars(120), &BacktestConfig::default()).unwrap();
        let BacktestReport::Completed {
            trades,
            win_rate,
            avg_return,
        } = report
        else {
            panic!("expected completed report");
        };
        assert!(!trades.is_empty());
        assert!(trades.iter().all(|t| t.exit_reason == ExitReason::Horizon));
        assert_relative_eq!(win_rate, 100.0);
        assert!(avg_return > 0.0);
    }

    #[test]
    fn stop_loss_records_fixed_return() {
        // Uptrend long enough to arm the entry rule, then a crash. The low
        // falls far beyond the stop, but the recorded loss stays fixed.
        let mut closes: Vec<f64> = (0..100).map(|i| 100.0 + i as f64 * 0.3).collect();
        closes.extend([128.0, 110.0, 108.0, 107.0, 106.0, 105.0, 104.0, 103.0, 102.0, 101.0]);
        let bars = make_bars(&closes);

        let cfg = BacktestConfig {
            holding_period: 10,
            stop_loss_pct: 5.0,
            ..BacktestConfig::default()
        };
        let report = simulate(&bars, &cfg).unwrap();
        let BacktestReport::Completed { trades, .. } = report else {
            panic!("expected completed report");
        };
        let stopped: Vec<_> = trades
            .iter()
            .filter(|t| t.exit_reason == ExitReason::StopLoss)
            .collect();
        assert!(!stopped.is_empty());
        for trade in stopped {
            assert_relative_eq!(trade.return_pct, -5.0);
            assert_relative_eq!(
                trade.exit_price,
                trade.entry_price * 0.95,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn horizon_exit_uses_closing_price() {
        let bars = climbing_bars(120);
        let cfg = BacktestConfig {
            holding_period: 10,
            stop_loss_pct: 50.0,
            ..BacktestConfig::default()
        };
        let BacktestReport::Completed { trades, .. } = simulate(&bars, &cfg).unwrap() else {
            panic!("expected completed report");
        };
        let trade = &trades[0];
        let expected = (trade.exit_price - trade.entry_price) / trade.entry_price * 100.0;
        assert_relative_eq!(trade.return_pct, expected);
        assert_eq!(
            (trade.exit_date - trade.entry_date).num_days(),
            cfg.holding_period as i64
        );
    }

    #[test]
    fn entries_near_series_end_are_skipped() {
        let bars = climbing_bars(120);
        let cfg = BacktestConfig {
            holding_period: 200,
            ..BacktestConfig::default()
        };
        // Horizon never fits: no trade can complete.
        let report = simulate(&bars, &cfg).unwrap();
        assert!(matches!(report, BacktestReport::NoSignal));
    }

    #[test]
    fn strict_volume_variant_filters_entries() {
        let mut bars = climbing_bars(120);
        // Uniform volume: never strictly above the 5-day mean.
        for bar in &mut bars {
            bar.volume = 1_000_000;
        }
        let cfg = BacktestConfig {
            require_volume_rising: true,
            ..BacktestConfig::default()
        };
        let report = simulate(&bars, &cfg).unwrap();
        assert!(matches!(report, BacktestReport::NoSignal));

        let relaxed = simulate(&bars, &BacktestConfig::default()).unwrap();
        assert!(matches!(relaxed, BacktestReport::Completed { .. }));
    }
}
