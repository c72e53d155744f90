//! Position risk monitoring for held symbols.
//!
//! Pure evaluation of one holding against the current snapshot and signal.
//! The stop-loss check always runs first and outranks every profit state.

use crate::domain::indicator::IndicatorSnapshot;
use crate::domain::signal::Signal;

/// Loss (percent of cost basis) that forces a stop-loss alert.
pub const STOP_LOSS_PCT: f64 = -7.0;
/// Profit (percent) that makes a short-term holding take-profit eligible.
pub const TAKE_PROFIT_PCT: f64 = 20.0;
/// Profit (percent) marking the long-term milestone.
pub const MILESTONE_PCT: f64 = 100.0;
/// Bias above which a profitable long-term holding should trim.
pub const TRIM_BIAS_PCT: f64 = 15.0;

/// Long-term qualification: score floor and volatility ceiling.
const LONG_TERM_MIN_SCORE: u32 = 80;
const LONG_TERM_MAX_VOLATILITY: f64 = 35.0;

/// Index-tracking products share the "00" code prefix.
const INDEX_TRACKING_PREFIX: &str = "00";
/// Mega caps held to long-term rules regardless of the current score.
const MEGA_CAPS: [&str; 3] = ["2330", "2317", "2454"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    LongTerm,
    ShortTerm,
}

/// Outcome of one holding evaluation. Exactly one is produced.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionAlert {
    NoAlert,
    /// Loss beyond the stop threshold, or close below ma20.
    StopLossBreach { profit_pct: f64 },
    TakeProfitEligible { profit_pct: f64 },
    PartialTrimSuggested { profit_pct: f64 },
    LongTermMilestone { profit_pct: f64 },
    /// Profitable long-term holding with no exit pressure; informational.
    HoldThroughStrength { profit_pct: f64 },
}

/// Classify a holding as long-term or short-term.
///
/// Long-term: index-tracking code prefix, a known mega cap, or a strong
/// stable signal (score >= 80 and volatility < 35).
pub fn classify_regime(code: &str, signal: &Signal, snap: &IndicatorSnapshot) -> Regime {
    if code.starts_with(INDEX_TRACKING_PREFIX)
        || MEGA_CAPS.contains(&code)
        || (signal.score >= LONG_TERM_MIN_SCORE && snap.volatility_pct < LONG_TERM_MAX_VOLATILITY)
    {
        Regime::LongTerm
    } else {
        Regime::ShortTerm
    }
}

/// Evaluate one holding. `cost_basis` must already be validated positive.
///
/// Order is fixed: stop-loss first in any regime, then regime-specific
/// profit rules.
pub fn evaluate(
    code: &str,
    snap: &IndicatorSnapshot,
    signal: &Signal,
    cost_basis: f64,
) -> PositionAlert {
    let profit_pct = (snap.close - cost_basis) / cost_basis * 100.0;

    if profit_pct <= STOP_LOSS_PCT || snap.close < snap.ma20 {
        return PositionAlert::StopLossBreach { profit_pct };
    }

    match classify_regime(code, signal, snap) {
        Regime::ShortTerm => {
            if profit_pct >= TAKE_PROFIT_PCT {
                PositionAlert::TakeProfitEligible { profit_pct }
            } else {
                PositionAlert::NoAlert
            }
        }
        Regime::LongTerm => {
            if profit_pct >= MILESTONE_PCT {
                PositionAlert::LongTermMilestone { profit_pct }
            } else if profit_pct >= TAKE_PROFIT_PCT && snap.bias_pct > TRIM_BIAS_PCT {
                PositionAlert::PartialTrimSuggested { profit_pct }
            } else if profit_pct >= TAKE_PROFIT_PCT {
                PositionAlert::HoldThroughStrength { profit_pct }
            } else {
                PositionAlert::NoAlert
            }
        }
    }
}
