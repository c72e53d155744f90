//! Signal classification: additive scoring over an indicator snapshot.
//!
//! One classifier, every threshold and weight in [`ScoreConfig`]. The prime
//! entry band carries the largest single weight: the whole scheme exists to
//! validate buying the pullback to the 20-day average.

use crate::domain::indicator::IndicatorSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendState {
    Bull,
    Bear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuyNote {
    /// Pullback inside the prime entry band (0, max_bias].
    PrimeEntry,
    /// Bias beyond the overextended bound; chasing discouraged.
    Overextended,
    Consolidating,
}

/// Which volume reading the shrink penalty compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeTrendRule {
    /// Today's volume below yesterday's.
    DayOverDay,
    /// Today's volume below its 5-day average.
    FiveDayAverage,
}

/// Thresholds and weights for [`classify`]. The historical variants (3%, 3.5%,
/// 5%, 6% pullback bounds; day-over-day vs 5-day volume rule) are all
/// reachable by adjusting fields rather than separate code paths.
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    pub bull_alignment_weight: i32,
    pub trend_rising_weight: i32,
    pub volume_surge_weight: i32,
    pub bias_contained_weight: i32,
    pub prime_entry_weight: i32,
    pub volume_shrink_penalty: i32,
    /// Upper bound of the prime entry band, percent bias.
    pub prime_entry_max_bias: f64,
    /// Bias above this is overextended (and forfeits the contained bonus).
    pub overextended_bias: f64,
    /// Board-lot volume that counts as a surge.
    pub volume_surge_lots: f64,
    pub volume_trend_rule: VolumeTrendRule,
    /// Stop reference published on the signal, as a fraction of ma20.
    pub stop_reference_ratio: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        ScoreConfig {
            bull_alignment_weight: 25,
            trend_rising_weight: 25,
            volume_surge_weight: 20,
            bias_contained_weight: 10,
            prime_entry_weight: 20,
            volume_shrink_penalty: 10,
            prime_entry_max_bias: 3.5,
            overextended_bias: 10.0,
            volume_surge_lots: 1000.0,
            volume_trend_rule: VolumeTrendRule::DayOverDay,
            stop_reference_ratio: 0.97,
        }
    }
}

/// Classification outcome for one symbol on one evaluation. Produced fresh
/// each time; never cached by the core.
#[derive(Debug, Clone)]
pub struct Signal {
    pub code: String,
    pub score: u32,
    pub trend_state: TrendState,
    pub buy_note: BuyNote,
    pub risk_level: u8,
    /// Suggested stop price, ma20 scaled by the configured ratio.
    pub stop_reference: f64,
}

/// Deterministic additive rule; the final score is clamped to [0, 100].
pub fn classify(code: &str, snap: &IndicatorSnapshot, cfg: &ScoreConfig) -> Signal {
    let mut score = 0i32;

    // Strict comparisons throughout: a flat series earns nothing.
    if snap.ma60.is_some_and(|ma60| snap.ma20 > ma60) {
        score += cfg.bull_alignment_weight;
    }
    if snap.trend_rising {
        score += cfg.trend_rising_weight;
    }
    if snap.volume_lots > cfg.volume_surge_lots {
        score += cfg.volume_surge_weight;
    }
    if snap.bias_pct < cfg.overextended_bias {
        score += cfg.bias_contained_weight;
    }

    let buy_note = if snap.bias_pct > 0.0 && snap.bias_pct <= cfg.prime_entry_max_bias {
        score += cfg.prime_entry_weight;
        BuyNote::PrimeEntry
    } else if snap.bias_pct > cfg.overextended_bias {
        BuyNote::Overextended
    } else {
        BuyNote::Consolidating
    };

    let volume_shrinking = match cfg.volume_trend_rule {
        VolumeTrendRule::DayOverDay => snap.volume_lots < snap.prev_volume_lots,
        VolumeTrendRule::FiveDayAverage => snap.volume_lots < snap.volume_ma5_lots,
    };
    if volume_shrinking {
        score -= cfg.volume_shrink_penalty;
    }

    let trend_state = if snap.close > snap.ma20 {
        TrendState::Bull
    } else {
        TrendState::Bear
    };

    Signal {
        code: code.to_string(),
        score: score.clamp(0, 100) as u32,
        trend_state,
        buy_note,
        risk_level: snap.risk_level,
        stop_reference: snap.ma20 * cfg.stop_reference_ratio,
    }
}
