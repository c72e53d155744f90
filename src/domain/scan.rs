//! Batch scan orchestration: indicators + classification over a symbol set.
//!
//! Each symbol's analysis is pure and independent, so the sweep runs on a
//! bounded rayon pool. Results land in a shared accumulator that callers can
//! snapshot mid-run; cancellation is cooperative and checked per symbol, and
//! never discards what has already accumulated.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use rayon::prelude::*;

use crate::domain::error::TrendscoreError;
use crate::domain::indicator::{self, IndicatorSnapshot, FULL_WINDOW};
use crate::domain::signal::{self, ScoreConfig, Signal};
use crate::ports::data_port::MarketDataProvider;

/// One qualifying symbol from a batch run.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub code: String,
    pub snapshot: IndicatorSnapshot,
    pub signal: Signal,
}

#[derive(Debug, Clone)]
pub struct SkippedSymbol {
    pub code: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone)]
pub enum SkipReason {
    NoData,
    InsufficientBars { bars: usize, minimum: usize },
    Provider { reason: String },
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub score: ScoreConfig,
    /// Minimum bars per symbol (FULL_WINDOW or LIGHT_WINDOW).
    pub min_bars: usize,
    /// Calendar days requested from the provider.
    pub lookback_days: u32,
    /// Worker threads; 0 uses the default rayon pool.
    pub workers: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            score: ScoreConfig::default(),
            min_bars: FULL_WINDOW,
            lookback_days: 365,
            workers: 0,
        }
    }
}

/// Append-only, thread-safe per-run accumulator. A snapshot can be taken
/// while the sweep is still running.
#[derive(Debug, Default)]
pub struct ScanAccumulator {
    results: Mutex<Vec<ScanResult>>,
    skipped: Mutex<Vec<SkippedSymbol>>,
}

impl ScanAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_result(&self, result: ScanResult) {
        self.results.lock().expect("accumulator poisoned").push(result);
    }

    fn push_skip(&self, skip: SkippedSymbol) {
        self.skipped.lock().expect("accumulator poisoned").push(skip);
    }

    pub fn results_snapshot(&self) -> Vec<ScanResult> {
        self.results.lock().expect("accumulator poisoned").clone()
    }

    pub fn skipped_snapshot(&self) -> Vec<SkippedSymbol> {
        self.skipped.lock().expect("accumulator poisoned").clone()
    }
}

/// Final sweep summary, assembled from the accumulator once workers finish.
#[derive(Debug)]
pub struct ScanSummary {
    /// Qualifying results, ordered by score descending.
    pub qualified: Vec<ScanResult>,
    pub skipped: Vec<SkippedSymbol>,
    /// Symbols actually analyzed (post-dedup, pre-cancellation).
    pub scanned: usize,
    pub cancelled: bool,
}

impl ScanSummary {
    /// Every analyzed symbol was skipped: data unavailable, as opposed to
    /// "scanned fine, nothing qualified".
    pub fn all_failed(&self) -> bool {
        self.scanned > 0 && self.qualified.is_empty() && self.skipped.len() == self.scanned
    }
}

/// Analyze a single symbol: fetch, compute indicators, classify.
pub fn analyze_symbol<P>(
    provider: &P,
    code: &str,
    cfg: &ScanConfig,
) -> Result<ScanResult, TrendscoreError>
where
    P: MarketDataProvider + ?Sized,
{
    let bars = provider.fetch_daily(code, cfg.lookback_days)?;
    let snapshot = indicator::compute_snapshot(code, &bars, cfg.min_bars)?;
    let signal = signal::classify(code, &snapshot, &cfg.score);
    Ok(ScanResult {
        code: code.to_string(),
        snapshot,
        signal,
    })
}

/// Sweep `symbols`, retaining results that pass `qualifies`.
///
/// Duplicates are analyzed once. Per-symbol failures become skips; no
/// failure aborts the batch. `cancel` stops scheduling new symbols.
pub fn run_scan<P, F>(
    provider: &P,
    symbols: &[String],
    cfg: &ScanConfig,
    qualifies: F,
    accumulator: &ScanAccumulator,
    cancel: &AtomicBool,
) -> ScanSummary
where
    P: MarketDataProvider + Sync + ?Sized,
    F: Fn(&ScanResult) -> bool + Sync,
{
    let mut seen = HashSet::new();
    let unique: Vec<&String> = symbols.iter().filter(|s| seen.insert(s.as_str())).collect();

    let sweep = || {
        unique.par_iter().for_each(|code| {
            if cancel.load(Ordering::Relaxed) {
                return;
            }
            match analyze_symbol(provider, code.as_str(), cfg) {
                Ok(result) => {
                    if qualifies(&result) {
                        accumulator.push_result(result);
                    }
                }
                Err(e) => accumulator.push_skip(SkippedSymbol {
                    code: code.to_string(),
                    reason: skip_reason(&e),
                }),
            }
        });
    };

    if cfg.workers > 0 {
        match rayon::ThreadPoolBuilder::new().num_threads(cfg.workers).build() {
            Ok(pool) => pool.install(sweep),
            Err(_) => sweep(),
        }
    } else {
        sweep();
    }

    let mut qualified = accumulator.results_snapshot();
    qualified.sort_by(|a, b| b.signal.score.cmp(&a.signal.score).then(a.code.cmp(&b.code)));

    ScanSummary {
        qualified,
        skipped: accumulator.skipped_snapshot(),
        scanned: unique.len(),
        cancelled: cancel.load(Ordering::Relaxed),
    }
}

fn skip_reason(err: &TrendscoreError) -> SkipReason {
    match err {
        TrendscoreError::NoData { .. } => SkipReason::NoData,
        TrendscoreError::InsufficientData { bars, minimum, .. } => SkipReason::InsufficientBars {
            bars: *bars,
            minimum: *minimum,
        },
        other => SkipReason::Provider {
            reason: other.to_string(),
        },
    }
}
