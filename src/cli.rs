//! CLI definition and dispatch.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use clap::{Parser, Subcommand};

use crate::adapters::console_notifier::ConsoleNotifier;
use crate::adapters::csv_data::CsvDataAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::memory_portfolio::InMemoryPortfolioStore;
use crate::domain::backtest::{self, BacktestConfig, BacktestReport, ExitReason};
use crate::domain::error::TrendscoreError;
use crate::domain::indicator::{FULL_WINDOW, LIGHT_WINDOW};
use crate::domain::monitor::{self, PositionAlert};
use crate::domain::scan::{self, ScanAccumulator, ScanConfig, ScanResult};
use crate::domain::signal::{BuyNote, ScoreConfig, TrendState, VolumeTrendRule};
use crate::domain::universe;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::MarketDataProvider;
use crate::ports::notify_port::NotificationSink;
use crate::ports::portfolio_port::PortfolioStore;
use crate::ports::universe_port::UniverseProvider;

#[derive(Parser, Debug)]
#[command(name = "trendscore", about = "Technical-analysis screener and backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score a batch of symbols and list the qualifiers
    Scan {
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Comma-separated symbol codes; defaults to the configured universe
        #[arg(short, long)]
        symbols: Option<String>,
        /// Directory of per-symbol CSV files
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        /// Keep only results at or above this score
        #[arg(long)]
        min_score: Option<u32>,
        /// Keep only results with close above the 20-day average
        #[arg(long)]
        bull_only: bool,
        /// Accept 40 bars of history instead of 60 (no long-average scoring)
        #[arg(long)]
        light: bool,
        /// Push the report through the notification sink as well
        #[arg(long)]
        notify: bool,
    },
    /// Replay the entry rule over one symbol's history
    Backtest {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long)]
        code: String,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        /// Holding horizon in bars
        #[arg(long)]
        holding_period: Option<usize>,
        /// Stop-loss distance in percent
        #[arg(long)]
        stop_loss: Option<f64>,
        /// Require rising volume at entry (stricter variant)
        #[arg(long)]
        strict_volume: bool,
    },
    /// Evaluate held positions for risk and profit alerts
    Monitor {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        /// Holding as CODE=COST_BASIS; repeatable
        #[arg(long = "holding")]
        holdings: Vec<String>,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Scan {
            config,
            symbols,
            data_dir,
            min_score,
            bull_only,
            light,
            notify,
        } => run_scan(
            config.as_ref(),
            symbols.as_deref(),
            data_dir,
            min_score,
            bull_only,
            light,
            notify,
        ),
        Command::Backtest {
            config,
            code,
            data_dir,
            holding_period,
            stop_loss,
            strict_volume,
        } => run_backtest(
            config.as_ref(),
            &code,
            data_dir,
            holding_period,
            stop_loss,
            strict_volume,
        ),
        Command::Monitor {
            config,
            data_dir,
            holdings,
        } => run_monitor(config.as_ref(), data_dir, &holdings),
        Command::ListSymbols { data_dir, config } => run_list_symbols(config.as_ref(), data_dir),
    }
}

/// All-defaults stand-in when no config file is given.
struct DefaultConfig;

impl ConfigPort for DefaultConfig {
    fn get_string(&self, _section: &str, _key: &str) -> Option<String> {
        None
    }
    fn get_int(&self, _section: &str, _key: &str, default: i64) -> i64 {
        default
    }
    fn get_double(&self, _section: &str, _key: &str, default: f64) -> f64 {
        default
    }
    fn get_bool(&self, _section: &str, _key: &str, default: bool) -> bool {
        default
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Option<FileConfigAdapter>, ExitCode> {
    let Some(path) = path else {
        return Ok(None);
    };
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path).map(Some).map_err(|e| {
        let err = TrendscoreError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn resolve_data_dir(flag: Option<PathBuf>, config: Option<&FileConfigAdapter>) -> PathBuf {
    flag.or_else(|| {
        config
            .and_then(|c| c.get_string("data", "csv_dir"))
            .map(PathBuf::from)
    })
    .unwrap_or_else(|| PathBuf::from("data"))
}

/// Build the score configuration from `[score]`, defaulting each key.
pub fn build_score_config(config: &dyn ConfigPort) -> Result<ScoreConfig, TrendscoreError> {
    let defaults = ScoreConfig::default();

    let rule = match config
        .get_string("score", "volume_trend_rule")
        .unwrap_or_else(|| "day_over_day".to_string())
        .as_str()
    {
        "day_over_day" => VolumeTrendRule::DayOverDay,
        "five_day_average" => VolumeTrendRule::FiveDayAverage,
        other => {
            return Err(TrendscoreError::ConfigInvalid {
                section: "score".into(),
                key: "volume_trend_rule".into(),
                reason: format!("expected day_over_day or five_day_average, got {other}"),
            })
        }
    };

    let prime_entry_max_bias =
        config.get_double("score", "prime_entry_max_bias", defaults.prime_entry_max_bias);
    if prime_entry_max_bias <= 0.0 {
        return Err(TrendscoreError::ConfigInvalid {
            section: "score".into(),
            key: "prime_entry_max_bias".into(),
            reason: "must be positive".into(),
        });
    }

    Ok(ScoreConfig {
        bull_alignment_weight: config.get_int(
            "score",
            "bull_alignment_weight",
            defaults.bull_alignment_weight as i64,
        ) as i32,
        trend_rising_weight: config.get_int(
            "score",
            "trend_rising_weight",
            defaults.trend_rising_weight as i64,
        ) as i32,
        volume_surge_weight: config.get_int(
            "score",
            "volume_surge_weight",
            defaults.volume_surge_weight as i64,
        ) as i32,
        bias_contained_weight: config.get_int(
            "score",
            "bias_contained_weight",
            defaults.bias_contained_weight as i64,
        ) as i32,
        prime_entry_weight: config.get_int(
            "score",
            "prime_entry_weight",
            defaults.prime_entry_weight as i64,
        ) as i32,
        volume_shrink_penalty: config.get_int(
            "score",
            "volume_shrink_penalty",
            defaults.volume_shrink_penalty as i64,
        ) as i32,
        prime_entry_max_bias,
        overextended_bias: config.get_double(
            "score",
            "overextended_bias",
            defaults.overextended_bias,
        ),
        volume_surge_lots: config.get_double(
            "score",
            "volume_surge_lots",
            defaults.volume_surge_lots,
        ),
        volume_trend_rule: rule,
        stop_reference_ratio: config.get_double(
            "score",
            "stop_reference_ratio",
            defaults.stop_reference_ratio,
        ),
    })
}

/// Build the backtest configuration from `[backtest]` plus CLI overrides.
pub fn build_backtest_config(
    config: &dyn ConfigPort,
    score: &ScoreConfig,
    holding_period: Option<usize>,
    stop_loss: Option<f64>,
    strict_volume: bool,
) -> Result<BacktestConfig, TrendscoreError> {
    let defaults = BacktestConfig::default();

    let holding_period = match holding_period {
        Some(h) => h as i64,
        None => config.get_int("backtest", "holding_period", defaults.holding_period as i64),
    };
    if holding_period <= 0 {
        return Err(TrendscoreError::ConfigInvalid {
            section: "backtest".into(),
            key: "holding_period".into(),
            reason: "must be at least one bar".into(),
        });
    }
    let holding_period = holding_period as usize;

    let stop_loss_pct = stop_loss
        .unwrap_or_else(|| config.get_double("backtest", "stop_loss_pct", defaults.stop_loss_pct));
    if stop_loss_pct <= 0.0 {
        return Err(TrendscoreError::ConfigInvalid {
            section: "backtest".into(),
            key: "stop_loss_pct".into(),
            reason: "must be positive".into(),
        });
    }

    Ok(BacktestConfig {
        holding_period,
        stop_loss_pct,
        entry_max_bias: score.prime_entry_max_bias,
        require_volume_rising: strict_volume
            || config.get_bool("backtest", "require_volume_rising", false),
    })
}

fn build_scan_config(
    config: Option<&FileConfigAdapter>,
    light: bool,
) -> Result<ScanConfig, TrendscoreError> {
    let defaults = ScanConfig::default();
    let (score, lookback_days, workers) = match config {
        Some(c) => (
            build_score_config(c)?,
            c.get_int("data", "lookback_days", defaults.lookback_days as i64) as u32,
            c.get_int("scan", "workers", 0) as usize,
        ),
        None => (ScoreConfig::default(), defaults.lookback_days, 0),
    };

    Ok(ScanConfig {
        score,
        min_bars: if light { LIGHT_WINDOW } else { FULL_WINDOW },
        lookback_days,
        workers,
    })
}

fn resolve_symbols(
    flag: Option<&str>,
    provider: &dyn UniverseProvider,
) -> Result<Vec<String>, TrendscoreError> {
    if let Some(input) = flag {
        return universe::parse_codes(input);
    }
    match provider.list_symbols() {
        Ok(symbols) if !symbols.is_empty() => Ok(symbols),
        Ok(_) => {
            eprintln!("Warning: universe listing is empty, using default list");
            Ok(universe::default_symbols())
        }
        Err(e) => {
            eprintln!("Warning: universe listing failed ({e}), using default list");
            Ok(universe::default_symbols())
        }
    }
}

fn buy_note_text(note: BuyNote) -> &'static str {
    match note {
        BuyNote::PrimeEntry => "prime entry",
        BuyNote::Overextended => "overextended",
        BuyNote::Consolidating => "consolidating",
    }
}

fn trend_text(state: TrendState) -> &'static str {
    match state {
        TrendState::Bull => "bull",
        TrendState::Bear => "bear",
    }
}

fn format_scan_line(result: &ScanResult) -> String {
    format!(
        "{code:<8} close {close:>9.2}  bias {bias:>6.2}%  vol {lots:>8.0} lots  \
         score {score:>3}  risk {risk}  {trend:<4} {note}",
        code = result.code,
        close = result.snapshot.close,
        bias = result.snapshot.bias_pct,
        lots = result.snapshot.volume_lots,
        score = result.signal.score,
        risk = result.signal.risk_level,
        trend = trend_text(result.signal.trend_state),
        note = buy_note_text(result.signal.buy_note),
    )
}

fn run_scan(
    config_path: Option<&PathBuf>,
    symbols_flag: Option<&str>,
    data_dir: Option<PathBuf>,
    min_score: Option<u32>,
    bull_only: bool,
    light: bool,
    notify: bool,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(exit) => return exit,
    };

    let scan_cfg = match build_scan_config(config.as_ref(), light) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let adapter = CsvDataAdapter::new(resolve_data_dir(data_dir, config.as_ref()));
    let symbols = match resolve_symbols(symbols_flag, &adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Scanning {} symbols...", symbols.len());
    let accumulator = ScanAccumulator::new();
    let cancel = AtomicBool::new(false);
    let min_score = min_score.unwrap_or_else(|| {
        config
            .as_ref()
            .map(|c| c.get_int("scan", "min_score", 0) as u32)
            .unwrap_or(0)
    });

    let summary = scan::run_scan(
        &adapter,
        &symbols,
        &scan_cfg,
        |r| r.signal.score >= min_score && (!bull_only || r.signal.trend_state == TrendState::Bull),
        &accumulator,
        &cancel,
    );

    for skip in &summary.skipped {
        eprintln!("Warning: skipping {} ({:?})", skip.code, skip.reason);
    }

    if summary.qualified.is_empty() {
        if summary.all_failed() {
            eprintln!("error: no data available for any symbol");
            return ExitCode::from(5);
        }
        println!(
            "No qualifying symbols found ({} scanned, {} skipped)",
            summary.scanned,
            summary.skipped.len()
        );
        return ExitCode::SUCCESS;
    }

    let mut report = String::new();
    for result in &summary.qualified {
        let line = format_scan_line(result);
        println!("{line}");
        report.push_str(&line);
        report.push('\n');
    }
    eprintln!(
        "{} of {} symbols qualified",
        summary.qualified.len(),
        summary.scanned
    );

    if notify {
        ConsoleNotifier::new().send(&report);
    }
    ExitCode::SUCCESS
}

fn run_backtest(
    config_path: Option<&PathBuf>,
    code: &str,
    data_dir: Option<PathBuf>,
    holding_period: Option<usize>,
    stop_loss: Option<f64>,
    strict_volume: bool,
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(exit) => return exit,
    };

    let defaults = DefaultConfig;
    let config_port: &dyn ConfigPort = match config.as_ref() {
        Some(c) => c,
        None => &defaults,
    };

    let bt_config = match build_score_config(config_port).and_then(|score| {
        build_backtest_config(config_port, &score, holding_period, stop_loss, strict_volume)
    }) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let adapter = CsvDataAdapter::new(resolve_data_dir(data_dir, config.as_ref()));
    let lookback = config
        .as_ref()
        .map(|c| c.get_int("data", "lookback_days", 730) as u32)
        .unwrap_or(730);

    eprintln!(
        "Backtesting {code}: hold {} bars, stop {}%",
        bt_config.holding_period, bt_config.stop_loss_pct
    );

    let bars = match adapter.fetch_daily(code, lookback) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match backtest::simulate(&bars, &bt_config) {
        Ok(BacktestReport::NoSignal) => {
            println!("No entry signal occurred over {} bars", bars.len());
            ExitCode::SUCCESS
        }
        Ok(BacktestReport::Completed {
            trades,
            win_rate,
            avg_return,
        }) => {
            for trade in &trades {
                let reason = match trade.exit_reason {
                    ExitReason::Horizon => "horizon",
                    ExitReason::StopLoss => "stop",
                };
                println!(
                    "{entry}  {entry_px:>9.2} -> {exit}  {exit_px:>9.2}  {ret:>7.2}%  {reason}",
                    entry = trade.entry_date,
                    entry_px = trade.entry_price,
                    exit = trade.exit_date,
                    exit_px = trade.exit_price,
                    ret = trade.return_pct,
                );
            }
            println!(
                "{} trades, win rate {win_rate:.1}%, avg return {avg_return:.2}%",
                trades.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn parse_holding(input: &str) -> Result<(String, f64), TrendscoreError> {
    let (code, cost) = input.split_once('=').ok_or_else(|| {
        TrendscoreError::InvalidInput {
            reason: format!("expected CODE=COST_BASIS, got {input}"),
        }
    })?;
    let cost_basis: f64 = cost
        .trim()
        .parse()
        .map_err(|_| TrendscoreError::InvalidInput {
            reason: format!("cost basis is not numeric: {cost}"),
        })?;
    Ok((code.trim().to_string(), cost_basis))
}

fn run_monitor(
    config_path: Option<&PathBuf>,
    data_dir: Option<PathBuf>,
    holdings: &[String],
) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(exit) => return exit,
    };

    if holdings.is_empty() {
        let err = TrendscoreError::InvalidInput {
            reason: format!(
                "at least one --holding CODE=COST_BASIS is required (e.g. {})",
                universe::DEFAULT_MONITOR_SYMBOLS
                    .map(|c| format!("--holding {c}=COST"))
                    .join(" ")
            ),
        };
        eprintln!("error: {err}");
        return (&err).into();
    }

    // Validation happens at the store boundary, before any analysis runs.
    let mut store = InMemoryPortfolioStore::new();
    for input in holdings {
        let (code, cost_basis) = match parse_holding(input) {
            Ok(pair) => pair,
            Err(e) => {
                eprintln!("error: {e}");
                return (&e).into();
            }
        };
        if let Err(e) = store.set(&code, cost_basis) {
            eprintln!("error: {e}");
            return (&e).into();
        }
    }

    let scan_cfg = match build_scan_config(config.as_ref(), false) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let adapter = CsvDataAdapter::new(resolve_data_dir(data_dir, config.as_ref()));
    let notifier = ConsoleNotifier::new();

    let mut report = String::new();
    let mut failures = 0usize;
    for (code, cost_basis) in store.list() {
        let result = match scan::analyze_symbol(&adapter, &code, &scan_cfg) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Warning: skipping {code} ({e})");
                failures += 1;
                continue;
            }
        };
        let alert = monitor::evaluate(&code, &result.snapshot, &result.signal, cost_basis);
        let line = format_alert_line(&code, cost_basis, result.snapshot.close, &alert);
        println!("{line}");
        report.push_str(&line);
        report.push('\n');
    }

    if failures == store.list().len() {
        eprintln!("error: no data available for any holding");
        return ExitCode::from(5);
    }
    if !report.is_empty() {
        notifier.send(&report);
    }
    ExitCode::SUCCESS
}

fn format_alert_line(code: &str, cost_basis: f64, close: f64, alert: &PositionAlert) -> String {
    let status = match alert {
        PositionAlert::NoAlert => "no alert".to_string(),
        PositionAlert::StopLossBreach { profit_pct } => {
            format!("STOP LOSS breach ({profit_pct:+.1}%)")
        }
        PositionAlert::TakeProfitEligible { profit_pct } => {
            format!("take profit eligible ({profit_pct:+.1}%)")
        }
        PositionAlert::PartialTrimSuggested { profit_pct } => {
            format!("partial trim suggested ({profit_pct:+.1}%)")
        }
        PositionAlert::LongTermMilestone { profit_pct } => {
            format!("long-term milestone ({profit_pct:+.1}%)")
        }
        PositionAlert::HoldThroughStrength { profit_pct } => {
            format!("hold through strength ({profit_pct:+.1}%)")
        }
    };
    format!("{code:<8} cost {cost_basis:>9.2}  close {close:>9.2}  {status}")
}

fn run_list_symbols(config_path: Option<&PathBuf>, data_dir: Option<PathBuf>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(exit) => return exit,
    };
    let adapter = CsvDataAdapter::new(resolve_data_dir(data_dir, config.as_ref()));
    match adapter.list_symbols() {
        Ok(symbols) => {
            for code in symbols {
                println!("{code}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
