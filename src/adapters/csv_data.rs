//! CSV file data adapter: one `{code}.csv` per symbol under a base directory.
//!
//! Row format: `date,open,high,low,close,volume` with a header row, dates as
//! `%Y-%m-%d`. Doubles as the universe provider by listing the directory.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::domain::error::TrendscoreError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::MarketDataProvider;
use crate::ports::universe_port::UniverseProvider;

pub struct CsvDataAdapter {
    base_path: PathBuf,
}

impl CsvDataAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str) -> PathBuf {
        self.base_path.join(format!("{code}.csv"))
    }
}

fn provider_err(code: &str, reason: String) -> TrendscoreError {
    TrendscoreError::Provider {
        code: code.to_string(),
        reason,
    }
}

fn field<'a>(
    record: &'a csv::StringRecord,
    index: usize,
    name: &str,
    code: &str,
) -> Result<&'a str, TrendscoreError> {
    record
        .get(index)
        .ok_or_else(|| provider_err(code, format!("missing {name} column")))
}

impl MarketDataProvider for CsvDataAdapter {
    fn fetch_daily(
        &self,
        code: &str,
        lookback_days: u32,
    ) -> Result<Vec<OhlcvBar>, TrendscoreError> {
        let path = self.csv_path(code);
        if !path.exists() {
            return Err(TrendscoreError::NoData {
                code: code.to_string(),
            });
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| provider_err(code, format!("failed to read {}: {e}", path.display())))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| provider_err(code, format!("CSV parse error: {e}")))?;

            let date = NaiveDate::parse_from_str(field(&record, 0, "date", code)?, "%Y-%m-%d")
                .map_err(|e| provider_err(code, format!("invalid date: {e}")))?;
            let open: f64 = field(&record, 1, "open", code)?
                .parse()
                .map_err(|e| provider_err(code, format!("invalid open value: {e}")))?;
            let high: f64 = field(&record, 2, "high", code)?
                .parse()
                .map_err(|e| provider_err(code, format!("invalid high value: {e}")))?;
            let low: f64 = field(&record, 3, "low", code)?
                .parse()
                .map_err(|e| provider_err(code, format!("invalid low value: {e}")))?;
            let close: f64 = field(&record, 4, "close", code)?
                .parse()
                .map_err(|e| provider_err(code, format!("invalid close value: {e}")))?;
            let volume: i64 = field(&record, 5, "volume", code)?
                .parse()
                .map_err(|e| provider_err(code, format!("invalid volume value: {e}")))?;

            bars.push(OhlcvBar {
                code: code.to_string(),
                date,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        if let Some(last) = bars.last() {
            let cutoff = last.date - chrono::Duration::days(lookback_days as i64);
            bars.retain(|b| b.date >= cutoff);
        }
        Ok(bars)
    }
}

impl UniverseProvider for CsvDataAdapter {
    fn list_symbols(&self) -> Result<Vec<String>, TrendscoreError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| {
            provider_err(
                "universe",
                format!("failed to read directory {}: {e}", self.base_path.display()),
            )
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| provider_err("universe", format!("directory entry error: {e}")))?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(code) = name_str.strip_suffix(".csv") {
                symbols.push(code.to_string());
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-15,580.0,590.0,575.0,585.0,25000000\n\
            2024-01-17,590.0,600.0,585.0,595.0,30000000\n\
            2024-01-16,585.0,595.0,580.0,590.0,28000000\n";

        fs::write(path.join("2330.csv"), csv_content).unwrap();
        fs::write(path.join("2317.csv"), "date,open,high,low,close,volume\n").unwrap();
        fs::write(path.join("notes.txt"), "not a symbol").unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_daily_sorts_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let bars = adapter.fetch_daily("2330", 365).unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[2].date, NaiveDate::from_ymd_opt(2024, 1, 17).unwrap());
        assert_eq!(bars[0].close, 585.0);
        assert_eq!(bars[0].volume, 25_000_000);
    }

    #[test]
    fn fetch_daily_applies_lookback() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let bars = adapter.fetch_daily("2330", 1).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
    }

    #[test]
    fn fetch_daily_missing_symbol_is_no_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let err = adapter.fetch_daily("9999", 365).unwrap_err();
        assert!(matches!(err, TrendscoreError::NoData { .. }));
    }

    #[test]
    fn fetch_daily_malformed_row_is_provider_error() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("2330.csv"),
            "date,open,high,low,close,volume\n2024-01-15,x,590.0,575.0,585.0,1000\n",
        )
        .unwrap();
        let adapter = CsvDataAdapter::new(dir.path().to_path_buf());

        let err = adapter.fetch_daily("2330", 365).unwrap_err();
        assert!(matches!(err, TrendscoreError::Provider { .. }));
    }

    #[test]
    fn list_symbols_ignores_non_csv() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvDataAdapter::new(path);

        let symbols = adapter.list_symbols().unwrap();
        assert_eq!(symbols, vec!["2317", "2330"]);
    }

    #[test]
    fn list_symbols_missing_dir_fails() {
        let adapter = CsvDataAdapter::new(PathBuf::from("/nonexistent/market-data"));
        assert!(adapter.list_symbols().is_err());
    }
}
