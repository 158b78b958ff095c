//! CSV file data adapter.
//!
//! One file per symbol, `<code>_<exchange>.csv`, with a header row naming
//! date, open, high, low, close and volume (either case). Extra columns are
//! ignored.

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct PriceRow {
    #[serde(alias = "Date")]
    date: String,
    #[serde(alias = "Open")]
    open: f64,
    #[serde(alias = "High")]
    high: f64,
    #[serde(alias = "Low")]
    low: f64,
    #[serde(alias = "Close")]
    close: f64,
    #[serde(alias = "Volume")]
    volume: f64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str, exchange: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", code, exchange))
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        code: &str,
        exchange: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SigtraderError> {
        let path = self.csv_path(code, exchange);
        let content = fs::read_to_string(&path).map_err(|e| SigtraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (line, result) in rdr.deserialize::<PriceRow>().enumerate() {
            let row = result.map_err(|e| SigtraderError::Data {
                reason: format!("{}: {}", path.display(), e),
            })?;

            let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d").map_err(|e| {
                SigtraderError::Data {
                    reason: format!(
                        "{}: invalid date '{}' on row {}: {}",
                        path.display(),
                        row.date,
                        line + 1,
                        e
                    ),
                }
            })?;

            if date < start_date || date > end_date {
                continue;
            }

            let prices = [
                ("open", row.open),
                ("high", row.high),
                ("low", row.low),
                ("close", row.close),
                ("volume", row.volume),
            ];
            if let Some((field, _)) = prices.iter().find(|(_, v)| !v.is_finite()) {
                return Err(SigtraderError::Data {
                    reason: format!("{}: invalid {} on {}", path.display(), field, date),
                });
            }

            bars.push(OhlcvBar {
                code: code.to_string(),
                exchange: exchange.to_string(),
                date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume as i64,
            });
        }

        bars.sort_by_key(|b| b.date);

        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(SigtraderError::Data {
                reason: format!("{}: duplicate bar for {}", path.display(), pair[0].date),
            });
        }

        Ok(bars)
    }

    fn list_symbols(&self, exchange: &str) -> Result<Vec<String>, SigtraderError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SigtraderError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", exchange);
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(code) = name_str.strip_suffix(&suffix) {
                if !code.is_empty() {
                    symbols.push(code.to_string());
                }
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
            2024-01-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n";

        fs::write(path.join("BHP_ASX.csv"), csv_content).unwrap();
        fs::write(path.join("CBA_ASX.csv"), "date,open,high,low,close,volume\n").unwrap();
        fs::write(path.join("AAPL_NYSE.csv"), "date,open,high,low,close,volume\n").unwrap();

        (dir, path)
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn fetch_ohlcv_returns_sorted_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_ohlcv("BHP", "ASX", jan(15), jan(17)).unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, jan(15));
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000);
        assert_eq!(bars[1].date, jan(16));
        assert_eq!(bars[2].date, jan(17));
    }

    #[test]
    fn fetch_ohlcv_filters_by_date() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_ohlcv("BHP", "ASX", jan(16), jan(16)).unwrap();

        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].date, jan(16));
    }

    #[test]
    fn fetch_ohlcv_errors_for_missing_file() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let result = adapter.fetch_ohlcv("XYZ", "ASX", jan(1), jan(31));
        assert!(matches!(result, Err(SigtraderError::Data { .. })));
    }

    #[test]
    fn fetch_ohlcv_accepts_capitalized_headers_and_float_volume() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("SPY_NYSE.csv"),
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-02,470.1,472.0,468.5,471.2,470.9,81234567.0\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let bars = adapter.fetch_ohlcv("SPY", "NYSE", jan(1), jan(31)).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 471.2);
        assert_eq!(bars[0].volume, 81_234_567);
    }

    #[test]
    fn fetch_ohlcv_rejects_duplicate_dates() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("DUP_ASX.csv"),
            "date,open,high,low,close,volume\n\
             2024-01-02,1,1,1,1,10\n\
             2024-01-02,2,2,2,2,10\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let err = adapter.fetch_ohlcv("DUP", "ASX", jan(1), jan(31)).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn fetch_ohlcv_rejects_non_finite_prices() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("NAN_ASX.csv"),
            "date,open,high,low,close,volume\n\
             2024-01-02,1,1,1,1,10\n\
             2024-01-03,1,1,1,NaN,10\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("INF_ASX.csv"),
            "date,open,high,low,close,volume\n2024-01-02,1,inf,1,1,10\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let err = adapter.fetch_ohlcv("NAN", "ASX", jan(1), jan(31)).unwrap_err();
        assert!(matches!(err, SigtraderError::Data { .. }));
        assert!(err.to_string().contains("invalid close"));

        let err = adapter.fetch_ohlcv("INF", "ASX", jan(1), jan(31)).unwrap_err();
        assert!(err.to_string().contains("invalid high"));
    }

    #[test]
    fn fetch_ohlcv_rejects_bad_number() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BAD_ASX.csv"),
            "date,open,high,low,close,volume\n2024-01-02,1,1,1,n/a,10\n",
        )
        .unwrap();
        let adapter = CsvAdapter::new(dir.path().to_path_buf());

        let result = adapter.fetch_ohlcv("BAD", "ASX", jan(1), jan(31));
        assert!(matches!(result, Err(SigtraderError::Data { .. })));
    }

    #[test]
    fn list_symbols_returns_exchange_symbols() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let symbols = adapter.list_symbols("ASX").unwrap();
        assert_eq!(symbols, vec!["BHP", "CBA"]);

        let symbols = adapter.list_symbols("NYSE").unwrap();
        assert_eq!(symbols, vec!["AAPL"]);
    }

    #[test]
    fn list_symbols_missing_directory() {
        let adapter = CsvAdapter::new(PathBuf::from("/nonexistent/prices"));
        assert!(matches!(
            adapter.list_symbols("ASX"),
            Err(SigtraderError::Data { .. })
        ));
    }
}
