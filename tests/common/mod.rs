#![allow(dead_code)]

use chrono::NaiveDate;
use sigtrader::domain::error::SigtraderError;
use sigtrader::domain::indicator::IndicatorPoint;
pub use sigtrader::domain::ohlcv::OhlcvBar;
use sigtrader::domain::risk::RiskConfig;
use sigtrader::domain::run::BarSignal;
use sigtrader::domain::strategy::{StrategyConfig, StrategyKind};
use sigtrader::ports::data_port::DataPort;
use sigtrader::ports::signal_sink::SignalSink;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
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
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        code: &str,
        _exchange: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, SigtraderError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(SigtraderError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(code)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self, _exchange: &str) -> Result<Vec<String>, SigtraderError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

/// Sink that accepts `limit` bars, then reports the execution engine down.
pub struct FailingSink {
    pub limit: usize,
    pub accepted: Vec<BarSignal>,
}

impl FailingSink {
    pub fn after(limit: usize) -> Self {
        Self {
            limit,
            accepted: Vec::new(),
        }
    }
}

impl SignalSink for FailingSink {
    fn record(&mut self, signal: &BarSignal, _reading: &IndicatorPoint) -> Result<(), SigtraderError> {
        if self.accepted.len() >= self.limit {
            return Err(SigtraderError::Sink {
                reason: "execution engine unavailable".into(),
            });
        }
        self.accepted.push(signal.clone());
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Daily bars starting 2024-01-01 with the given closes.
pub fn bars_from_closes(code: &str, closes: &[f64]) -> Vec<OhlcvBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            code: code.to_string(),
            exchange: "NYSE".to_string(),
            date: start + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        })
        .collect()
}

/// A deterministic oscillating series: a slow sine wave on a drift.
pub fn wave(count: usize, start_price: f64) -> Vec<f64> {
    (0..count)
        .map(|i| {
            let t = i as f64;
            start_price + 0.05 * t + 8.0 * (t / 6.0).sin()
        })
        .collect()
}

pub fn strategy(kind: StrategyKind) -> StrategyConfig {
    StrategyConfig::new(kind, RiskConfig::default())
}

pub fn all_kinds() -> Vec<StrategyKind> {
    vec![
        StrategyKind::Dpo {
            period: 10,
            threshold: 0.0,
        },
        StrategyKind::Macd {
            fast: 5,
            slow: 12,
            signal: 4,
        },
        StrategyKind::RsiCross {
            period: 7,
            short_sma: 3,
            long_sma: 6,
            zero_loss: Default::default(),
        },
    ]
}
