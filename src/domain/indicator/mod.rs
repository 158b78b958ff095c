//! Technical indicator implementations.
//!
//! The submodules hold pure functions over close-price slices. This module
//! wraps them into date-aligned series for the signal engine and for export:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values, one per bar

pub mod dpo;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

use chrono::NaiveDate;
use std::fmt;

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::{closes, OhlcvBar};
use rsi::ZeroLossPolicy;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    /// False during warmup; an invalid point never produces an entry.
    pub valid: bool,
    pub value: IndicatorValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    RsiCross {
        rsi: f64,
        short: Option<f64>,
        long: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Dpo(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    RsiCross {
        period: usize,
        short_sma: usize,
        long_sma: usize,
        zero_loss: ZeroLossPolicy,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first_valid_index(&self) -> Option<usize> {
        self.values.iter().position(|p| p.valid)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Dpo(period) => write!(f, "DPO({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::RsiCross {
                period,
                short_sma,
                long_sma,
                ..
            } => write!(f, "RSI_CROSS({},{},{})", period, short_sma, long_sma),
        }
    }
}

/// Compute the indicator described by `indicator_type` over `bars`.
///
/// Parameters are checked before any computation; an empty bar slice yields
/// an empty series.
pub fn calculate(
    bars: &[OhlcvBar],
    indicator_type: &IndicatorType,
) -> Result<IndicatorSeries, SigtraderError> {
    let close = closes(bars);

    let values: Vec<IndicatorPoint> = match *indicator_type {
        IndicatorType::Dpo(period) => {
            let dpo = dpo::dpo(&close, period)?;
            bars.iter()
                .zip(dpo)
                .map(|(bar, v)| IndicatorPoint {
                    date: bar.date,
                    valid: v.is_some(),
                    value: IndicatorValue::Simple(v.unwrap_or(0.0)),
                })
                .collect()
        }
        IndicatorType::Macd { fast, slow, signal } => {
            let lines = macd::macd(&close, fast, slow, signal)?;
            let histogram = lines.histogram();
            bars.iter()
                .enumerate()
                .map(|(i, bar)| IndicatorPoint {
                    date: bar.date,
                    valid: true,
                    value: IndicatorValue::Macd {
                        line: lines.line[i],
                        signal: lines.signal[i],
                        histogram: histogram[i],
                    },
                })
                .collect()
        }
        IndicatorType::RsiCross {
            period,
            short_sma,
            long_sma,
            zero_loss,
        } => {
            let lines = rsi::rsi_with_policy(&close, period, short_sma, long_sma, zero_loss)?;
            bars.iter()
                .enumerate()
                .map(|(i, bar)| IndicatorPoint {
                    date: bar.date,
                    valid: lines.short[i].is_some() && lines.long[i].is_some(),
                    value: IndicatorValue::RsiCross {
                        rsi: lines.rsi[i],
                        short: lines.short[i],
                        long: lines.long[i],
                    },
                })
                .collect()
        }
    };

    Ok(IndicatorSeries {
        indicator_type: indicator_type.clone(),
        values,
    })
}
