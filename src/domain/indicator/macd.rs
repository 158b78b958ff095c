//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9.
//! Every EMA seeds from its first input, so all three lines are defined from
//! the first bar.

use crate::domain::error::SigtraderError;
use crate::domain::indicator::ema::ema;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
}

impl MacdLines {
    pub fn histogram(&self) -> Vec<f64> {
        self.line
            .iter()
            .zip(&self.signal)
            .map(|(l, s)| l - s)
            .collect()
    }
}

pub fn macd(
    close: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<MacdLines, SigtraderError> {
    for (param, value) in [("fast", fast), ("slow", slow), ("signal", signal)] {
        if value == 0 {
            return Err(SigtraderError::invalid_parameter(
                "MACD",
                param,
                "must be at least 1",
            ));
        }
    }

    let ema_fast = ema(close, fast)?;
    let ema_slow = ema(close, slow)?;
    let line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema(&line, signal)?;

    Ok(MacdLines { line, signal })
}
