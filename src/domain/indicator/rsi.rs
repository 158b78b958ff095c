//! RSI (Relative Strength Index) with dual SMA smoothing.
//!
//! Average gain/loss is a plain rolling mean over the last n price changes,
//! emitting from the first bar (the first bar's change counts as zero):
//!
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//!
//! A 0/0 ratio (no movement in the window) yields the neutral value 50.
//! A window with gains but no losses follows [`ZeroLossPolicy`].
//!
//! Two simple moving averages of RSI (short and long) drive the crossover
//! rule; each has the usual SMA warmup.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::SigtraderError;
use crate::domain::indicator::sma::rolling_mean;

pub const DEFAULT_PERIOD: usize = 14;
pub const DEFAULT_SHORT_SMA: usize = 10;
pub const DEFAULT_LONG_SMA: usize = 20;

pub const NEUTRAL: f64 = 50.0;

/// RSI reading when the window has gains but no losses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ZeroLossPolicy {
    /// Read an all-gain window as neutral: 50.
    #[default]
    Neutral,
    /// Let the ratio run to infinity: 100, as the textbook formula does.
    Saturate,
}

impl FromStr for ZeroLossPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "neutral" => Ok(ZeroLossPolicy::Neutral),
            "saturate" => Ok(ZeroLossPolicy::Saturate),
            other => Err(format!(
                "unknown zero-loss policy '{other}' (expected neutral or saturate)"
            )),
        }
    }
}

impl fmt::Display for ZeroLossPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZeroLossPolicy::Neutral => write!(f, "neutral"),
            ZeroLossPolicy::Saturate => write!(f, "saturate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RsiLines {
    pub rsi: Vec<f64>,
    pub short: Vec<Option<f64>>,
    pub long: Vec<Option<f64>>,
}

pub fn rsi(
    close: &[f64],
    period: usize,
    short_sma: usize,
    long_sma: usize,
) -> Result<RsiLines, SigtraderError> {
    rsi_with_policy(close, period, short_sma, long_sma, ZeroLossPolicy::default())
}

pub fn rsi_with_policy(
    close: &[f64],
    period: usize,
    short_sma: usize,
    long_sma: usize,
    policy: ZeroLossPolicy,
) -> Result<RsiLines, SigtraderError> {
    for (param, value) in [
        ("period", period),
        ("short_sma", short_sma),
        ("long_sma", long_sma),
    ] {
        if value == 0 {
            return Err(SigtraderError::invalid_parameter(
                "RSI",
                param,
                "must be at least 1",
            ));
        }
    }

    let raw = rsi_values(close, period, policy);
    let defined: Vec<Option<f64>> = raw.iter().map(|&v| Some(v)).collect();

    Ok(RsiLines {
        short: rolling_mean(&defined, short_sma),
        long: rolling_mean(&defined, long_sma),
        rsi: raw,
    })
}

fn rsi_values(close: &[f64], period: usize, policy: ZeroLossPolicy) -> Vec<f64> {
    let mut gains = Vec::with_capacity(close.len());
    let mut losses = Vec::with_capacity(close.len());
    for i in 0..close.len() {
        let change = if i == 0 { 0.0 } else { close[i] - close[i - 1] };
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let mut values = Vec::with_capacity(close.len());
    for i in 0..close.len() {
        let start = (i + 1).saturating_sub(period);
        let count = (i + 1 - start) as f64;
        let avg_gain = gains[start..=i].iter().sum::<f64>() / count;
        let avg_loss = losses[start..=i].iter().sum::<f64>() / count;
        values.push(rsi_from_averages(avg_gain, avg_loss, policy));
    }
    values
}

/// RSI from a pair of averages, neutralizing undefined ratios.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64, policy: ZeroLossPolicy) -> f64 {
    if avg_loss == 0.0 && avg_gain > 0.0 {
        return match policy {
            ZeroLossPolicy::Neutral => NEUTRAL,
            ZeroLossPolicy::Saturate => 100.0,
        };
    }
    let rs = avg_gain / avg_loss;
    let value = 100.0 - 100.0 / (1.0 + rs);
    if value.is_nan() { NEUTRAL } else { value }
}
