//! Detrended Price Oscillator.
//!
//! shift = n/2 + 1
//! DPO(n)[i] = C[i - shift] - SMA(n)[i]
//! Warmup: the first (n + shift - 1) values are undefined.

use crate::domain::error::SigtraderError;
use crate::domain::indicator::sma::sma;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_THRESHOLD: f64 = 0.0;

pub fn shift(period: usize) -> usize {
    period / 2 + 1
}

/// Number of leading undefined values for a given period.
pub fn warmup(period: usize) -> usize {
    period.saturating_add(shift(period) - 1)
}

pub fn dpo(close: &[f64], period: usize) -> Result<Vec<Option<f64>>, SigtraderError> {
    if period == 0 {
        return Err(SigtraderError::invalid_parameter(
            "DPO",
            "period",
            "must be at least 1",
        ));
    }

    let shift = shift(period);
    let warmup = warmup(period);
    let average = sma(close, period)?;

    let values = average
        .iter()
        .enumerate()
        .map(|(i, avg)| {
            if i < warmup {
                return None;
            }
            avg.map(|a| close[i - shift] - a)
        })
        .collect();

    Ok(values)
}
