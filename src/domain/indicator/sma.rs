//! Simple Moving Average over a rolling window.
//!
//! SMA(n)[i] = mean(v[i-n+1..=i]). Warmup: first (n-1) values are undefined.
//! A window containing an undefined input is itself undefined.

use crate::domain::error::SigtraderError;

pub fn sma(values: &[f64], period: usize) -> Result<Vec<Option<f64>>, SigtraderError> {
    if period == 0 {
        return Err(SigtraderError::invalid_parameter(
            "SMA",
            "period",
            "must be at least 1",
        ));
    }
    let defined: Vec<Option<f64>> = values.iter().map(|&v| Some(v)).collect();
    Ok(rolling_mean(&defined, period))
}

/// Rolling mean over a series that may carry undefined values. An undefined
/// or non-finite input restarts the window.
pub(crate) fn rolling_mean(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    let mut run = 0usize;

    for (i, value) in values.iter().enumerate() {
        match value {
            Some(v) if v.is_finite() => {
                sum += v;
                run += 1;
            }
            _ => {
                sum = 0.0;
                run = 0;
            }
        }
        if run > period {
            if let Some(old) = values[i - period] {
                sum -= old;
            }
            run = period;
        }
        if run == period {
            out.push(Some(sum / period as f64));
        } else {
            out.push(None);
        }
    }

    out
}
