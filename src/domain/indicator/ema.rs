//! Exponential Moving Average.
//!
//! k = 2/(n+1), EMA[0] = v[0], then EMA[i] = v[i]*k + EMA[i-1]*(1-k).
//! The first value seeds the recursion, so there is no warmup.

use crate::domain::error::SigtraderError;

pub fn ema(values: &[f64], period: usize) -> Result<Vec<f64>, SigtraderError> {
    if period == 0 {
        return Err(SigtraderError::invalid_parameter(
            "EMA",
            "period",
            "must be at least 1",
        ));
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut iter = values.iter();

    if let Some(&first) = iter.next() {
        let mut current = first;
        out.push(current);
        for &v in iter {
            current = k * v + (1.0 - k) * current;
            out.push(current);
        }
    }

    Ok(out)
}
