//! OHLCV bar representation.

use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct OhlcvBar {
    pub code: String,
    pub exchange: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    pub fn is_traded(&self) -> bool {
        self.volume > 0
    }
}

/// Closing prices in bar order.
pub fn closes(bars: &[OhlcvBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Drop zero-volume bars.
///
/// Only used for presentation: signals are always computed on the unfiltered
/// series.
pub fn filter_traded(bars: &[OhlcvBar]) -> Vec<OhlcvBar> {
    bars.iter().filter(|b| b.is_traded()).cloned().collect()
}
