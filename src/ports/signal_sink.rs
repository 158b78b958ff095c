//! Signal consumer port: the downstream execution engine or any recorder
//! that receives one action per bar.

use crate::domain::error::SigtraderError;
use crate::domain::indicator::IndicatorPoint;
use crate::domain::run::BarSignal;

pub trait SignalSink {
    fn record(&mut self, signal: &BarSignal, reading: &IndicatorPoint)
        -> Result<(), SigtraderError>;

    /// Called once after the last bar.
    fn finish(&mut self) -> Result<(), SigtraderError> {
        Ok(())
    }
}

/// Collects every signal in memory.
impl SignalSink for Vec<BarSignal> {
    fn record(
        &mut self,
        signal: &BarSignal,
        _reading: &IndicatorPoint,
    ) -> Result<(), SigtraderError> {
        self.push(signal.clone());
        Ok(())
    }
}
